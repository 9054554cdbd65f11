//! File commands.

use std::sync::Arc;

use tracing::info;

use crate::error::FsError;
use crate::filesystem::Filesystem;

use super::super::traits::Command;
use super::super::types::{CommandParams, CommandResult, ExecutionContext};
use super::requested_owner;

/// Create an empty file or update its timestamps.
///
/// # Parameters
///
/// - `path` (required)
/// - `owner` / `as_user` (optional)
pub struct TouchCommand {
    fs: Arc<Filesystem>,
}

impl TouchCommand {
    pub fn new(fs: Arc<Filesystem>) -> Self {
        Self { fs }
    }
}

impl Command for TouchCommand {
    fn name(&self) -> &'static str {
        "fs.touch"
    }

    fn validate(&self, params: &CommandParams) -> Result<(), FsError> {
        params.require_string("path")
    }

    fn execute(
        &self,
        _ctx: &ExecutionContext,
        params: CommandParams,
    ) -> Result<CommandResult, FsError> {
        let path = params.get_string("path")?;
        let owner = requested_owner(&self.fs, &params)?;
        let touched = self.fs.touch(&path, owner.as_ref())?;

        Ok(CommandResult::success(serde_json::json!({
            "path": touched.to_string_lossy(),
        })))
    }
}

/// Check whether a path exists.
pub struct ExistsCommand {
    fs: Arc<Filesystem>,
}

impl ExistsCommand {
    pub fn new(fs: Arc<Filesystem>) -> Self {
        Self { fs }
    }
}

impl Command for ExistsCommand {
    fn name(&self) -> &'static str {
        "fs.exists"
    }

    fn validate(&self, params: &CommandParams) -> Result<(), FsError> {
        params.require_string("path")
    }

    fn execute(
        &self,
        _ctx: &ExecutionContext,
        params: CommandParams,
    ) -> Result<CommandResult, FsError> {
        let path = params.get_string("path")?;
        Ok(CommandResult::success(serde_json::json!({
            "path": path,
            "exists": self.fs.exists(&path),
        })))
    }

    fn is_mutating(&self) -> bool {
        false
    }
}

/// Read a file. Content is returned as UTF-8, with invalid sequences replaced.
pub struct ReadFileCommand {
    fs: Arc<Filesystem>,
}

impl ReadFileCommand {
    pub fn new(fs: Arc<Filesystem>) -> Self {
        Self { fs }
    }
}

impl Command for ReadFileCommand {
    fn name(&self) -> &'static str {
        "fs.read"
    }

    fn validate(&self, params: &CommandParams) -> Result<(), FsError> {
        params.require_string("path")
    }

    fn execute(
        &self,
        _ctx: &ExecutionContext,
        params: CommandParams,
    ) -> Result<CommandResult, FsError> {
        let path = params.get_string("path")?;
        let bytes = self.fs.read_file(&path)?;

        Ok(CommandResult::success(serde_json::json!({
            "path": path,
            "bytes": bytes.len(),
            "content": String::from_utf8_lossy(&bytes),
        })))
    }

    fn is_mutating(&self) -> bool {
        false
    }
}

/// Replace a file's contents.
///
/// # Parameters
///
/// - `path` (required)
/// - `content` (required)
/// - `atomic` (optional): write through a temp file and rename (default: false)
/// - `owner` / `as_user` (optional)
pub struct WriteFileCommand {
    fs: Arc<Filesystem>,
}

impl WriteFileCommand {
    pub fn new(fs: Arc<Filesystem>) -> Self {
        Self { fs }
    }
}

impl Command for WriteFileCommand {
    fn name(&self) -> &'static str {
        "fs.write"
    }

    fn validate(&self, params: &CommandParams) -> Result<(), FsError> {
        params.require_string("path")?;
        params.require_string("content")
    }

    fn execute(
        &self,
        ctx: &ExecutionContext,
        params: CommandParams,
    ) -> Result<CommandResult, FsError> {
        let path = params.get_string("path")?;
        let content = params.get_string("content")?;
        let owner = requested_owner(&self.fs, &params)?;

        if params.get_optional_bool("atomic", false) {
            self.fs.write_file_atomic(&path, &content, owner.as_ref())?;
        } else {
            self.fs.write_file(&path, &content, owner.as_ref())?;
        }

        info!(request_id = %ctx.request_id, path = %path, bytes = content.len(), "File written");

        Ok(CommandResult::success(serde_json::json!({
            "path": path,
            "bytes_written": content.len(),
        })))
    }
}

/// Append to a file, creating it when absent.
///
/// # Parameters
///
/// - `path` (required)
/// - `content` (required)
/// - `owner` / `as_user` (optional)
pub struct AppendFileCommand {
    fs: Arc<Filesystem>,
}

impl AppendFileCommand {
    pub fn new(fs: Arc<Filesystem>) -> Self {
        Self { fs }
    }
}

impl Command for AppendFileCommand {
    fn name(&self) -> &'static str {
        "fs.append"
    }

    fn validate(&self, params: &CommandParams) -> Result<(), FsError> {
        params.require_string("path")?;
        params.require_string("content")
    }

    fn execute(
        &self,
        _ctx: &ExecutionContext,
        params: CommandParams,
    ) -> Result<CommandResult, FsError> {
        let path = params.get_string("path")?;
        let content = params.get_string("content")?;
        let owner = requested_owner(&self.fs, &params)?;

        self.fs.append_file(&path, &content, owner.as_ref())?;

        Ok(CommandResult::success(serde_json::json!({
            "path": path,
            "bytes_appended": content.len(),
        })))
    }
}

/// Copy a file, overwriting the destination.
///
/// # Parameters
///
/// - `from` (required)
/// - `to` (required)
/// - `owner` / `as_user` (optional): applied to `to` after copying
pub struct CopyFileCommand {
    fs: Arc<Filesystem>,
}

impl CopyFileCommand {
    pub fn new(fs: Arc<Filesystem>) -> Self {
        Self { fs }
    }
}

impl Command for CopyFileCommand {
    fn name(&self) -> &'static str {
        "fs.copy"
    }

    fn validate(&self, params: &CommandParams) -> Result<(), FsError> {
        params.require_string("from")?;
        params.require_string("to")
    }

    fn execute(
        &self,
        _ctx: &ExecutionContext,
        params: CommandParams,
    ) -> Result<CommandResult, FsError> {
        let from = params.get_string("from")?;
        let to = params.get_string("to")?;

        if params.get_optional_bool("as_user", false) {
            self.fs.copy_file_as_current_user(&from, &to)?;
        } else {
            self.fs.copy_file(&from, &to)?;
            if let Some(owner) = params.get_optional_owner("owner")? {
                self.fs.change_owner(&to, &owner)?;
            }
        }

        Ok(CommandResult::success(serde_json::json!({
            "from": from,
            "to": to,
        })))
    }
}

/// Remove a file or symlink. Always succeeds; see `Filesystem::delete`.
pub struct DeleteCommand {
    fs: Arc<Filesystem>,
}

impl DeleteCommand {
    pub fn new(fs: Arc<Filesystem>) -> Self {
        Self { fs }
    }
}

impl Command for DeleteCommand {
    fn name(&self) -> &'static str {
        "fs.delete"
    }

    fn validate(&self, params: &CommandParams) -> Result<(), FsError> {
        params.require_string("path")
    }

    fn execute(
        &self,
        _ctx: &ExecutionContext,
        params: CommandParams,
    ) -> Result<CommandResult, FsError> {
        let path = params.get_string("path")?;
        self.fs.delete(&path);

        Ok(CommandResult::success(serde_json::json!({
            "path": path,
            "deleted": !(self.fs.exists(&path) || self.fs.is_symlink(&path)),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fs::test_support::test_filesystem;
    use tempfile::TempDir;

    fn ctx() -> ExecutionContext {
        ExecutionContext::for_command("fs.test")
    }

    #[test]
    fn test_write_file_validate() {
        let (fs, _) = test_filesystem();
        let cmd = WriteFileCommand::new(fs);

        assert!(cmd
            .validate(&CommandParams::new(
                serde_json::json!({"path": "/tmp/x", "content": "hello"})
            ))
            .is_ok());
        assert!(cmd
            .validate(&CommandParams::new(serde_json::json!({"content": "hello"})))
            .is_err());
        assert!(cmd
            .validate(&CommandParams::new(serde_json::json!({"path": "/tmp/x"})))
            .is_err());
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nginx.conf");
        let path_str = path.to_str().unwrap();
        let (fs, _) = test_filesystem();

        let write = WriteFileCommand::new(fs.clone());
        let result = write
            .execute(
                &ctx(),
                CommandParams::new(serde_json::json!({
                    "path": path_str,
                    "content": "server {}",
                    "atomic": true
                })),
            )
            .unwrap();
        assert_eq!(result.data.unwrap()["bytes_written"], 9);

        let read = ReadFileCommand::new(fs);
        let result = read
            .execute(&ctx(), CommandParams::new(serde_json::json!({"path": path_str})))
            .unwrap();
        assert_eq!(result.data.unwrap()["content"], "server {}");
    }

    #[test]
    fn test_append_twice() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hosts");
        let path_str = path.to_str().unwrap();
        let (fs, _) = test_filesystem();
        let cmd = AppendFileCommand::new(fs);

        for line in ["a\n", "b\n"] {
            cmd.execute(
                &ctx(),
                CommandParams::new(serde_json::json!({"path": path_str, "content": line})),
            )
            .unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_copy_as_user() {
        let dir = TempDir::new().unwrap();
        let from = dir.path().join("src.txt");
        let to = dir.path().join("dst.txt");
        std::fs::write(&from, "payload").unwrap();
        let (fs, _) = test_filesystem();

        let result = CopyFileCommand::new(fs)
            .execute(
                &ctx(),
                CommandParams::new(serde_json::json!({
                    "from": from.to_str().unwrap(),
                    "to": to.to_str().unwrap(),
                    "as_user": true
                })),
            )
            .unwrap();
        assert!(result.success);
        assert_eq!(std::fs::read_to_string(&to).unwrap(), "payload");
    }

    #[test]
    fn test_delete_nonexistent() {
        let dir = TempDir::new().unwrap();
        let (fs, _) = test_filesystem();

        let result = DeleteCommand::new(fs)
            .execute(
                &ctx(),
                CommandParams::new(serde_json::json!({
                    "path": dir.path().join("missing").to_str().unwrap()
                })),
            )
            .unwrap();
        assert!(result.success);
        assert_eq!(result.data.unwrap()["deleted"], true);
    }

    #[test]
    fn test_read_missing_file_fails() {
        let (fs, _) = test_filesystem();
        let result = ReadFileCommand::new(fs).execute(
            &ctx(),
            CommandParams::new(serde_json::json!({"path": "/nonexistent/lumo/file"})),
        );
        let err = result.unwrap_err();
        assert_eq!(err.io_kind(), Some(std::io::ErrorKind::NotFound));
    }
}
