//! Directory commands.

use std::sync::Arc;

use tracing::info;

use crate::error::FsError;
use crate::filesystem::Filesystem;

use super::super::traits::Command;
use super::super::types::{CommandParams, CommandResult, ExecutionContext};
use super::requested_owner;

/// Check whether a path is a directory.
///
/// # Parameters
///
/// - `path` (required)
pub struct IsDirectoryCommand {
    fs: Arc<Filesystem>,
}

impl IsDirectoryCommand {
    pub fn new(fs: Arc<Filesystem>) -> Self {
        Self { fs }
    }
}

impl Command for IsDirectoryCommand {
    fn name(&self) -> &'static str {
        "fs.is_dir"
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
            "is_dir": self.fs.is_directory(&path),
        })))
    }

    fn is_mutating(&self) -> bool {
        false
    }
}

/// Create a directory and its missing parents.
///
/// # Parameters
///
/// - `path` (required)
/// - `mode` (optional): octal string, defaults to the gateway's directory mode
/// - `owner` / `as_user` (optional)
pub struct CreateDirectoryCommand {
    fs: Arc<Filesystem>,
}

impl CreateDirectoryCommand {
    pub fn new(fs: Arc<Filesystem>) -> Self {
        Self { fs }
    }
}

impl Command for CreateDirectoryCommand {
    fn name(&self) -> &'static str {
        "fs.mkdir"
    }

    fn validate(&self, params: &CommandParams) -> Result<(), FsError> {
        params.require_string("path")?;
        params.get_mode("mode", self.fs.directory_mode())?;
        Ok(())
    }

    fn execute(
        &self,
        ctx: &ExecutionContext,
        params: CommandParams,
    ) -> Result<CommandResult, FsError> {
        let path = params.get_string("path")?;
        let mode = params.get_mode("mode", self.fs.directory_mode())?;
        let owner = requested_owner(&self.fs, &params)?;

        self.fs.create_directory(&path, owner.as_ref(), mode)?;

        info!(request_id = %ctx.request_id, path = %path, "Directory created");

        Ok(CommandResult::success(serde_json::json!({
            "path": path,
            "mode": format!("{:04o}", mode),
            "created": true,
        })))
    }
}

/// Create a directory unless one is already present.
///
/// Same parameters as `fs.mkdir`.
pub struct EnsureDirectoryCommand {
    fs: Arc<Filesystem>,
}

impl EnsureDirectoryCommand {
    pub fn new(fs: Arc<Filesystem>) -> Self {
        Self { fs }
    }
}

impl Command for EnsureDirectoryCommand {
    fn name(&self) -> &'static str {
        "fs.ensure_dir"
    }

    fn validate(&self, params: &CommandParams) -> Result<(), FsError> {
        params.require_string("path")?;
        params.get_mode("mode", self.fs.directory_mode())?;
        Ok(())
    }

    fn execute(
        &self,
        _ctx: &ExecutionContext,
        params: CommandParams,
    ) -> Result<CommandResult, FsError> {
        let path = params.get_string("path")?;
        let mode = params.get_mode("mode", self.fs.directory_mode())?;
        let existed = self.fs.is_directory(&path);
        if !existed {
            let owner = requested_owner(&self.fs, &params)?;
            self.fs.create_directory(&path, owner.as_ref(), mode)?;
        }

        Ok(CommandResult::success(serde_json::json!({
            "path": path,
            "created": !existed,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fs::test_support::{test_filesystem, RecordingRunner};
    use crate::identity::{FixedUser, Owner};
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    #[test]
    fn test_mkdir_validate() {
        let (fs, _) = test_filesystem();
        let cmd = CreateDirectoryCommand::new(fs);

        assert!(cmd
            .validate(&CommandParams::new(serde_json::json!({"path": "/srv/app"})))
            .is_ok());
        assert!(cmd.validate(&CommandParams::new(serde_json::json!({}))).is_err());
        assert!(cmd
            .validate(&CommandParams::new(
                serde_json::json!({"path": "/srv/app", "mode": "0999"})
            ))
            .is_err());
    }

    #[test]
    fn test_mkdir_execute_with_mode() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a/b/c");
        let (fs, _) = test_filesystem();
        let cmd = CreateDirectoryCommand::new(fs);
        let ctx = ExecutionContext::for_command("fs.mkdir");

        let params = CommandParams::new(serde_json::json!({
            "path": target.to_str().unwrap(),
            "mode": "0700",
            "as_user": true
        }));
        let result = cmd.execute(&ctx, params).unwrap();

        assert!(result.success);
        assert!(target.is_dir());
        let mode = std::fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[test]
    fn test_mkdir_defaults_to_configured_mode() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("site");
        let fs = Filesystem::new(
            Arc::new(RecordingRunner::default()),
            Arc::new(FixedUser(Owner::Id(nix::unistd::geteuid().as_raw()))),
        )
        .with_directory_mode(0o710);
        let cmd = CreateDirectoryCommand::new(Arc::new(fs));
        let ctx = ExecutionContext::for_command("fs.mkdir");

        let params = CommandParams::new(serde_json::json!({
            "path": target.to_str().unwrap()
        }));
        let result = cmd.execute(&ctx, params).unwrap();

        assert_eq!(result.data.unwrap()["mode"], "0710");
        let mode = std::fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o710);
    }

    #[test]
    fn test_ensure_dir_reports_existing() {
        let dir = TempDir::new().unwrap();
        let (fs, _) = test_filesystem();
        let cmd = EnsureDirectoryCommand::new(fs);
        let ctx = ExecutionContext::for_command("fs.ensure_dir");

        let params = CommandParams::new(serde_json::json!({
            "path": dir.path().to_str().unwrap()
        }));
        let result = cmd.execute(&ctx, params).unwrap();
        assert_eq!(result.data.unwrap()["created"], false);
    }

    #[test]
    fn test_is_dir_is_read_only() {
        let (fs, _) = test_filesystem();
        assert!(!IsDirectoryCommand::new(fs).is_mutating());
    }
}
