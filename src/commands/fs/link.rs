//! Symlink and path resolution commands.

use std::sync::Arc;

use tracing::info;

use crate::error::FsError;
use crate::filesystem::Filesystem;

use super::super::traits::Command;
use super::super::types::{CommandParams, CommandResult, ExecutionContext};

/// Point `link` at `target`, replacing any existing entry at `link`.
///
/// # Parameters
///
/// - `target` (required)
/// - `link` (required)
/// - `as_user` (optional): create the link as the current user
pub struct SymlinkCommand {
    fs: Arc<Filesystem>,
}

impl SymlinkCommand {
    pub fn new(fs: Arc<Filesystem>) -> Self {
        Self { fs }
    }
}

impl Command for SymlinkCommand {
    fn name(&self) -> &'static str {
        "fs.symlink"
    }

    fn validate(&self, params: &CommandParams) -> Result<(), FsError> {
        params.require_string("target")?;
        params.require_string("link")
    }

    fn execute(
        &self,
        ctx: &ExecutionContext,
        params: CommandParams,
    ) -> Result<CommandResult, FsError> {
        let target = params.get_string("target")?;
        let link = params.get_string("link")?;
        let as_user = params.get_optional_bool("as_user", false);

        if as_user {
            self.fs.create_symlink_as_current_user(&target, &link)?;
        } else {
            self.fs.create_symlink(&target, &link)?;
        }

        info!(request_id = %ctx.request_id, target = %target, link = %link, as_user, "Symlink created");

        Ok(CommandResult::success(serde_json::json!({
            "target": target,
            "link": link,
        })))
    }
}

/// Check whether a path is a symlink (without following it).
pub struct IsSymlinkCommand {
    fs: Arc<Filesystem>,
}

impl IsSymlinkCommand {
    pub fn new(fs: Arc<Filesystem>) -> Self {
        Self { fs }
    }
}

impl Command for IsSymlinkCommand {
    fn name(&self) -> &'static str {
        "fs.is_link"
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
            "is_link": self.fs.is_symlink(&path),
        })))
    }

    fn is_mutating(&self) -> bool {
        false
    }
}

/// Read the target a symlink points at.
pub struct ReadSymlinkCommand {
    fs: Arc<Filesystem>,
}

impl ReadSymlinkCommand {
    pub fn new(fs: Arc<Filesystem>) -> Self {
        Self { fs }
    }
}

impl Command for ReadSymlinkCommand {
    fn name(&self) -> &'static str {
        "fs.readlink"
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
        let target = self.fs.read_symlink_target(&path)?;
        Ok(CommandResult::success(serde_json::json!({
            "path": path,
            "target": target.to_string_lossy(),
        })))
    }

    fn is_mutating(&self) -> bool {
        false
    }
}

/// Resolve a path to its canonical absolute form.
pub struct RealPathCommand {
    fs: Arc<Filesystem>,
}

impl RealPathCommand {
    pub fn new(fs: Arc<Filesystem>) -> Self {
        Self { fs }
    }
}

impl Command for RealPathCommand {
    fn name(&self) -> &'static str {
        "fs.realpath"
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
        let resolved = self.fs.resolve_real_path(&path)?;
        Ok(CommandResult::success(serde_json::json!({
            "path": path,
            "real_path": resolved.to_string_lossy(),
        })))
    }

    fn is_mutating(&self) -> bool {
        false
    }
}
