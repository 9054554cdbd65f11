//! Ownership and permission commands.

use std::sync::Arc;

use tracing::info;

use crate::error::{FsError, ValidationErrorKind};
use crate::filesystem::Filesystem;

use super::super::traits::Command;
use super::super::types::{CommandParams, CommandResult, ExecutionContext};
use super::requested_owner;

/// Change the owner of a path.
///
/// # Parameters
///
/// - `path` (required)
/// - `owner` (name or UID) or `as_user: true` (one required)
pub struct ChangeOwnerCommand {
    fs: Arc<Filesystem>,
}

impl ChangeOwnerCommand {
    pub fn new(fs: Arc<Filesystem>) -> Self {
        Self { fs }
    }
}

impl Command for ChangeOwnerCommand {
    fn name(&self) -> &'static str {
        "fs.chown"
    }

    fn validate(&self, params: &CommandParams) -> Result<(), FsError> {
        params.require_string("path")?;
        if params.get_optional_bool("as_user", false) {
            return Ok(());
        }
        match params.get_optional_owner("owner")? {
            Some(_) => Ok(()),
            None => Err(FsError::Validation {
                kind: ValidationErrorKind::MissingParameter {
                    param: "owner".to_string(),
                },
            }),
        }
    }

    fn execute(
        &self,
        ctx: &ExecutionContext,
        params: CommandParams,
    ) -> Result<CommandResult, FsError> {
        let path = params.get_string("path")?;
        let owner = requested_owner(&self.fs, &params)?.ok_or_else(|| FsError::Validation {
            kind: ValidationErrorKind::MissingParameter {
                param: "owner".to_string(),
            },
        })?;

        self.fs.change_owner(&path, &owner)?;

        info!(request_id = %ctx.request_id, path = %path, owner = %owner, "Owner changed");

        Ok(CommandResult::success(serde_json::json!({
            "path": path,
            "owner": owner.to_string(),
        })))
    }
}

/// Change the group of a path.
///
/// # Parameters
///
/// - `path` (required)
/// - `group` (required): name or GID
pub struct ChangeGroupCommand {
    fs: Arc<Filesystem>,
}

impl ChangeGroupCommand {
    pub fn new(fs: Arc<Filesystem>) -> Self {
        Self { fs }
    }
}

impl Command for ChangeGroupCommand {
    fn name(&self) -> &'static str {
        "fs.chgrp"
    }

    fn validate(&self, params: &CommandParams) -> Result<(), FsError> {
        params.require_string("path")?;
        params.get_group("group")?;
        Ok(())
    }

    fn execute(
        &self,
        ctx: &ExecutionContext,
        params: CommandParams,
    ) -> Result<CommandResult, FsError> {
        let path = params.get_string("path")?;
        let group = params.get_group("group")?;

        self.fs.change_group(&path, &group)?;

        info!(request_id = %ctx.request_id, path = %path, group = %group, "Group changed");

        Ok(CommandResult::success(serde_json::json!({
            "path": path,
            "group": group.to_string(),
        })))
    }
}

/// Set permission bits on a path. Symlinks are refused.
///
/// # Parameters
///
/// - `path` (required)
/// - `mode` (required): octal string such as "0644"
pub struct SetPermissionsCommand {
    fs: Arc<Filesystem>,
}

impl SetPermissionsCommand {
    pub fn new(fs: Arc<Filesystem>) -> Self {
        Self { fs }
    }
}

impl Command for SetPermissionsCommand {
    fn name(&self) -> &'static str {
        "fs.chmod"
    }

    fn validate(&self, params: &CommandParams) -> Result<(), FsError> {
        params.require_string("path")?;
        params.require_string("mode")?;
        params.get_mode("mode", 0)?;
        Ok(())
    }

    fn execute(
        &self,
        _ctx: &ExecutionContext,
        params: CommandParams,
    ) -> Result<CommandResult, FsError> {
        let path = params.get_string("path")?;
        let mode = params.get_mode("mode", 0)?;

        self.fs.set_permissions(&path, mode)?;

        Ok(CommandResult::success(serde_json::json!({
            "path": path,
            "mode": format!("{:04o}", mode),
        })))
    }
}
