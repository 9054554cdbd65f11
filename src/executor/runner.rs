//! Running shell commands as the current user.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::CommandsConfig;
use crate::error::FsResult;
use crate::identity::{CurrentUser, Owner};

use super::subprocess::{SubprocessBuilder, SubprocessResult};

/// Capability to run a shell command string as the current (non-root) user.
///
/// This is the only place where filesystem work leaves pure syscalls.
pub trait CommandRunner: Send + Sync {
    fn run_as_user(&self, command: &str) -> FsResult<SubprocessResult>;
}

/// Runs commands through a privilege helper: `sudo -u <user> sh -c <command>`.
pub struct SudoRunner {
    program: String,
    shell: String,
    timeout: Duration,
    user: Arc<dyn CurrentUser>,
}

impl SudoRunner {
    pub fn new(user: Arc<dyn CurrentUser>) -> Self {
        Self::from_config(&CommandsConfig::default(), user)
    }

    pub fn from_config(config: &CommandsConfig, user: Arc<dyn CurrentUser>) -> Self {
        Self {
            program: config.program.clone(),
            shell: config.shell.clone(),
            timeout: config.timeout(),
            user,
        }
    }

    /// Arguments passed to the privilege helper for `command`.
    pub fn helper_args(&self, owner: &Owner, command: &str) -> Vec<String> {
        // sudo addresses numeric accounts as "#<uid>".
        let user_arg = match owner {
            Owner::Name(name) => name.clone(),
            Owner::Id(id) => format!("#{}", id),
        };
        vec![
            "-u".to_string(),
            user_arg,
            self.shell.clone(),
            "-c".to_string(),
            command.to_string(),
        ]
    }
}

impl CommandRunner for SudoRunner {
    fn run_as_user(&self, command: &str) -> FsResult<SubprocessResult> {
        let owner = self.user.current_user()?;
        debug!(user = %owner, command = %command, "Running command as user");

        SubprocessBuilder::new(&self.program)
            .args(self.helper_args(&owner, command))
            .timeout(self.timeout)
            .run()?
            .into_checked(&self.program)
    }
}
