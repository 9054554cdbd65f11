//! Command registry for dispatching named operations to handlers.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{CommandErrorKind, FsError};
use crate::filesystem::Filesystem;

use super::fs::{
    AppendFileCommand, ChangeGroupCommand, ChangeOwnerCommand, CopyFileCommand,
    CreateDirectoryCommand, DeleteCommand, EnsureDirectoryCommand, ExistsCommand,
    IsDirectoryCommand, IsSymlinkCommand, ReadFileCommand, ReadSymlinkCommand, RealPathCommand,
    SetPermissionsCommand, SymlinkCommand, TouchCommand, WriteFileCommand,
};
use super::traits::Command;
use super::types::{CommandParams, CommandResult, ExecutionContext};

/// Registry of all available commands.
#[derive(Clone)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, Arc<dyn Command>>,
}

impl CommandRegistry {
    /// Create a registry with every filesystem command bound to `fs`.
    pub fn new(fs: Arc<Filesystem>) -> Self {
        let mut registry = Self {
            commands: HashMap::new(),
        };

        // Directories
        registry.register(Arc::new(IsDirectoryCommand::new(Arc::clone(&fs))));
        registry.register(Arc::new(CreateDirectoryCommand::new(Arc::clone(&fs))));
        registry.register(Arc::new(EnsureDirectoryCommand::new(Arc::clone(&fs))));

        // Files
        registry.register(Arc::new(TouchCommand::new(Arc::clone(&fs))));
        registry.register(Arc::new(ExistsCommand::new(Arc::clone(&fs))));
        registry.register(Arc::new(ReadFileCommand::new(Arc::clone(&fs))));
        registry.register(Arc::new(WriteFileCommand::new(Arc::clone(&fs))));
        registry.register(Arc::new(AppendFileCommand::new(Arc::clone(&fs))));
        registry.register(Arc::new(CopyFileCommand::new(Arc::clone(&fs))));
        registry.register(Arc::new(DeleteCommand::new(Arc::clone(&fs))));

        // Links and paths
        registry.register(Arc::new(SymlinkCommand::new(Arc::clone(&fs))));
        registry.register(Arc::new(IsSymlinkCommand::new(Arc::clone(&fs))));
        registry.register(Arc::new(ReadSymlinkCommand::new(Arc::clone(&fs))));
        registry.register(Arc::new(RealPathCommand::new(Arc::clone(&fs))));

        // Ownership and permissions
        registry.register(Arc::new(ChangeOwnerCommand::new(Arc::clone(&fs))));
        registry.register(Arc::new(ChangeGroupCommand::new(Arc::clone(&fs))));
        registry.register(Arc::new(SetPermissionsCommand::new(fs)));

        info!(
            count = registry.commands.len(),
            "Command registry initialized"
        );

        registry
    }

    fn register(&mut self, command: Arc<dyn Command>) {
        let name = command.name();
        debug!(command = name, "Registering command");
        self.commands.insert(name, command);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.get(name).cloned()
    }

    /// Validate and execute a command by name.
    pub fn dispatch(
        &self,
        ctx: &ExecutionContext,
        command_name: &str,
        params: CommandParams,
    ) -> Result<CommandResult, FsError> {
        let command = self
            .commands
            .get(command_name)
            .ok_or_else(|| FsError::Command {
                kind: CommandErrorKind::UnknownCommand {
                    name: command_name.to_string(),
                },
            })?;

        command.validate(&params)?;

        if command.is_mutating() {
            info!(request_id = %ctx.request_id, command = command_name, "Executing command");
        } else {
            debug!(request_id = %ctx.request_id, command = command_name, "Executing read-only command");
        }

        command.execute(ctx, params)
    }

    /// Dispatch with a fresh context and fold errors into a failure result.
    pub fn execute(&self, command_name: &str, params: serde_json::Value) -> CommandResult {
        let ctx = ExecutionContext::for_command(command_name);

        match self.dispatch(&ctx, command_name, CommandParams::new(params)) {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    request_id = %ctx.request_id,
                    command = command_name,
                    error = %e,
                    "Command failed"
                );
                CommandResult::from(&e)
            }
        }
    }

    /// All registered command names, sorted.
    pub fn list_commands(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
