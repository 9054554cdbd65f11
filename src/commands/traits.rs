//! Command trait definition.

use crate::error::FsError;

use super::types::{CommandParams, CommandResult, ExecutionContext};

/// A named filesystem operation invocable with JSON parameters.
///
/// # Example
///
/// ```ignore
/// pub struct ExistsCommand { fs: Arc<Filesystem> }
///
/// impl Command for ExistsCommand {
///     fn name(&self) -> &'static str {
///         "fs.exists"
///     }
///
///     fn validate(&self, params: &CommandParams) -> Result<(), FsError> {
///         params.require_string("path")
///     }
///
///     fn execute(
///         &self,
///         _ctx: &ExecutionContext,
///         params: CommandParams,
///     ) -> Result<CommandResult, FsError> {
///         let path = params.get_string("path")?;
///         Ok(CommandResult::success(serde_json::json!({"exists": self.fs.exists(&path)})))
///     }
/// }
/// ```
pub trait Command: Send + Sync {
    /// Unique command identifier (e.g., "fs.write").
    fn name(&self) -> &'static str;

    /// Check parameters before `execute` is called.
    fn validate(&self, params: &CommandParams) -> Result<(), FsError>;

    fn execute(
        &self,
        ctx: &ExecutionContext,
        params: CommandParams,
    ) -> Result<CommandResult, FsError>;

    /// Whether the command changes the filesystem.
    fn is_mutating(&self) -> bool {
        true
    }
}
