//! Error types for the Lumo filesystem gateway.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for filesystem operations.
#[derive(Error, Debug)]
pub enum FsError {
    /// An underlying OS call failed.
    #[error("I/O error during {operation} on '{}': {source}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Owner name is not present in the user database.
    #[error("Unknown user: {name}")]
    UnknownUser { name: String },

    /// Group name is not present in the group database.
    #[error("Unknown group: {name}")]
    UnknownGroup { name: String },

    /// The current operating user could not be resolved.
    #[error("Identity error: {message}")]
    Identity { message: String },

    /// Delegated command errors.
    #[error("Command error: {kind}")]
    Command { kind: CommandErrorKind },

    /// Validation errors.
    #[error("Validation error: {kind}")]
    Validation { kind: ValidationErrorKind },

    /// Configuration-related errors.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Validation error kinds.
#[derive(Error, Debug)]
pub enum ValidationErrorKind {
    #[error("Missing required parameter: {param}")]
    MissingParameter { param: String },

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },
}

/// Command error kinds.
#[derive(Error, Debug)]
pub enum CommandErrorKind {
    #[error("Unknown command: {name}")]
    UnknownCommand { name: String },

    #[error("Command execution failed: {message}")]
    ExecutionFailed { message: String },

    #[error("Command timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },
}

impl FsError {
    /// Wrap an OS error with the operation and path it came from.
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        FsError::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// The underlying `io::ErrorKind`, if this is an I/O failure.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            FsError::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }

    /// Short machine-readable code used in command results.
    pub fn code(&self) -> &'static str {
        match self {
            FsError::Io { .. } => "IO_ERROR",
            FsError::UnknownUser { .. } => "UNKNOWN_USER",
            FsError::UnknownGroup { .. } => "UNKNOWN_GROUP",
            FsError::Identity { .. } => "IDENTITY_ERROR",
            FsError::Command {
                kind: CommandErrorKind::UnknownCommand { .. },
            } => "UNKNOWN_COMMAND",
            FsError::Command {
                kind: CommandErrorKind::Timeout { .. },
            } => "TIMEOUT",
            FsError::Command { .. } => "EXECUTION_FAILED",
            FsError::Validation { .. } => "VALIDATION_ERROR",
            FsError::Config { .. } => "CONFIG_ERROR",
        }
    }
}

/// Result type alias for filesystem operations.
pub type FsResult<T> = Result<T, FsError>;
