//! Command types: parameters, results, and execution context.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FsError, ValidationErrorKind};
use crate::identity::{Group, Owner};
use crate::validation::{parse_mode, validate_gid, validate_uid};

/// Wrapper around command parameters with typed accessors.
#[derive(Debug, Clone)]
pub struct CommandParams {
    inner: serde_json::Value,
}

impl CommandParams {
    pub fn new(value: serde_json::Value) -> Self {
        Self { inner: value }
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.inner
    }

    /// Get a required string parameter.
    pub fn get_string(&self, key: &str) -> Result<String, FsError> {
        self.get_optional_string(key)
            .ok_or_else(|| missing(key))
    }

    pub fn get_optional_string(&self, key: &str) -> Option<String> {
        self.inner.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
    }

    /// Get an optional boolean parameter with a default.
    pub fn get_optional_bool(&self, key: &str, default: bool) -> bool {
        self.inner
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(default)
    }

    /// Require that a string parameter exists (for validation).
    pub fn require_string(&self, key: &str) -> Result<(), FsError> {
        self.get_string(key).map(|_| ())
    }

    /// Optional owner given either as a name or a numeric UID.
    pub fn get_optional_owner(&self, key: &str) -> Result<Option<Owner>, FsError> {
        match self.inner.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(s)) => s.parse().map(Some),
            Some(value) => match value.as_i64() {
                Some(id) => Ok(Some(Owner::Id(validate_uid(id)?))),
                None => Err(invalid(key, "Expected a user name or numeric UID")),
            },
        }
    }

    /// Required group given either as a name or a numeric GID.
    pub fn get_group(&self, key: &str) -> Result<Group, FsError> {
        match self.inner.get(key) {
            None | Some(serde_json::Value::Null) => Err(missing(key)),
            Some(serde_json::Value::String(s)) => s.parse(),
            Some(value) => match value.as_i64() {
                Some(id) => Ok(Group::Id(validate_gid(id)?)),
                None => Err(invalid(key, "Expected a group name or numeric GID")),
            },
        }
    }

    /// Octal mode string, or `default` when absent.
    pub fn get_mode(&self, key: &str, default: u32) -> Result<u32, FsError> {
        match self.get_optional_string(key) {
            Some(mode) => parse_mode(&mode),
            None if self.inner.get(key).is_some() => {
                Err(invalid(key, "Expected an octal string such as \"0755\""))
            }
            None => Ok(default),
        }
    }
}

fn missing(key: &str) -> FsError {
    FsError::Validation {
        kind: ValidationErrorKind::MissingParameter {
            param: key.to_string(),
        },
    }
}

fn invalid(key: &str, message: &str) -> FsError {
    FsError::Validation {
        kind: ValidationErrorKind::InvalidParameter {
            param: key.to_string(),
            message: message.to_string(),
        },
    }
}

impl From<serde_json::Value> for CommandParams {
    fn from(value: serde_json::Value) -> Self {
        Self::new(value)
    }
}

/// Result of command execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl CommandResult {
    pub fn success(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error_code: None,
            error_message: None,
        }
    }

    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error_code: Some(code.into()),
            error_message: Some(message.into()),
        }
    }
}

impl From<&FsError> for CommandResult {
    fn from(err: &FsError) -> Self {
        Self::failure(err.code(), err.to_string())
    }
}

/// Execution context for a command.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Unique identifier for this request.
    pub request_id: Uuid,
    /// Unix timestamp when the request was received.
    pub timestamp: u64,
    /// The command being executed.
    pub command: String,
}

impl ExecutionContext {
    pub fn new(request_id: Uuid, timestamp: u64, command: String) -> Self {
        Self {
            request_id,
            timestamp,
            command,
        }
    }

    /// Context with a fresh request ID and the current time.
    pub fn for_command(command: &str) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::new(Uuid::new_v4(), timestamp, command.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_params_get_string() {
        let params = CommandParams::new(serde_json::json!({
            "path": "/srv/app",
            "count": 42
        }));

        assert_eq!(params.get_string("path").unwrap(), "/srv/app");
        assert!(params.get_string("count").is_err());
        assert!(params.get_string("missing").is_err());
    }

    #[test]
    fn test_optional_owner() {
        let params = CommandParams::new(serde_json::json!({
            "by_name": "deploy",
            "by_id": 1000,
            "negative": -1,
            "bogus": ["x"],
            "null": null
        }));

        assert_eq!(
            params.get_optional_owner("by_name").unwrap(),
            Some(Owner::Name("deploy".to_string()))
        );
        assert_eq!(params.get_optional_owner("by_id").unwrap(), Some(Owner::Id(1000)));
        assert_eq!(params.get_optional_owner("missing").unwrap(), None);
        assert_eq!(params.get_optional_owner("null").unwrap(), None);
        assert!(params.get_optional_owner("negative").is_err());
        assert!(params.get_optional_owner("bogus").is_err());
    }

    #[test]
    fn test_group() {
        let params = CommandParams::new(serde_json::json!({
            "name": "www-data",
            "id": 33
        }));
        assert_eq!(
            params.get_group("name").unwrap(),
            Group::Name("www-data".to_string())
        );
        assert_eq!(params.get_group("id").unwrap(), Group::Id(33));
        assert!(params.get_group("missing").is_err());
    }

    #[test]
    fn test_mode() {
        let params = CommandParams::new(serde_json::json!({
            "mode": "0700",
            "numeric": 755
        }));
        assert_eq!(params.get_mode("mode", 0o755).unwrap(), 0o700);
        assert_eq!(params.get_mode("missing", 0o755).unwrap(), 0o755);
        assert!(params.get_mode("numeric", 0o755).is_err());
    }

    #[test]
    fn test_command_result_from_error() {
        let err = FsError::UnknownUser {
            name: "ghost".to_string(),
        };
        let result = CommandResult::from(&err);
        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(result.error_code.as_deref(), Some("UNKNOWN_USER"));
    }

    #[test]
    fn test_context_for_command() {
        let ctx = ExecutionContext::for_command("fs.write");
        assert_eq!(ctx.command, "fs.write");
        assert!(ctx.timestamp > 0);
    }
}
