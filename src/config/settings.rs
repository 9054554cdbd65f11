//! Configuration settings for the Lumo filesystem gateway.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::FsError;
use crate::validation::{parse_mode, validate_owner_name};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Operating user configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserConfig {
    /// Fixed non-root user. When absent the user is resolved from the environment.
    pub name: Option<String>,
}

/// Delegated command configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandsConfig {
    /// Privilege helper used to run commands as another user.
    #[serde(default = "default_program")]
    pub program: String,
    /// Shell that interprets the delegated command string.
    #[serde(default = "default_shell")]
    pub shell: String,
    /// Delegated command timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Defaults applied to filesystem operations.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultsConfig {
    /// Directory permissions in octal (e.g., "0755").
    #[serde(default = "default_directory_mode")]
    pub directory_mode: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format ("pretty" or "json").
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_program() -> String {
    "sudo".to_string()
}

fn default_shell() -> String {
    "sh".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_directory_mode() -> String {
    "0755".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            shell: default_shell(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            directory_mode: default_directory_mode(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl CommandsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Settings {
    /// Load settings from a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, FsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| FsError::Config {
            message: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;

        Self::from_toml(&content).map_err(|e| match e {
            FsError::Config { message } => FsError::Config {
                message: format!("{} ('{}')", message, path.display()),
            },
            other => other,
        })
    }

    /// Parse and validate settings from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, FsError> {
        let settings: Settings = toml::from_str(content).map_err(|e| FsError::Config {
            message: format!("Failed to parse config: {}", e),
        })?;

        settings.validate()?;

        Ok(settings)
    }

    /// Directory mode as permission bits.
    pub fn directory_mode(&self) -> Result<u32, FsError> {
        parse_mode(&self.defaults.directory_mode)
    }

    /// Validate the settings.
    fn validate(&self) -> Result<(), FsError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(FsError::Config {
                message: format!(
                    "Invalid log level '{}'. Valid levels: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        let valid_formats = ["pretty", "json"];
        if !valid_formats.contains(&self.logging.format.to_lowercase().as_str()) {
            return Err(FsError::Config {
                message: format!(
                    "Invalid log format '{}'. Valid formats: {:?}",
                    self.logging.format, valid_formats
                ),
            });
        }

        if self.directory_mode().is_err() {
            return Err(FsError::Config {
                message: format!(
                    "Invalid directory mode '{}'. Must be octal (e.g., '0755')",
                    self.defaults.directory_mode
                ),
            });
        }

        if self.commands.program.trim().is_empty() || self.commands.shell.trim().is_empty() {
            return Err(FsError::Config {
                message: "Command program and shell must not be empty".to_string(),
            });
        }

        if self.commands.timeout_seconds == 0 {
            return Err(FsError::Config {
                message: "Command timeout must be greater than zero".to_string(),
            });
        }

        if let Some(name) = &self.user.name {
            validate_owner_name(name).map_err(|e| FsError::Config {
                message: format!("Invalid user name: {}", e),
            })?;
        }

        Ok(())
    }
}
