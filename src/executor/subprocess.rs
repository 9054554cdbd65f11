//! Subprocess execution with timeout enforcement.
//!
//! The program is exec'd directly; any shell interpretation is the caller's
//! explicit choice (see `SudoRunner`).

use std::collections::HashMap;
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{CommandErrorKind, FsError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Lines of stderr carried into an execution failure message.
const ERROR_OUTPUT_LINES: usize = 10;

/// Result of a subprocess execution.
#[derive(Debug, Clone)]
pub struct SubprocessResult {
    /// Whether the command exited with status 0.
    pub success: bool,
    /// The exit code, if the process was not killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl SubprocessResult {
    fn from_output(output: Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    /// Turn a non-zero exit into an `ExecutionFailed` error.
    pub fn into_checked(self, program: &str) -> Result<Self, FsError> {
        if self.success {
            return Ok(self);
        }
        let detail = sanitize_output(&self.stderr, ERROR_OUTPUT_LINES);
        Err(FsError::Command {
            kind: CommandErrorKind::ExecutionFailed {
                message: match self.exit_code {
                    Some(code) => format!("{} exited with status {}: {}", program, code, detail),
                    None => format!("{} was terminated by a signal: {}", program, detail),
                },
            },
        })
    }
}

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct SubprocessBuilder {
    program: String,
    args: Vec<String>,
    env: HashMap<String, String>,
    timeout: Duration,
    clear_env: bool,
}

impl SubprocessBuilder {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            env: HashMap::new(),
            timeout: DEFAULT_TIMEOUT,
            clear_env: false,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args.extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_string());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Start from an empty environment; only `env` entries are passed.
    pub fn clear_env(mut self) -> Self {
        self.clear_env = true;
        self
    }

    /// Spawn the process and wait for it, killing it once the timeout passes.
    pub fn run(self) -> Result<SubprocessResult, FsError> {
        debug!(
            program = %self.program,
            args = ?self.args,
            timeout_secs = self.timeout.as_secs(),
            "Executing subprocess"
        );

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if self.clear_env {
            cmd.env_clear();
        }
        cmd.envs(&self.env);

        let mut child = cmd.spawn().map_err(|e| FsError::Command {
            kind: CommandErrorKind::ExecutionFailed {
                message: format!("Failed to spawn {}: {}", self.program, e),
            },
        })?;

        let start = Instant::now();
        loop {
            let finished = child.try_wait().map_err(|e| FsError::Command {
                kind: CommandErrorKind::ExecutionFailed {
                    message: format!("Failed to check status of {}: {}", self.program, e),
                },
            })?;

            if finished.is_some() {
                let output = child.wait_with_output().map_err(|e| FsError::Command {
                    kind: CommandErrorKind::ExecutionFailed {
                        message: format!("Failed to collect output of {}: {}", self.program, e),
                    },
                })?;
                let result = SubprocessResult::from_output(output);
                debug!(
                    success = result.success,
                    exit_code = ?result.exit_code,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Subprocess completed"
                );
                return Ok(result);
            }

            if start.elapsed() > self.timeout {
                warn!(
                    program = %self.program,
                    timeout_secs = self.timeout.as_secs(),
                    "Subprocess timed out, killing"
                );
                if let Err(e) = child.kill() {
                    warn!(error = %e, "Failed to kill timed-out subprocess");
                }
                // Reap so the child does not linger as a zombie.
                let _ = child.wait();
                return Err(FsError::Command {
                    kind: CommandErrorKind::Timeout {
                        timeout_secs: self.timeout.as_secs(),
                    },
                });
            }

            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Run a program with arguments and a timeout.
pub fn run_command(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<SubprocessResult, FsError> {
    SubprocessBuilder::new(program)
        .args(args.iter().copied())
        .timeout(timeout)
        .run()
}

/// Trim command output for inclusion in error messages.
///
/// Keeps at most `max_lines` lines of at most 200 characters each, and
/// 1000 characters overall.
pub fn sanitize_output(output: &str, max_lines: usize) -> String {
    const MAX_LINE_LENGTH: usize = 200;
    const MAX_TOTAL_LENGTH: usize = 1000;

    let mut result = String::new();
    for line in output.trim_end().lines().take(max_lines) {
        let line = match line.char_indices().nth(MAX_LINE_LENGTH) {
            Some((cut, _)) => format!("{}...", &line[..cut]),
            None => line.to_string(),
        };

        if result.len() + line.len() > MAX_TOTAL_LENGTH {
            result.push_str("...[truncated]");
            return result;
        }
        if !result.is_empty() {
            result.push('\n');
        }
        result.push_str(&line);
    }

    if output.trim_end().lines().count() > max_lines {
        result.push_str("\n...[additional output truncated]");
    }
    result
}
