//! Command executor module.
//!
//! Handles subprocess spawning with timeouts and delegated execution as the
//! current user.

mod runner;
mod subprocess;

pub use runner::{CommandRunner, SudoRunner};
pub use subprocess::{run_command, sanitize_output, SubprocessBuilder, SubprocessResult};
