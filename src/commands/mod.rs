//! Named filesystem commands.
//!
//! Exposes every gateway operation under a `fs.*` name with JSON parameters,
//! so a CLI layer can dispatch requests without knowing the Rust API.
//!
//! ## Adding a New Command
//!
//! 1. Implement the `Command` trait in the matching file under `fs/`
//! 2. Register it in `CommandRegistry::new()`

mod registry;
mod traits;
mod types;

pub mod fs;

pub use registry::CommandRegistry;
pub use traits::Command;
pub use types::{CommandParams, CommandResult, ExecutionContext};
