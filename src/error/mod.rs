//! Error types for the Lumo filesystem gateway.
//!
//! Provides a unified error handling system using thiserror.

mod types;

pub use types::*;
