//! Configuration module for the Lumo filesystem gateway.
//!
//! Handles loading and validating configuration from TOML files.

mod settings;

pub use settings::*;
