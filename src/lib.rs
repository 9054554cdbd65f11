//! Lumo filesystem gateway.
//!
//! This crate wraps the filesystem calls used while provisioning a server:
//! creating directories, writing and appending files, symlinking and
//! changing ownership, optionally on behalf of the unprivileged user that
//! invoked the provisioning run.

pub mod commands;
pub mod config;
pub mod error;
pub mod executor;
pub mod filesystem;
pub mod identity;
pub mod logging;
pub mod validation;

pub use error::{FsError, FsResult};
pub use filesystem::{AsUser, Filesystem, DEFAULT_DIRECTORY_MODE};
pub use identity::{Group, Owner};
