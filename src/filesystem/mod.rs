//! Filesystem gateway.
//!
//! A thin layer over OS filesystem calls used while provisioning a server.
//! Each operation is one blocking call (two when an owner is given: the
//! operation, then chown). Nothing is cached between calls.

mod as_user;
mod gateway;

pub use as_user::AsUser;
pub use gateway::{symlink_command, Filesystem, DEFAULT_DIRECTORY_MODE};
