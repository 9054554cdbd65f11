//! Input validation module.
//!
//! Provides validators for owner and group names, numeric IDs and permission modes.

mod mode;
mod owner_name;
mod uid_gid;

pub use mode::parse_mode;
pub use owner_name::{validate_group_name, validate_owner_name};
pub use uid_gid::{validate_gid, validate_uid};
