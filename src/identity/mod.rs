//! Account identities.
//!
//! `Owner` and `Group` name the account a path should belong to. The
//! `CurrentUser` trait resolves the unprivileged user that provisioned files
//! are handed to when the process itself runs as root.

mod account;
mod current;

pub use account::{Group, Owner};
pub use current::{CurrentUser, FixedUser, SudoUser};
