//! Current (non-root) user resolution.

use std::env;

use nix::unistd::geteuid;
use tracing::debug;

use crate::error::{FsError, FsResult};

use super::Owner;

/// Resolves the unprivileged account that provisioned files should belong to.
pub trait CurrentUser: Send + Sync {
    fn current_user(&self) -> FsResult<Owner>;
}

/// Always resolves to the same, configured account.
#[derive(Debug, Clone)]
pub struct FixedUser(pub Owner);

impl CurrentUser for FixedUser {
    fn current_user(&self) -> FsResult<Owner> {
        Ok(self.0.clone())
    }
}

/// Resolves the user that invoked the process through `sudo`.
///
/// Order: `SUDO_USER`, then `USER`, then the name of the effective UID.
#[derive(Debug, Clone, Copy, Default)]
pub struct SudoUser;

impl SudoUser {
    /// Resolve using an arbitrary variable lookup.
    pub fn resolve_with<F>(lookup: F) -> FsResult<Owner>
    where
        F: Fn(&str) -> Option<String>,
    {
        for var in ["SUDO_USER", "USER"] {
            if let Some(value) = lookup(var).filter(|v| !v.is_empty()) {
                debug!(source = var, user = %value, "Resolved current user");
                return Owner::name(value);
            }
        }

        let uid = geteuid();
        match nix::unistd::User::from_uid(uid) {
            Ok(Some(user)) => {
                debug!(source = "euid", user = %user.name, "Resolved current user");
                Owner::name(user.name)
            }
            Ok(None) => Err(FsError::Identity {
                message: format!("No user name for effective UID {}", uid),
            }),
            Err(e) => Err(FsError::Identity {
                message: format!("Failed to look up effective UID {}: {}", uid, e),
            }),
        }
    }
}

impl CurrentUser for SudoUser {
    fn current_user(&self) -> FsResult<Owner> {
        Self::resolve_with(|var| env::var(var).ok())
    }
}
