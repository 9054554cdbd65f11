//! Owner and group values and their resolution to numeric IDs.

use std::fmt;
use std::str::FromStr;

use nix::unistd::{Gid, Uid};

use crate::error::{FsError, FsResult};
use crate::validation::{validate_group_name, validate_owner_name};

/// A user account that a path can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Owner {
    Name(String),
    Id(u32),
}

/// A group that a path can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Group {
    Name(String),
    Id(u32),
}

impl Owner {
    /// Create a named owner, validating the name.
    pub fn name(name: impl Into<String>) -> FsResult<Self> {
        let name = name.into();
        validate_owner_name(&name)?;
        Ok(Owner::Name(name))
    }

    /// Resolve to a numeric UID through the user database.
    pub fn resolve(&self) -> FsResult<Uid> {
        match self {
            Owner::Id(id) => Ok(Uid::from_raw(*id)),
            Owner::Name(name) => match nix::unistd::User::from_name(name) {
                Ok(Some(user)) => Ok(user.uid),
                Ok(None) => Err(FsError::UnknownUser { name: name.clone() }),
                Err(e) => Err(FsError::Identity {
                    message: format!("Failed to look up user '{}': {}", name, e),
                }),
            },
        }
    }
}

impl Group {
    /// Create a named group, validating the name.
    pub fn name(name: impl Into<String>) -> FsResult<Self> {
        let name = name.into();
        validate_group_name(&name)?;
        Ok(Group::Name(name))
    }

    /// Resolve to a numeric GID through the group database.
    pub fn resolve(&self) -> FsResult<Gid> {
        match self {
            Group::Id(id) => Ok(Gid::from_raw(*id)),
            Group::Name(name) => match nix::unistd::Group::from_name(name) {
                Ok(Some(group)) => Ok(group.gid),
                Ok(None) => Err(FsError::UnknownGroup { name: name.clone() }),
                Err(e) => Err(FsError::Identity {
                    message: format!("Failed to look up group '{}': {}", name, e),
                }),
            },
        }
    }
}

impl From<u32> for Owner {
    fn from(id: u32) -> Self {
        Owner::Id(id)
    }
}

impl From<u32> for Group {
    fn from(id: u32) -> Self {
        Group::Id(id)
    }
}

/// All-digit strings are numeric IDs; anything else must be a valid name.
impl FromStr for Owner {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_numeric(s) {
            Some(id) => Ok(Owner::Id(id)),
            None => Owner::name(s),
        }
    }
}

impl FromStr for Group {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_numeric(s) {
            Some(id) => Ok(Group::Id(id)),
            None => Group::name(s),
        }
    }
}

fn parse_numeric(s: &str) -> Option<u32> {
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Name(name) => f.write_str(name),
            Owner::Id(id) => write!(f, "{}", id),
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Name(name) => f.write_str(name),
            Group::Id(id) => write!(f, "{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::unistd::{getegid, geteuid};

    #[test]
    fn test_parse_owner() {
        assert_eq!("1000".parse::<Owner>().unwrap(), Owner::Id(1000));
        assert_eq!(
            "deploy".parse::<Owner>().unwrap(),
            Owner::Name("deploy".to_string())
        );
        assert!("bad name".parse::<Owner>().is_err());
        assert!("".parse::<Owner>().is_err());
    }

    #[test]
    fn test_parse_group() {
        assert_eq!("33".parse::<Group>().unwrap(), Group::Id(33));
        assert_eq!(
            "www-data".parse::<Group>().unwrap(),
            Group::Name("www-data".to_string())
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Owner::Id(0).to_string(), "0");
        assert_eq!(Owner::name("deploy").unwrap().to_string(), "deploy");
        assert_eq!(Group::Id(20).to_string(), "20");
    }

    #[test]
    fn test_resolve_numeric() {
        let uid = geteuid();
        assert_eq!(Owner::Id(uid.as_raw()).resolve().unwrap(), uid);
        let gid = getegid();
        assert_eq!(Group::Id(gid.as_raw()).resolve().unwrap(), gid);
    }

    #[test]
    fn test_resolve_root_by_name() {
        assert_eq!(
            Owner::name("root").unwrap().resolve().unwrap(),
            Uid::from_raw(0)
        );
    }

    #[test]
    fn test_resolve_unknown_user() {
        let owner = Owner::name("lumo_no_such_user_12345").unwrap();
        assert!(matches!(owner.resolve(), Err(FsError::UnknownUser { .. })));
    }

    #[test]
    fn test_resolve_unknown_group() {
        let group = Group::name("lumo_no_such_group_12345").unwrap();
        assert!(matches!(group.resolve(), Err(FsError::UnknownGroup { .. })));
    }
}
