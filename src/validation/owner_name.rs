//! Owner and group name validation.
//!
//! Names end up in chown calls and in delegated shell commands, so they are
//! restricted to the portable account name character set.

use crate::error::{FsError, ValidationErrorKind};

/// Maximum length for account names (Linux standard).
const MAX_NAME_LENGTH: usize = 32;

/// Validate a user name used as a file owner.
///
/// Rules:
/// - Must not be empty or exceed 32 characters
/// - Must start with a letter or underscore
/// - May contain letters, digits, underscores, hyphens and dots
/// - May end with a single `$` (machine accounts)
///
/// Unlike account creation, system accounts such as `root` or `www-data`
/// are valid owners.
pub fn validate_owner_name(name: &str) -> Result<&str, FsError> {
    validate_account_name("owner", name)
}

/// Validate a group name. Same rules as [`validate_owner_name`].
pub fn validate_group_name(name: &str) -> Result<&str, FsError> {
    validate_account_name("group", name)
}

fn validate_account_name<'a>(param: &str, name: &'a str) -> Result<&'a str, FsError> {
    let invalid = |message: String| FsError::Validation {
        kind: ValidationErrorKind::InvalidParameter {
            param: param.to_string(),
            message,
        },
    };

    let first = match name.chars().next() {
        Some(c) => c,
        None => return Err(invalid("Name cannot be empty".to_string())),
    };

    if name.len() > MAX_NAME_LENGTH {
        return Err(invalid(format!(
            "Name exceeds maximum length of {} characters",
            MAX_NAME_LENGTH
        )));
    }

    if !first.is_ascii_alphabetic() && first != '_' {
        return Err(invalid(
            "Name must start with a letter or underscore".to_string(),
        ));
    }

    let body = name.strip_suffix('$').unwrap_or(name);
    for c in body.chars() {
        if !c.is_ascii_alphanumeric() && c != '_' && c != '-' && c != '.' {
            return Err(invalid(format!(
                "Name contains invalid character '{}'",
                c
            )));
        }
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_owner_names() {
        assert!(validate_owner_name("root").is_ok());
        assert!(validate_owner_name("www-data").is_ok());
        assert!(validate_owner_name("deploy").is_ok());
        assert!(validate_owner_name("_apt").is_ok());
        assert!(validate_owner_name("john.doe").is_ok());
        assert!(validate_owner_name("Admin").is_ok());
        assert!(validate_owner_name("host$").is_ok());
    }

    #[test]
    fn test_empty_name() {
        assert!(validate_owner_name("").is_err());
        assert!(validate_group_name("").is_err());
    }

    #[test]
    fn test_too_long_name() {
        assert!(validate_owner_name(&"a".repeat(33)).is_err());
        assert!(validate_owner_name(&"a".repeat(32)).is_ok());
    }

    #[test]
    fn test_invalid_first_character() {
        assert!(validate_owner_name("1john").is_err());
        assert!(validate_owner_name("-john").is_err());
        assert!(validate_owner_name(".john").is_err());
    }

    #[test]
    fn test_shell_metacharacters_rejected() {
        assert!(validate_owner_name("john doe").is_err());
        assert!(validate_owner_name("john;rm").is_err());
        assert!(validate_owner_name("john'").is_err());
        assert!(validate_owner_name("jo$hn").is_err());
        assert!(validate_group_name("staff`id`").is_err());
    }

    #[test]
    fn test_error_names_parameter() {
        let err = validate_group_name("bad group").unwrap_err();
        match err {
            FsError::Validation {
                kind: ValidationErrorKind::InvalidParameter { param, .. },
            } => assert_eq!(param, "group"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
