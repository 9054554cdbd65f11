//! UID and GID validation.
//!
//! Owners and groups arriving as JSON numbers are `i64`; chown takes `u32`.

use crate::error::{FsError, ValidationErrorKind};

/// Validate a numeric owner (user ID).
pub fn validate_uid(value: i64) -> Result<u32, FsError> {
    validate_id("owner", "UID", value)
}

/// Validate a numeric group ID.
pub fn validate_gid(value: i64) -> Result<u32, FsError> {
    validate_id("group", "GID", value)
}

fn validate_id(param: &str, label: &str, value: i64) -> Result<u32, FsError> {
    u32::try_from(value).map_err(|_| {
        let message = if value < 0 {
            format!("{} cannot be negative: {}", label, value)
        } else {
            format!("{} exceeds maximum value ({}): {}", label, u32::MAX, value)
        };
        FsError::Validation {
            kind: ValidationErrorKind::InvalidParameter {
                param: param.to_string(),
                message,
            },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_uid_valid() {
        assert_eq!(validate_uid(0).unwrap(), 0);
        assert_eq!(validate_uid(1000).unwrap(), 1000);
        assert_eq!(validate_uid(u32::MAX as i64).unwrap(), u32::MAX);
    }

    #[test]
    fn test_validate_uid_out_of_range() {
        assert!(matches!(validate_uid(-1), Err(FsError::Validation { .. })));
        assert!(matches!(
            validate_uid(u32::MAX as i64 + 1),
            Err(FsError::Validation { .. })
        ));
    }

    #[test]
    fn test_validate_gid() {
        assert_eq!(validate_gid(65534).unwrap(), 65534); // nogroup
        let err = validate_gid(-5).unwrap_err();
        assert!(err.to_string().contains("GID cannot be negative"));
    }
}
