//! Octal permission mode parsing.

use crate::error::{FsError, ValidationErrorKind};

/// Highest mode accepted, including setuid/setgid/sticky bits.
const MAX_MODE: u32 = 0o7777;

/// Parse an octal mode string (e.g., "0755") to permission bits.
pub fn parse_mode(mode_str: &str) -> Result<u32, FsError> {
    let invalid = || FsError::Validation {
        kind: ValidationErrorKind::InvalidParameter {
            param: "mode".to_string(),
            message: format!("Invalid octal mode '{}'", mode_str),
        },
    };

    if mode_str.is_empty() || !mode_str.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let digits = mode_str.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(0);
    }

    let mode = u32::from_str_radix(digits, 8).map_err(|_| invalid())?;
    if mode > MAX_MODE {
        return Err(invalid());
    }
    Ok(mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode("0644").unwrap(), 0o644);
        assert_eq!(parse_mode("644").unwrap(), 0o644);
        assert_eq!(parse_mode("0755").unwrap(), 0o755);
        assert_eq!(parse_mode("2775").unwrap(), 0o2775);
        assert_eq!(parse_mode("0000").unwrap(), 0);
    }

    #[test]
    fn test_parse_mode_invalid() {
        assert!(parse_mode("").is_err());
        assert!(parse_mode("invalid").is_err());
        assert!(parse_mode("0999").is_err());
        assert!(parse_mode("-755").is_err());
        assert!(parse_mode("17777").is_err());
    }
}
