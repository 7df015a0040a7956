//! Input Validation
//!
//! Pure checks shared by the value objects and the signup form. No side
//! effects; the presentation layer runs these before any provider call, and
//! a validation failure is never retried, the user corrects the input.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Local validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    /// Required field left blank
    #[error("required field is empty")]
    Empty,

    /// Not a plausible email address
    #[error("enter a valid email address")]
    MalformedEmail,

    /// Password shorter than the minimum
    #[error("minimum 6 characters required")]
    TooShort,

    /// Password and confirmation disagree
    #[error("passwords do not match")]
    Mismatch,
}

/// Check that a password and its confirmation agree.
pub fn ensure_match(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password != confirm {
        return Err(ValidationError::Mismatch);
    }
    Ok(())
}

/// Check that a required free-text field is present.
pub fn ensure_present(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_match() {
        assert!(ensure_match("secret1", "secret1").is_ok());
        assert_eq!(
            ensure_match("secret1", "secret2"),
            Err(ValidationError::Mismatch)
        );
        assert!(ensure_match("", "").is_ok());
    }

    #[test]
    fn test_ensure_present() {
        assert!(ensure_present("Jane").is_ok());
        assert_eq!(ensure_present(""), Err(ValidationError::Empty));
        assert_eq!(ensure_present("   "), Err(ValidationError::Empty));
    }
}
