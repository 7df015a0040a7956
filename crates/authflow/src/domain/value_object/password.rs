//! Password Value Object
//!
//! Cleartext password input, held only long enough to hand to the identity
//! provider. Never persisted locally; memory is zeroized on drop and Debug
//! output is redacted.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::domain::value_object::validation::{MIN_PASSWORD_LENGTH, ValidationError};

/// Raw password from user input
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct RawPassword(String);

impl RawPassword {
    /// Validate and wrap a password.
    ///
    /// Policy: non-blank and at least [`MIN_PASSWORD_LENGTH`] characters.
    /// Everything stronger (breach checks, complexity) is the provider's
    /// business.
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();

        if raw.trim().is_empty() {
            return Err(ValidationError::Empty);
        }
        if raw.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::TooShort);
        }

        Ok(Self(raw))
    }

    /// Expose the secret for the provider call.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_policy_table() {
        assert!(RawPassword::new("abcdef").is_ok());
        assert!(RawPassword::new("secret1").is_ok());

        assert_eq!(
            RawPassword::new("").map(|_| ()),
            Err(ValidationError::Empty)
        );
        assert_eq!(
            RawPassword::new("   ").map(|_| ()),
            Err(ValidationError::Empty)
        );
        assert_eq!(
            RawPassword::new("abc").map(|_| ()),
            Err(ValidationError::TooShort)
        );
        assert_eq!(
            RawPassword::new("abcde").map(|_| ()),
            Err(ValidationError::TooShort)
        );
    }

    #[test]
    fn test_unicode_length_counts_chars() {
        // Six characters, more than six bytes
        assert!(RawPassword::new("pässwö").is_ok());
    }

    #[test]
    fn test_debug_redaction() {
        let password = RawPassword::new("supersecret").unwrap();
        let debug = format!("{password:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("supersecret"));
    }
}
