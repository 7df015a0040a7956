//! Biometric Binding Entity
//!
//! Local association between the device biometric and a previously
//! authenticated identity, enabling password-less re-entry. At most one
//! binding exists per device profile; it is persisted in the preference
//! store and reloaded at startup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_object::email::Email;

/// Biometric binding entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiometricBinding {
    /// Email of the identity that completed a password sign-in
    pub bound_email: Email,
    /// Disabled bindings stay on disk but never gate a challenge
    pub enabled: bool,
    /// When the user opted in
    pub created_at: DateTime<Utc>,
}

impl BiometricBinding {
    /// Create an enabled binding for a just-authenticated email.
    pub fn new(bound_email: Email) -> Self {
        Self {
            bound_email,
            enabled: true,
            created_at: Utc::now(),
        }
    }

    /// Whether this binding authorizes re-entry for `email`.
    pub fn authorizes(&self, email: &Email) -> bool {
        self.enabled && self.bound_email == *email
    }

    /// Mark the binding unusable without forgetting the email.
    pub fn disable(&mut self) {
        self.enabled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_binding_is_enabled() {
        let binding = BiometricBinding::new(Email::new("jane@x.com").unwrap());
        assert!(binding.enabled);
        assert!(binding.authorizes(&Email::new("jane@x.com").unwrap()));
    }

    #[test]
    fn test_disabled_binding_authorizes_nothing() {
        let mut binding = BiometricBinding::new(Email::new("jane@x.com").unwrap());
        binding.disable();
        assert!(!binding.authorizes(&Email::new("jane@x.com").unwrap()));
    }

    #[test]
    fn test_binding_rejects_other_email() {
        let binding = BiometricBinding::new(Email::new("jane@x.com").unwrap());
        assert!(!binding.authorizes(&Email::new("bob@x.com").unwrap()));
    }
}
