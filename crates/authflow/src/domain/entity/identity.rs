//! Identity Entity

use serde::{Deserialize, Serialize};

use crate::domain::value_object::email::Email;

/// Account identity as reported by the identity provider
///
/// Created on successful sign-up. Immutable from this system's perspective;
/// the provider owns the account record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Account email, unique per provider account
    pub email: Email,
    /// Display name captured at sign-up, if any
    pub display_name: Option<String>,
}

impl Identity {
    pub fn new(email: Email, display_name: Option<String>) -> Self {
        Self {
            email,
            display_name,
        }
    }
}
