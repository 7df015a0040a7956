//! Identity Provider Port
//!
//! The external provider is reached only through this trait; concrete
//! clients live in the infrastructure layer. Failures cross the boundary in
//! provider-native shape and are normalized by the authenticator. Callers
//! never inspect them.

use crate::domain::entity::identity::Identity;
use crate::domain::value_object::email::Email;
use crate::domain::value_object::password::RawPassword;

/// Raw failure reported by an identity provider client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    /// Stable provider error code, when one was reported
    pub code: Option<String>,
    /// Human-readable provider message
    pub message: String,
    /// True when the request never reached the provider (offline, DNS,
    /// timeout)
    pub network: bool,
}

impl ProviderFailure {
    /// Failure with a stable provider code.
    pub fn code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
            network: false,
        }
    }

    /// Failure with a message only.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            network: false,
        }
    }

    /// Transport-level failure; the request never completed.
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            network: true,
        }
    }
}

/// Identity provider trait
#[trait_variant::make(IdentityProvider: Send)]
pub trait LocalIdentityProvider {
    /// Create an account and start a session for it
    async fn sign_up(
        &self,
        email: &Email,
        password: &RawPassword,
        display_name: Option<&str>,
    ) -> Result<Identity, ProviderFailure>;

    /// Verify credentials and start a session
    async fn sign_in(
        &self,
        email: &Email,
        password: &RawPassword,
    ) -> Result<Identity, ProviderFailure>;

    /// Ask the provider to send a password reset message
    async fn request_password_reset(&self, email: &Email) -> Result<(), ProviderFailure>;

    /// Invalidate the cached session; always succeeds locally
    async fn sign_out(&self);

    /// The cached session identity, without a network round-trip
    async fn current_identity(&self) -> Option<Identity>;
}
