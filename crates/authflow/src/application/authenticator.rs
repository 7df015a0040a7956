//! Credential Authenticator
//!
//! Wraps the identity provider and normalizes its failures into the closed
//! [`AuthError`] taxonomy. Classification keys on stable provider codes and
//! the transport flag; free-text messages survive only inside
//! [`AuthError::Unknown`].

use std::sync::Arc;

use crate::domain::entity::identity::Identity;
use crate::domain::provider::{IdentityProvider, ProviderFailure};
use crate::domain::value_object::email::Email;
use crate::domain::value_object::password::RawPassword;
use crate::error::AuthError;

/// Provider wrapper producing normalized errors
pub struct CredentialAuthenticator<P>
where
    P: IdentityProvider,
{
    provider: Arc<P>,
}

impl<P> CredentialAuthenticator<P>
where
    P: IdentityProvider,
{
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    pub async fn sign_up(
        &self,
        email: &Email,
        password: &RawPassword,
        display_name: Option<&str>,
    ) -> Result<Identity, AuthError> {
        let identity = self
            .provider
            .sign_up(email, password, display_name)
            .await
            .map_err(map_failure)?;

        tracing::info!(email = %identity.email, "account created");
        Ok(identity)
    }

    pub async fn sign_in(
        &self,
        email: &Email,
        password: &RawPassword,
    ) -> Result<Identity, AuthError> {
        let identity = self
            .provider
            .sign_in(email, password)
            .await
            .map_err(map_failure)?;

        tracing::info!(email = %identity.email, "signed in");
        Ok(identity)
    }

    pub async fn request_password_reset(&self, email: &Email) -> Result<(), AuthError> {
        self.provider
            .request_password_reset(email)
            .await
            .map_err(map_failure)?;

        tracing::info!(email = %email, "password reset requested");
        Ok(())
    }

    /// Invalidate the provider session; always succeeds locally.
    pub async fn sign_out(&self) {
        self.provider.sign_out().await;
        tracing::info!("signed out");
    }

    /// Cached session identity, if the provider still holds one.
    pub async fn current_identity(&self) -> Option<Identity> {
        self.provider.current_identity().await
    }
}

/// Map a provider-native failure onto the closed taxonomy.
///
/// Codes follow the provider convention of stable kebab-case identifiers.
/// Unrecognized failures keep their message and nothing else.
fn map_failure(failure: ProviderFailure) -> AuthError {
    if failure.network {
        return AuthError::NetworkUnavailable;
    }
    match failure.code.as_deref() {
        Some("user-not-found") => AuthError::UserNotFound,
        Some("invalid-credential") | Some("wrong-password") => AuthError::InvalidCredentials,
        Some("email-already-in-use") => AuthError::EmailAlreadyInUse,
        Some("too-many-requests") => AuthError::RateLimited,
        _ => AuthError::Unknown(failure.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_mapping_table() {
        let cases = [
            ("user-not-found", AuthError::UserNotFound),
            ("invalid-credential", AuthError::InvalidCredentials),
            ("wrong-password", AuthError::InvalidCredentials),
            ("email-already-in-use", AuthError::EmailAlreadyInUse),
            ("too-many-requests", AuthError::RateLimited),
        ];
        for (code, expected) in cases {
            assert_eq!(
                map_failure(ProviderFailure::code(code, "msg")),
                expected,
                "code: {code}"
            );
        }
    }

    #[test]
    fn test_network_flag_wins() {
        assert_eq!(
            map_failure(ProviderFailure::network("connection reset")),
            AuthError::NetworkUnavailable
        );
    }

    #[test]
    fn test_unknown_keeps_message_only() {
        assert_eq!(
            map_failure(ProviderFailure::code("internal-error", "backend unavailable")),
            AuthError::Unknown("backend unavailable".to_string())
        );
        assert_eq!(
            map_failure(ProviderFailure::message("something odd")),
            AuthError::Unknown("something odd".to_string())
        );
    }
}
