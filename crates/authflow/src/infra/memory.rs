//! In-Memory Identity Provider
//!
//! Process-local provider backend for development and tests. Passwords are
//! stored as SHA-256 digests, never cleartext; sessions are uuid tokens
//! cached until sign-out. Failure codes follow the kebab-case convention
//! the authenticator's mapper understands.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::entity::identity::Identity;
use crate::domain::provider::{IdentityProvider, ProviderFailure};
use crate::domain::value_object::email::Email;
use crate::domain::value_object::password::RawPassword;

/// Consecutive failures before an account is locked
const MAX_FAILURES: u32 = 5;
/// How long a locked account stays locked
const LOCKOUT_SECS: i64 = 60;

struct Account {
    password_digest: [u8; 32],
    display_name: Option<String>,
    failures: u32,
    locked_until: Option<DateTime<Utc>>,
}

struct CachedSession {
    token: Uuid,
    identity: Identity,
}

#[derive(Default)]
struct ProviderState {
    accounts: HashMap<String, Account>,
    session: Option<CachedSession>,
}

/// In-memory identity provider
#[derive(Default)]
pub struct MemoryIdentityProvider {
    state: Mutex<ProviderState>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token of the cached session, if any. Tokens rotate on every sign-in.
    pub async fn session_token(&self) -> Option<Uuid> {
        self.state.lock().await.session.as_ref().map(|s| s.token)
    }

    fn digest(password: &RawPassword) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(password.expose().as_bytes());
        hasher.finalize().into()
    }
}

impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_up(
        &self,
        email: &Email,
        password: &RawPassword,
        display_name: Option<&str>,
    ) -> Result<Identity, ProviderFailure> {
        let mut state = self.state.lock().await;

        if state.accounts.contains_key(email.as_str()) {
            return Err(ProviderFailure::code(
                "email-already-in-use",
                "an account already exists for this email",
            ));
        }

        state.accounts.insert(
            email.as_str().to_string(),
            Account {
                password_digest: Self::digest(password),
                display_name: display_name.map(str::to_string),
                failures: 0,
                locked_until: None,
            },
        );

        let identity = Identity::new(email.clone(), display_name.map(str::to_string));
        let token = Uuid::new_v4();
        tracing::debug!(email = %email, token = %token, "account created, session issued");
        state.session = Some(CachedSession {
            token,
            identity: identity.clone(),
        });

        Ok(identity)
    }

    async fn sign_in(
        &self,
        email: &Email,
        password: &RawPassword,
    ) -> Result<Identity, ProviderFailure> {
        let mut state = self.state.lock().await;

        let Some(account) = state.accounts.get_mut(email.as_str()) else {
            return Err(ProviderFailure::code(
                "user-not-found",
                "no user record for this identifier",
            ));
        };

        if let Some(until) = account.locked_until {
            if Utc::now() < until {
                return Err(ProviderFailure::code(
                    "too-many-requests",
                    "access temporarily disabled after failed attempts",
                ));
            }
            account.locked_until = None;
            account.failures = 0;
        }

        if account.password_digest != Self::digest(password) {
            account.failures += 1;
            if account.failures >= MAX_FAILURES {
                account.locked_until = Some(Utc::now() + Duration::seconds(LOCKOUT_SECS));
            }
            return Err(ProviderFailure::code(
                "invalid-credential",
                "the supplied credential is incorrect",
            ));
        }

        account.failures = 0;
        let identity = Identity::new(email.clone(), account.display_name.clone());
        let token = Uuid::new_v4();
        tracing::debug!(email = %email, token = %token, "session issued");
        state.session = Some(CachedSession {
            token,
            identity: identity.clone(),
        });

        Ok(identity)
    }

    async fn request_password_reset(&self, email: &Email) -> Result<(), ProviderFailure> {
        let state = self.state.lock().await;

        if !state.accounts.contains_key(email.as_str()) {
            return Err(ProviderFailure::code(
                "user-not-found",
                "no user record for this identifier",
            ));
        }

        tracing::debug!(email = %email, "password reset message would be sent");
        Ok(())
    }

    async fn sign_out(&self) {
        self.state.lock().await.session = None;
    }

    async fn current_identity(&self) -> Option<Identity> {
        self.state
            .lock()
            .await
            .session
            .as_ref()
            .map(|s| s.identity.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> Email {
        Email::new("jane@x.com").unwrap()
    }

    fn password(raw: &str) -> RawPassword {
        RawPassword::new(raw).unwrap()
    }

    #[tokio::test]
    async fn test_sign_up_caches_session() {
        let provider = MemoryIdentityProvider::new();
        let identity = provider
            .sign_up(&jane(), &password("secret1"), Some("Jane"))
            .await
            .unwrap();

        assert_eq!(identity.email, jane());
        assert_eq!(identity.display_name, Some("Jane".to_string()));
        assert_eq!(provider.current_identity().await, Some(identity));
        assert!(provider.session_token().await.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_sign_up_rejected() {
        let provider = MemoryIdentityProvider::new();
        provider
            .sign_up(&jane(), &password("secret1"), None)
            .await
            .unwrap();

        let err = provider
            .sign_up(&jane(), &password("other99"), None)
            .await
            .unwrap_err();
        assert_eq!(err.code.as_deref(), Some("email-already-in-use"));
    }

    #[tokio::test]
    async fn test_tokens_rotate_per_sign_in() {
        let provider = MemoryIdentityProvider::new();
        provider
            .sign_up(&jane(), &password("secret1"), None)
            .await
            .unwrap();
        let first = provider.session_token().await.unwrap();

        provider.sign_out().await;
        assert_eq!(provider.session_token().await, None);
        assert_eq!(provider.current_identity().await, None);

        provider
            .sign_in(&jane(), &password("secret1"))
            .await
            .unwrap();
        let second = provider.session_token().await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_wrong_password_then_lockout() {
        let provider = MemoryIdentityProvider::new();
        provider
            .sign_up(&jane(), &password("secret1"), None)
            .await
            .unwrap();
        provider.sign_out().await;

        for _ in 0..MAX_FAILURES {
            let err = provider
                .sign_in(&jane(), &password("wrong99"))
                .await
                .unwrap_err();
            assert_eq!(err.code.as_deref(), Some("invalid-credential"));
        }

        // Locked now, even with the right password
        let err = provider
            .sign_in(&jane(), &password("secret1"))
            .await
            .unwrap_err();
        assert_eq!(err.code.as_deref(), Some("too-many-requests"));
    }

    #[tokio::test]
    async fn test_reset_requires_known_account() {
        let provider = MemoryIdentityProvider::new();
        let err = provider
            .request_password_reset(&Email::new("nobody@x.com").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.code.as_deref(), Some("user-not-found"));

        provider
            .sign_up(&jane(), &password("secret1"), None)
            .await
            .unwrap();
        assert!(provider.request_password_reset(&jane()).await.is_ok());
    }
}
