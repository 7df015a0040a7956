//! Auth Flow Error Types
//!
//! Closed error taxonomies for the authentication flow. Provider-native
//! failures are normalized into [`AuthError`] at the authenticator
//! boundary; the rest of the system never inspects provider codes or
//! messages.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::entity::session::SessionState;
use crate::domain::value_object::validation::ValidationError;
use device::biometric::ChallengeError;
use device::prefs::PrefsError;

/// Flow-level result type alias
pub type FlowResult<T> = Result<T, FlowError>;

/// Normalized identity-provider errors
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum AuthError {
    /// No account exists for the given email
    #[error("no account found for this email")]
    UserNotFound,

    /// Wrong password, or otherwise rejected credentials
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account already exists for the given email
    #[error("an account already exists for this email")]
    EmailAlreadyInUse,

    /// The provider is throttling this client
    #[error("too many attempts, try again later")]
    RateLimited,

    /// The provider could not be reached
    #[error("network unavailable")]
    NetworkUnavailable,

    /// Unclassified provider error; carries the provider message only
    #[error("authentication failed: {0}")]
    Unknown(String),
}

/// Biometric re-entry errors
///
/// Always recoverable: the caller falls back to password entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum BiometricError {
    /// No enabled binding exists on this device
    #[error("no biometric binding is enrolled")]
    NotEnrolled,

    /// The sensor did not recognize the user
    #[error("biometric not recognized")]
    SensorMismatch,

    /// The user dismissed the challenge
    #[error("biometric challenge cancelled")]
    Cancelled,

    /// Sensor absent, or locked out after repeated failures
    #[error("biometric hardware unavailable")]
    HardwareUnavailable,
}

impl From<ChallengeError> for BiometricError {
    fn from(err: ChallengeError) -> Self {
        match err {
            ChallengeError::NoMatch => BiometricError::SensorMismatch,
            ChallengeError::Cancelled => BiometricError::Cancelled,
            ChallengeError::Unavailable => BiometricError::HardwareUnavailable,
        }
    }
}

/// Composite error attached to session snapshots and returned by controller
/// operations
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Biometric(#[from] BiometricError),

    /// Preference store failure
    #[error("preference store error: {0}")]
    Prefs(String),

    /// Operation is not legal in the current session state
    #[error("operation not allowed while {state}")]
    InvalidTransition { state: SessionState },

    /// The provider's cached session belongs to a different account than
    /// the binding
    #[error("signed-in account does not match the biometric binding")]
    BindingMismatch,

    /// Biometric re-entry refused because the provider session is gone
    #[error("provider session expired, sign in with password")]
    ProviderSessionExpired,
}

impl From<PrefsError> for FlowError {
    fn from(err: PrefsError) -> Self {
        FlowError::Prefs(err.to_string())
    }
}

impl FlowError {
    /// Log the error with a level matched to the failure class.
    pub(crate) fn log(&self) {
        match self {
            FlowError::Prefs(msg) => {
                tracing::error!(message = %msg, "preference store failure");
            }
            FlowError::Auth(AuthError::Unknown(msg)) => {
                tracing::error!(message = %msg, "unclassified provider error");
            }
            FlowError::Auth(AuthError::InvalidCredentials) => {
                tracing::warn!("invalid sign-in attempt");
            }
            FlowError::Auth(AuthError::RateLimited) => {
                tracing::warn!("provider throttling sign-in attempts");
            }
            FlowError::BindingMismatch => {
                tracing::warn!("biometric binding does not match provider session");
            }
            _ => {
                tracing::debug!(error = %self, "auth flow error");
            }
        }
    }
}
