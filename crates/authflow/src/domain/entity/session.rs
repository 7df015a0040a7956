//! Session Entity and State Machine
//!
//! [`Session`] is the snapshot the presentation layer consumes. Transitions
//! are a pure function over [`SessionEvent`]: the controller performs the
//! I/O, then applies the outcome here, so replaying a sequence of event
//! outcomes always yields the same session.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::entity::binding::BiometricBinding;
use crate::domain::entity::identity::Identity;
use crate::error::{AuthError, BiometricError, FlowError};

/// Authentication state of the single device session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No identity; password or biometric entry available
    Unauthenticated,
    /// A credential round-trip to the provider is in flight
    Authenticating,
    /// Signed in with a provider-verified identity
    Authenticated,
    /// A biometric challenge is in flight
    BiometricPending,
    /// Sensor accepted; awaiting promotion against provider state
    BiometricVerified,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Authenticating => "authenticating",
            SessionState::Authenticated => "authenticated",
            SessionState::BiometricPending => "biometric-pending",
            SessionState::BiometricVerified => "biometric-verified",
        };
        write!(f, "{name}")
    }
}

/// Session snapshot: state, identity and the last error, if any
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub state: SessionState,
    pub identity: Option<Identity>,
    pub error: Option<FlowError>,
}

/// Event outcomes the controller feeds into the machine
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A sign-up or sign-in round-trip started
    AuthStarted,
    /// The provider verified credentials
    AuthSucceeded(Identity),
    /// The provider rejected the attempt
    AuthFailed(AuthError),
    /// A biometric challenge started
    ChallengeStarted,
    /// The sensor accepted; identity derived from the binding
    ChallengeVerified(Identity),
    /// Provider state did not contradict the binding
    ChallengePromoted,
    /// The sensor rejected, the user cancelled, or hardware is gone
    ChallengeFailed(BiometricError),
    /// Promotion refused against provider state
    PromotionRefused(FlowError),
    /// The user opted into biometric re-entry
    BindingAccepted,
    /// Local session invalidated
    SignedOut,
}

impl Session {
    /// Initial state at process start.
    pub fn unauthenticated() -> Self {
        Self {
            state: SessionState::Unauthenticated,
            identity: None,
            error: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// Apply one event, yielding the next session.
    ///
    /// Pure and total: an event that is meaningless in the current state
    /// leaves the session unchanged. `binding` gates the
    /// `ChallengeVerified` step; nothing else consults it.
    pub fn apply(&self, binding: Option<&BiometricBinding>, event: &SessionEvent) -> Session {
        use SessionEvent::*;
        use SessionState::*;

        match (self.state, event) {
            (Unauthenticated, AuthStarted) => Session {
                state: Authenticating,
                identity: None,
                error: None,
            },
            (Authenticating, AuthSucceeded(identity)) => Session {
                state: Authenticated,
                identity: Some(identity.clone()),
                error: None,
            },
            (Authenticating, AuthFailed(err)) => Session {
                state: Unauthenticated,
                identity: None,
                error: Some(FlowError::Auth(err.clone())),
            },
            (Unauthenticated, ChallengeStarted) => Session {
                state: BiometricPending,
                identity: None,
                error: None,
            },
            (BiometricPending, ChallengeVerified(identity)) => match binding {
                Some(b) if b.authorizes(&identity.email) => Session {
                    state: BiometricVerified,
                    identity: Some(identity.clone()),
                    error: None,
                },
                // Sensor said yes but nothing vouches for this identity
                _ => Session {
                    state: Unauthenticated,
                    identity: None,
                    error: Some(FlowError::Biometric(BiometricError::NotEnrolled)),
                },
            },
            (BiometricVerified, ChallengePromoted) => Session {
                state: Authenticated,
                identity: self.identity.clone(),
                error: None,
            },
            (BiometricPending, ChallengeFailed(err)) => Session {
                state: Unauthenticated,
                identity: None,
                error: Some(FlowError::Biometric(*err)),
            },
            (BiometricVerified, PromotionRefused(err)) => Session {
                state: Unauthenticated,
                identity: None,
                error: Some(err.clone()),
            },
            (Authenticated, BindingAccepted) => Session {
                state: Authenticated,
                identity: self.identity.clone(),
                error: None,
            },
            (_, SignedOut) => Session::unauthenticated(),
            // Meaningless in this state; replay stays deterministic
            _ => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::email::Email;

    fn jane() -> Identity {
        Identity::new(Email::new("jane@x.com").unwrap(), None)
    }

    #[test]
    fn test_sign_in_happy_path() {
        let session = Session::unauthenticated()
            .apply(None, &SessionEvent::AuthStarted)
            .apply(None, &SessionEvent::AuthSucceeded(jane()));
        assert_eq!(session.state, SessionState::Authenticated);
        assert_eq!(session.identity, Some(jane()));
        assert_eq!(session.error, None);
    }

    #[test]
    fn test_auth_failure_returns_to_unauthenticated() {
        let session = Session::unauthenticated()
            .apply(None, &SessionEvent::AuthStarted)
            .apply(
                None,
                &SessionEvent::AuthFailed(AuthError::InvalidCredentials),
            );
        assert_eq!(session.state, SessionState::Unauthenticated);
        assert_eq!(session.identity, None);
        assert_eq!(
            session.error,
            Some(FlowError::Auth(AuthError::InvalidCredentials))
        );
    }

    #[test]
    fn test_challenge_requires_enabled_matching_binding() {
        let binding = BiometricBinding::new(Email::new("jane@x.com").unwrap());

        let verified = Session::unauthenticated()
            .apply(Some(&binding), &SessionEvent::ChallengeStarted)
            .apply(Some(&binding), &SessionEvent::ChallengeVerified(jane()));
        assert_eq!(verified.state, SessionState::BiometricVerified);

        let mut disabled = binding.clone();
        disabled.disable();
        let refused = Session::unauthenticated()
            .apply(Some(&disabled), &SessionEvent::ChallengeStarted)
            .apply(Some(&disabled), &SessionEvent::ChallengeVerified(jane()));
        assert_eq!(refused.state, SessionState::Unauthenticated);
        assert_eq!(
            refused.error,
            Some(FlowError::Biometric(BiometricError::NotEnrolled))
        );
    }

    #[test]
    fn test_cancelled_challenge_leaves_unauthenticated() {
        let binding = BiometricBinding::new(Email::new("jane@x.com").unwrap());
        let session = Session::unauthenticated()
            .apply(Some(&binding), &SessionEvent::ChallengeStarted)
            .apply(
                Some(&binding),
                &SessionEvent::ChallengeFailed(BiometricError::Cancelled),
            );
        assert_eq!(session.state, SessionState::Unauthenticated);
        assert_eq!(session.identity, None);
        assert_eq!(
            session.error,
            Some(FlowError::Biometric(BiometricError::Cancelled))
        );
    }

    #[test]
    fn test_sign_out_from_any_state() {
        let authed = Session::unauthenticated()
            .apply(None, &SessionEvent::AuthStarted)
            .apply(None, &SessionEvent::AuthSucceeded(jane()));
        assert_eq!(
            authed.apply(None, &SessionEvent::SignedOut),
            Session::unauthenticated()
        );
    }

    #[test]
    fn test_irrelevant_event_is_noop() {
        let session = Session::unauthenticated();
        let next = session.apply(None, &SessionEvent::ChallengePromoted);
        assert_eq!(next, session);

        let next = session.apply(None, &SessionEvent::AuthSucceeded(jane()));
        assert_eq!(next, session);
    }
}
