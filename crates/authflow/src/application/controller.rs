//! Session Controller
//!
//! The state machine coordinating validation, the credential authenticator
//! and the biometric gate. Every operation is one serialized transition: a
//! mutex admits at most one in flight, so a biometric challenge can never
//! race a sign-out that clears the binding, and state plus persisted
//! binding commit together or not at all. Snapshots are published over a
//! watch channel for the presentation layer.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};

use device::biometric::BiometricDevice;
use device::prefs::PreferenceStore;

use crate::application::authenticator::CredentialAuthenticator;
use crate::application::biometric_gate::BiometricGate;
use crate::application::config::FlowConfig;
use crate::domain::entity::session::{Session, SessionEvent, SessionState};
use crate::domain::provider::IdentityProvider;
use crate::domain::value_object::email::Email;
use crate::domain::value_object::password::RawPassword;
use crate::domain::value_object::validation;
use crate::error::{BiometricError, FlowError, FlowResult};

/// Sign up form input
#[derive(Debug, Clone)]
pub struct SignUpInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Sign in form input
#[derive(Debug, Clone)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

struct FlowState<P, D, S>
where
    P: IdentityProvider,
    D: BiometricDevice,
    S: PreferenceStore,
{
    authenticator: CredentialAuthenticator<P>,
    gate: BiometricGate<D, S>,
    session: Session,
}

/// Session controller
pub struct SessionController<P, D, S>
where
    P: IdentityProvider,
    D: BiometricDevice,
    S: PreferenceStore,
{
    state: Mutex<FlowState<P, D, S>>,
    snapshots: watch::Sender<Session>,
    config: FlowConfig,
}

impl<P, D, S> SessionController<P, D, S>
where
    P: IdentityProvider,
    D: BiometricDevice,
    S: PreferenceStore,
{
    /// Build the controller, restoring the persisted binding.
    pub async fn new(
        provider: Arc<P>,
        device: Arc<D>,
        prefs: Arc<S>,
        config: FlowConfig,
    ) -> FlowResult<Self> {
        let gate = BiometricGate::load(device, prefs, config.binding_key()).await?;
        let session = Session::unauthenticated();
        let (snapshots, _) = watch::channel(session.clone());

        Ok(Self {
            state: Mutex::new(FlowState {
                authenticator: CredentialAuthenticator::new(provider),
                gate,
                session,
            }),
            snapshots,
            config,
        })
    }

    /// Current session snapshot.
    pub fn session(&self) -> Session {
        self.snapshots.borrow().clone()
    }

    /// Subscribe to session snapshots; the receiver always holds the
    /// latest.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.snapshots.subscribe()
    }

    /// Whether biometric enrollment can be offered right now.
    pub async fn can_offer_biometric(&self) -> bool {
        self.state.lock().await.gate.can_offer()
    }

    /// Whether a biometric re-entry attempt could currently succeed.
    pub async fn biometric_ready(&self) -> bool {
        self.state.lock().await.gate.ready()
    }

    /// Promote a cached provider session at startup, skipping the sign-in
    /// screen.
    pub async fn resume(&self) -> FlowResult<Session> {
        let mut state = self.state.lock().await;
        if state.session.state != SessionState::Unauthenticated {
            return Err(FlowError::InvalidTransition {
                state: state.session.state,
            });
        }

        let Some(identity) = state.authenticator.current_identity().await else {
            return Ok(state.session.clone());
        };

        tracing::info!(email = %identity.email, "resuming cached provider session");
        self.advance(&mut state, SessionEvent::AuthStarted);
        Ok(self.advance(&mut state, SessionEvent::AuthSucceeded(identity)))
    }

    /// Create an account and enter an authenticated session.
    pub async fn sign_up(&self, input: SignUpInput) -> FlowResult<Session> {
        let mut state = self.state.lock().await;
        if state.session.state != SessionState::Unauthenticated {
            return Err(FlowError::InvalidTransition {
                state: state.session.state,
            });
        }

        validation::ensure_present(&input.name)?;
        let email = Email::new(&input.email)?;
        let password = RawPassword::new(input.password.as_str())?;
        validation::ensure_match(&input.password, &input.confirm_password)?;

        self.advance(&mut state, SessionEvent::AuthStarted);
        match state
            .authenticator
            .sign_up(&email, &password, Some(input.name.trim()))
            .await
        {
            Ok(identity) => Ok(self.advance(&mut state, SessionEvent::AuthSucceeded(identity))),
            Err(err) => {
                self.advance(&mut state, SessionEvent::AuthFailed(err.clone()));
                let err = FlowError::Auth(err);
                err.log();
                Err(err)
            }
        }
    }

    /// Verify credentials and enter an authenticated session.
    pub async fn sign_in(&self, input: SignInInput) -> FlowResult<Session> {
        let mut state = self.state.lock().await;
        if state.session.state != SessionState::Unauthenticated {
            return Err(FlowError::InvalidTransition {
                state: state.session.state,
            });
        }

        let email = Email::new(&input.email)?;
        let password = RawPassword::new(input.password)?;

        self.advance(&mut state, SessionEvent::AuthStarted);
        match state.authenticator.sign_in(&email, &password).await {
            Ok(identity) => Ok(self.advance(&mut state, SessionEvent::AuthSucceeded(identity))),
            Err(err) => {
                self.advance(&mut state, SessionEvent::AuthFailed(err.clone()));
                let err = FlowError::Auth(err);
                err.log();
                Err(err)
            }
        }
    }

    /// Ask the provider to send a reset link; no state change.
    pub async fn request_password_reset(&self, email: &str) -> FlowResult<()> {
        let state = self.state.lock().await;
        let email = Email::new(email)?;

        state
            .authenticator
            .request_password_reset(&email)
            .await
            .map_err(|err| {
                let err = FlowError::Auth(err);
                err.log();
                err
            })
    }

    /// Opt the signed-in identity into biometric re-entry.
    ///
    /// Allowed only while authenticated; rebinding over another account's
    /// enabled binding is refused, an explicit
    /// `sign_out(retain_binding = false)` must clear it first.
    pub async fn enable_biometric(&self) -> FlowResult<Session> {
        let mut state = self.state.lock().await;
        if state.session.state != SessionState::Authenticated {
            return Err(FlowError::InvalidTransition {
                state: state.session.state,
            });
        }
        let Some(identity) = state.session.identity.clone() else {
            return Err(FlowError::InvalidTransition {
                state: state.session.state,
            });
        };

        if let Some(binding) = state.gate.binding().filter(|b| b.enabled) {
            if binding.bound_email == identity.email {
                // Already enrolled for this account
                return Ok(self.advance(&mut state, SessionEvent::BindingAccepted));
            }
            return Err(FlowError::BindingMismatch);
        }

        if !state.gate.can_offer() {
            return Err(FlowError::Biometric(BiometricError::HardwareUnavailable));
        }

        state.gate.bind(&identity.email).await?;
        Ok(self.advance(&mut state, SessionEvent::BindingAccepted))
    }

    /// End the session.
    ///
    /// The provider sign-out always succeeds locally; declining to keep the
    /// binding removes it in the same transition.
    pub async fn sign_out(&self, retain_binding: bool) -> FlowResult<Session> {
        let mut state = self.state.lock().await;

        if !retain_binding {
            state.gate.unbind().await?;
        }
        state.authenticator.sign_out().await;

        Ok(self.advance(&mut state, SessionEvent::SignedOut))
    }

    /// Re-enter a session with a biometric challenge instead of a password.
    ///
    /// Cancellation and sensor failures leave the session where it was,
    /// with the error attached to the published snapshot.
    pub async fn biometric_reentry(&self) -> FlowResult<Session> {
        let mut state = self.state.lock().await;
        if state.session.state != SessionState::Unauthenticated {
            return Err(FlowError::InvalidTransition {
                state: state.session.state,
            });
        }

        self.advance(&mut state, SessionEvent::ChallengeStarted);
        let identity = match state.gate.challenge().await {
            Ok(identity) => identity,
            Err(err) => {
                self.advance(&mut state, SessionEvent::ChallengeFailed(err));
                let err = FlowError::Biometric(err);
                err.log();
                return Err(err);
            }
        };

        let verified =
            self.advance(&mut state, SessionEvent::ChallengeVerified(identity.clone()));
        if verified.state != SessionState::BiometricVerified {
            let err = FlowError::Biometric(BiometricError::NotEnrolled);
            err.log();
            return Err(err);
        }

        match state.authenticator.current_identity().await {
            Some(current) if current.email == identity.email => {
                tracing::info!(email = %identity.email, "biometric re-entry with live provider session");
                Ok(self.advance(&mut state, SessionEvent::ChallengePromoted))
            }
            Some(_) => {
                let err = FlowError::BindingMismatch;
                err.log();
                self.advance(&mut state, SessionEvent::PromotionRefused(err.clone()));
                Err(err)
            }
            None if self.config.require_live_session => {
                let err = FlowError::ProviderSessionExpired;
                err.log();
                self.advance(&mut state, SessionEvent::PromotionRefused(err.clone()));
                Err(err)
            }
            None => {
                tracing::warn!(email = %identity.email, "provider session expired, re-entry with reduced assurance");
                Ok(self.advance(&mut state, SessionEvent::ChallengePromoted))
            }
        }
    }

    /// Apply one event to the session and publish the snapshot.
    fn advance(&self, state: &mut FlowState<P, D, S>, event: SessionEvent) -> Session {
        let next = state.session.apply(state.gate.binding(), &event);
        tracing::debug!(from = %state.session.state, to = %next.state, "session transition");
        state.session = next.clone();
        self.snapshots.send_replace(next.clone());
        next
    }
}
