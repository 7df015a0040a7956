//! Runtime-checkable session invariants
//!
//! Assertions used by tests and the property suite:
//! 1. `BiometricVerified` requires an enabled binding matching the session
//!    identity
//! 2. `Authenticated` and `BiometricVerified` sessions carry an identity
//! 3. Pre-auth states carry no identity

use crate::domain::entity::binding::BiometricBinding;
use crate::domain::entity::session::{Session, SessionState};

/// An invariant violation with details
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Name of the violated invariant
    pub invariant: &'static str,
    /// What went wrong
    pub description: String,
}

/// Check all session invariants.
///
/// Returns a list of violations (empty if all invariants hold).
pub fn check_all(
    session: &Session,
    binding: Option<&BiometricBinding>,
) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    violations.extend(check_biometric_verified_gated(session, binding));
    violations.extend(check_identity_presence(session));
    violations
}

/// Invariant 1: BiometricVerified only with an enabled matching binding
fn check_biometric_verified_gated(
    session: &Session,
    binding: Option<&BiometricBinding>,
) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    if session.state == SessionState::BiometricVerified {
        let authorized = match (&session.identity, binding) {
            (Some(identity), Some(b)) => b.authorizes(&identity.email),
            _ => false,
        };
        if !authorized {
            violations.push(InvariantViolation {
                invariant: "biometric_verified_gated",
                description: format!(
                    "BiometricVerified without an enabled matching binding (identity: {:?})",
                    session.identity
                ),
            });
        }
    }

    violations
}

/// Invariants 2 and 3: identity presence matches the state
fn check_identity_presence(session: &Session) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    let expects_identity = matches!(
        session.state,
        SessionState::Authenticated | SessionState::BiometricVerified
    );
    if expects_identity && session.identity.is_none() {
        violations.push(InvariantViolation {
            invariant: "identity_presence",
            description: format!("state {} without an identity", session.state),
        });
    }
    if !expects_identity && session.identity.is_some() {
        violations.push(InvariantViolation {
            invariant: "identity_presence",
            description: format!("state {} with a leftover identity", session.state),
        });
    }

    violations
}
