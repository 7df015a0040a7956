//! Account Authentication Flow
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, the pure session state machine,
//!   the identity-provider port
//! - `application/` - Authenticator, biometric gate, session controller
//! - `infra/` - In-process provider backend
//!
//! ## Features
//! - Email/password sign-up, sign-in, password reset and sign-out against a
//!   pluggable identity provider
//! - Provider failures normalized into a closed taxonomy at the boundary
//! - Biometric-gated fast re-entry bound to the last authenticated identity
//! - Serialized session transitions, published to the presentation layer
//!   over a watch channel
//!
//! ## Security Model
//! - Credential storage, verification and token issuance belong to the
//!   external provider
//! - Cleartext passwords are zeroized on drop and never persisted locally
//! - A biometric success re-asserts a previously authenticated identity; it
//!   is not proof of password knowledge, and promotion without a live
//!   provider session is an explicit policy choice

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;

// Re-exports for convenience
pub use application::config::FlowConfig;
pub use application::controller::{SessionController, SignInInput, SignUpInput};
pub use error::{AuthError, BiometricError, FlowError, FlowResult};

pub mod models {
    pub use crate::domain::entity::binding::BiometricBinding;
    pub use crate::domain::entity::identity::Identity;
    pub use crate::domain::entity::session::{Session, SessionEvent, SessionState};
    pub use crate::domain::value_object::email::Email;
    pub use crate::domain::value_object::password::RawPassword;
    pub use crate::domain::value_object::validation::{self, ValidationError};
}

pub mod provider {
    pub use crate::domain::provider::{IdentityProvider, ProviderFailure};
    pub use crate::infra::memory::MemoryIdentityProvider;
}
