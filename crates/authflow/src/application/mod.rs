//! Application Layer
//!
//! The authenticator, the biometric gate and the session controller.

pub mod authenticator;
pub mod biometric_gate;
pub mod config;
pub mod controller;

// Re-exports
pub use authenticator::CredentialAuthenticator;
pub use biometric_gate::BiometricGate;
pub use config::FlowConfig;
pub use controller::{SessionController, SignInInput, SignUpInput};
