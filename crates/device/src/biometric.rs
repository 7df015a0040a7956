//! Biometric Subsystem Abstraction
//!
//! Device-level capability query and challenge prompt. The auth flow only
//! consumes the capability level and the challenge outcome; prompt UI and
//! sensor handling live behind [`BiometricDevice`] implementations.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;

/// Biometric capability reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Strong (class 3) biometric hardware, present and enrolled
    Strong,
    /// Only weak (class 2) biometrics are available
    Weak,
    /// No usable biometric hardware
    Unavailable,
}

impl Capability {
    /// Only strong biometrics may gate re-entry.
    pub fn is_strong(&self) -> bool {
        matches!(self, Capability::Strong)
    }
}

/// Challenge outcome reported by the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChallengeError {
    /// The sensor did not recognize the user
    #[error("biometric not recognized")]
    NoMatch,

    /// The user dismissed the prompt
    #[error("challenge dismissed by the user")]
    Cancelled,

    /// Sensor absent, or locked out after repeated failures
    #[error("biometric hardware unavailable")]
    Unavailable,
}

/// Trait for device biometric subsystems
#[trait_variant::make(BiometricDevice: Send)]
pub trait LocalBiometricDevice {
    /// Capability the device currently reports
    fn capability(&self) -> Capability;

    /// Prompt the user and await the challenge outcome
    async fn challenge(&self) -> Result<(), ChallengeError>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scriptable biometric device for tests, demos and development builds.
///
/// Challenge outcomes are popped from a queue; an empty queue reports a
/// match. Capability can be changed at runtime to simulate hardware loss,
/// and an optional latency makes challenges actually suspend.
#[derive(Debug)]
pub struct ScriptedBiometric {
    capability: Mutex<Capability>,
    script: Mutex<VecDeque<Result<(), ChallengeError>>>,
    latency: Option<Duration>,
}

impl ScriptedBiometric {
    pub fn new(capability: Capability) -> Self {
        Self {
            capability: Mutex::new(capability),
            script: Mutex::new(VecDeque::new()),
            latency: None,
        }
    }

    /// Add an artificial delay before each challenge resolves.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue the outcome of the next challenge.
    pub fn enqueue(&self, outcome: Result<(), ChallengeError>) {
        lock(&self.script).push_back(outcome);
    }

    /// Change the reported capability, e.g. to simulate sensor loss.
    pub fn set_capability(&self, capability: Capability) {
        *lock(&self.capability) = capability;
    }
}

impl BiometricDevice for ScriptedBiometric {
    fn capability(&self) -> Capability {
        *lock(&self.capability)
    }

    async fn challenge(&self) -> Result<(), ChallengeError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        lock(&self.script).pop_front().unwrap_or(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::{BiometricDevice, Capability, ChallengeError, ScriptedBiometric};

    #[tokio::test]
    async fn test_scripted_outcomes_in_order() {
        let device = ScriptedBiometric::new(Capability::Strong);
        device.enqueue(Err(ChallengeError::NoMatch));
        device.enqueue(Err(ChallengeError::Cancelled));
        device.enqueue(Ok(()));

        assert_eq!(device.challenge().await, Err(ChallengeError::NoMatch));
        assert_eq!(device.challenge().await, Err(ChallengeError::Cancelled));
        assert_eq!(device.challenge().await, Ok(()));
    }

    #[tokio::test]
    async fn test_empty_script_reports_match() {
        let device = ScriptedBiometric::new(Capability::Strong);
        assert_eq!(device.challenge().await, Ok(()));
    }

    #[test]
    fn test_capability_can_change() {
        let device = ScriptedBiometric::new(Capability::Strong);
        assert!(device.capability().is_strong());

        device.set_capability(Capability::Unavailable);
        assert!(!device.capability().is_strong());
    }
}
