//! Biometric Gate
//!
//! Owns the biometric binding and mediates device challenges. A successful
//! challenge re-asserts a previously authenticated identity; it is not
//! proof of password knowledge, and promotion policy stays with the
//! session controller.

use std::sync::Arc;

use device::biometric::BiometricDevice;
use device::prefs::{PreferenceStore, PrefsError};

use crate::domain::entity::binding::BiometricBinding;
use crate::domain::entity::identity::Identity;
use crate::domain::value_object::email::Email;
use crate::error::BiometricError;

/// Binding owner and challenge mediator
pub struct BiometricGate<D, S>
where
    D: BiometricDevice,
    S: PreferenceStore,
{
    device: Arc<D>,
    prefs: Arc<S>,
    binding_key: String,
    binding: Option<BiometricBinding>,
}

impl<D, S> BiometricGate<D, S>
where
    D: BiometricDevice,
    S: PreferenceStore,
{
    /// Load the gate, restoring any persisted binding.
    ///
    /// A stored value that no longer decodes is dropped with a warning
    /// rather than failing startup.
    pub async fn load(
        device: Arc<D>,
        prefs: Arc<S>,
        binding_key: String,
    ) -> Result<Self, PrefsError> {
        let binding = match prefs.get(&binding_key).await? {
            Some(raw) => match serde_json::from_str::<BiometricBinding>(&raw) {
                Ok(binding) => Some(binding),
                Err(err) => {
                    tracing::warn!(error = %err, "discarding undecodable biometric binding");
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            device,
            prefs,
            binding_key,
            binding,
        })
    }

    /// The current binding, if any.
    pub fn binding(&self) -> Option<&BiometricBinding> {
        self.binding.as_ref()
    }

    /// Whether enrollment can be offered: strong capability and no enabled
    /// binding.
    pub fn can_offer(&self) -> bool {
        self.device.capability().is_strong()
            && !self.binding.as_ref().is_some_and(|b| b.enabled)
    }

    /// Whether a challenge could currently succeed.
    pub fn ready(&self) -> bool {
        self.device.capability().is_strong()
            && self.binding.as_ref().is_some_and(|b| b.enabled)
    }

    /// Persist a new enabled binding for `email`.
    ///
    /// The store write happens before the in-memory update; a failed write
    /// leaves the gate unchanged.
    pub async fn bind(&mut self, email: &Email) -> Result<(), PrefsError> {
        let binding = BiometricBinding::new(email.clone());
        self.persist(&binding).await?;

        tracing::info!(email = %binding.bound_email, "biometric binding enabled");
        self.binding = Some(binding);
        Ok(())
    }

    /// Remove the binding; idempotent.
    pub async fn unbind(&mut self) -> Result<(), PrefsError> {
        self.prefs.remove(&self.binding_key).await?;
        if self.binding.take().is_some() {
            tracing::info!("biometric binding removed");
        }
        Ok(())
    }

    /// Run a device challenge against the enabled binding.
    ///
    /// Hardware loss disables the binding so a dead sensor is not offered
    /// again next launch.
    pub async fn challenge(&mut self) -> Result<Identity, BiometricError> {
        let Some(binding) = self.binding.as_ref().filter(|b| b.enabled) else {
            return Err(BiometricError::NotEnrolled);
        };
        let bound_email = binding.bound_email.clone();

        if !self.device.capability().is_strong() {
            self.disable_binding().await;
            return Err(BiometricError::HardwareUnavailable);
        }

        match self.device.challenge().await {
            Ok(()) => Ok(Identity::new(bound_email, None)),
            Err(err) => {
                let err = BiometricError::from(err);
                if err == BiometricError::HardwareUnavailable {
                    self.disable_binding().await;
                }
                Err(err)
            }
        }
    }

    async fn disable_binding(&mut self) {
        let Some(mut binding) = self.binding.take() else {
            return;
        };
        binding.disable();
        if let Err(err) = self.persist(&binding).await {
            tracing::error!(error = %err, "failed to persist disabled binding");
        }
        tracing::warn!(email = %binding.bound_email, "biometric binding disabled, hardware unavailable");
        self.binding = Some(binding);
    }

    async fn persist(&self, binding: &BiometricBinding) -> Result<(), PrefsError> {
        let raw = serde_json::to_string(binding)?;
        self.prefs.set(&self.binding_key, &raw).await
    }
}
