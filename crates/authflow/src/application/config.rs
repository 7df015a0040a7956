//! Flow Configuration

/// Session flow configuration
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Preference-store key prefix for the biometric binding
    pub prefs_namespace: String,
    /// Refuse biometric promotion when the provider session is gone.
    ///
    /// Off by default: re-entry then re-asserts the bound identity with
    /// reduced assurance. Turn on to force password re-entry once the
    /// provider session expires.
    pub require_live_session: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            prefs_namespace: "authflow.biometric".to_string(),
            require_live_session: false,
        }
    }
}

impl FlowConfig {
    /// Strict policy: biometric re-entry requires a live provider session.
    pub fn strict() -> Self {
        Self {
            require_live_session: true,
            ..Default::default()
        }
    }

    /// Key under which the binding document is stored.
    pub fn binding_key(&self) -> String {
        format!("{}.binding", self.prefs_namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_key_uses_namespace() {
        let config = FlowConfig {
            prefs_namespace: "myapp".to_string(),
            ..Default::default()
        };
        assert_eq!(config.binding_key(), "myapp.binding");
    }

    #[test]
    fn test_default_is_lenient() {
        assert!(!FlowConfig::default().require_live_session);
        assert!(FlowConfig::strict().require_live_session);
    }
}
