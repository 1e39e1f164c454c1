//! Keyring service configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Auto-lock duration applied on first run and after a wallet reset
pub const DEFAULT_AUTO_LOCK_MINUTES: u32 = 10;

/// Shortest accepted auto-lock duration
pub const MIN_AUTO_LOCK_MINUTES: u32 = 1;

/// Longest accepted auto-lock duration (one week)
pub const MAX_AUTO_LOCK_MINUTES: u32 = 10_080;

/// Keyring service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyringServiceConfig {
    /// Default auto-lock duration in minutes
    pub default_auto_lock_minutes: u32,
    /// Lower bound for auto-lock duration
    pub min_auto_lock_minutes: u32,
    /// Upper bound for auto-lock duration
    pub max_auto_lock_minutes: u32,
}

impl Default for KeyringServiceConfig {
    fn default() -> Self {
        Self {
            default_auto_lock_minutes: DEFAULT_AUTO_LOCK_MINUTES,
            min_auto_lock_minutes: MIN_AUTO_LOCK_MINUTES,
            max_auto_lock_minutes: MAX_AUTO_LOCK_MINUTES,
        }
    }
}

impl KeyringServiceConfig {
    /// Check that `min <= default <= max`
    pub fn validate(&self) -> Result<()> {
        if self.min_auto_lock_minutes > self.max_auto_lock_minutes {
            return Err(Error::Service(format!(
                "min auto-lock {} exceeds max {}",
                self.min_auto_lock_minutes, self.max_auto_lock_minutes
            )));
        }
        if !self.accepts(self.default_auto_lock_minutes) {
            return Err(Error::InvalidAutoLockMinutes(self.default_auto_lock_minutes));
        }
        Ok(())
    }

    /// Whether `minutes` lies within the configured bounds
    pub fn accepts(&self, minutes: u32) -> bool {
        (self.min_auto_lock_minutes..=self.max_auto_lock_minutes).contains(&minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = KeyringServiceConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.accepts(1));
        assert!(config.accepts(10_080));
        assert!(!config.accepts(0));
        assert!(!config.accepts(10_081));
    }

    #[test]
    fn test_default_outside_bounds_rejected() {
        let config = KeyringServiceConfig {
            default_auto_lock_minutes: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(Error::InvalidAutoLockMinutes(0)));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let config = KeyringServiceConfig {
            default_auto_lock_minutes: 5,
            min_auto_lock_minutes: 10,
            max_auto_lock_minutes: 2,
        };
        assert!(matches!(config.validate(), Err(Error::Service(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: KeyringServiceConfig =
            serde_json::from_str(r#"{"default_auto_lock_minutes": 30}"#).unwrap();
        assert_eq!(config.default_auto_lock_minutes, 30);
        assert_eq!(config.max_auto_lock_minutes, MAX_AUTO_LOCK_MINUTES);
    }
}
