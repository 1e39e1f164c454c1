//! Settings configuration

use crate::plurals::Locale;
use crate::{Error, Result};
use pirate_keyring_ipc::KeyringServiceConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings screen configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Locale tag used for plural formatting (e.g. `en-US`)
    pub locale: String,
    /// Activity title shown above the preference list
    pub title: String,
    /// Keyring service policy
    pub keyring: KeyringServiceConfig,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            title: "Pirate Wallet".to_string(),
            keyring: KeyringServiceConfig::default(),
        }
    }
}

impl SettingsConfig {
    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        tracing::debug!("Loaded settings config from {}", path.display());
        Ok(config)
    }

    /// Persist as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Check title and keyring bounds
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Config("title must not be empty".to_string()));
        }
        self.keyring.validate()?;
        Ok(())
    }

    /// Parsed locale, falling back to English
    pub fn locale(&self) -> Locale {
        Locale::from_tag(&self.locale)
    }
}
