//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Location
//!
//! Searched in order:
//! 1. `$CLAY_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/clay/config.toml`
//! 3. `~/.clay/config.toml` (canonical write location)
//!
//! # Validation
//!
//! Config values are validated after parsing: concurrency must be between
//! one and [`MAX_CONCURRENCY`], and aliases must point at something.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ConfigError, MAX_CONCURRENCY};

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// concurrency = 10
///
/// [urls]
/// local = "http://localhost.example.com"
/// prod = "https://www.example.com"
///
/// [keys]
/// local = "abc"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Default concurrency for import and lint
    pub concurrency: Option<usize>,

    /// Site aliases (alias -> base url)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub urls: BTreeMap<String, String>,

    /// Write keys (alias -> key)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub keys: BTreeMap<String, String>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.concurrency {
            Some(0) => {
                return Err(ConfigError::InvalidValue(
                    "concurrency must be at least 1".to_string(),
                ))
            }
            Some(n) if n > MAX_CONCURRENCY => {
                return Err(ConfigError::InvalidValue(format!(
                    "concurrency must be at most {}",
                    MAX_CONCURRENCY
                )))
            }
            _ => {}
        }

        if let Some((alias, _)) = self.urls.iter().find(|(_, url)| url.trim().is_empty()) {
            return Err(ConfigError::InvalidValue(format!(
                "url alias '{}' cannot be empty",
                alias
            )));
        }

        if let Some((alias, _)) = self.keys.iter().find(|(_, key)| key.trim().is_empty()) {
            return Err(ConfigError::InvalidValue(format!(
                "key alias '{}' cannot be empty",
                alias
            )));
        }

        Ok(())
    }
}
