//! core::config
//!
//! Configuration schema, loading, and alias resolution.
//!
//! # Overview
//!
//! Sites are addressed by base URL or by an alias defined in the config
//! file. Write keys are looked up by the same alias.
//!
//! # Precedence
//!
//! Values are resolved in this order (earlier wins):
//! 1. CLI argument (alias or literal value)
//! 2. `$CLAY_DEFAULT_URL` / `$CLAY_DEFAULT_KEY`
//! 3. The `default` alias in the config file
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. `$CLAY_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/clay/config.toml`
//! 3. `~/.clay/config.toml` (canonical write location)
//!
//! # Example
//!
//! ```
//! use claywork::core::config::{Config, GlobalConfig};
//!
//! let mut global = GlobalConfig::default();
//! global.urls.insert("local".into(), "localhost.example.com".into());
//! let config = Config::from_global(global);
//!
//! assert_eq!(
//!     config.resolve_url(Some("local")).as_deref(),
//!     Some("http://localhost.example.com")
//! );
//! assert_eq!(
//!     config.resolve_url(Some("domain.com/")).as_deref(),
//!     Some("http://domain.com")
//! );
//! ```

pub mod schema;

pub use schema::GlobalConfig;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::prefixes::has_scheme;

/// Default number of concurrent requests for import and lint.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Upper bound on concurrent requests for import and lint.
pub const MAX_CONCURRENCY: usize = 1024;

/// Alias consulted when no site is given.
const DEFAULT_ALIAS: &str = "default";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Loaded configuration plus environment defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed config file
    pub global: GlobalConfig,
    /// `$CLAY_DEFAULT_URL`
    env_url: Option<String>,
    /// `$CLAY_DEFAULT_KEY`
    env_key: Option<String>,
    /// Path the config was loaded from
    path: Option<PathBuf>,
}

impl Config {
    /// Build a config from an in-memory schema, ignoring the environment.
    pub fn from_global(global: GlobalConfig) -> Self {
        Self {
            global,
            ..Default::default()
        }
    }

    /// Load configuration from the default location and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed.
    /// A missing config file is not an error (defaults are used).
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_global() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.env_url = non_empty_env("CLAY_DEFAULT_URL");
        config.env_key = non_empty_env("CLAY_DEFAULT_KEY");
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let global: GlobalConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        global.validate()?;

        Ok(Self {
            global,
            path: Some(path.to_path_buf()),
            ..Default::default()
        })
    }

    /// Find the first existing config file.
    fn find_global() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("CLAY_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("clay/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".clay/config.toml"))
            .filter(|path| path.exists())
    }

    /// Get the path a write should go to.
    ///
    /// The file the config was loaded from, or `~/.clay/config.toml`.
    pub fn write_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".clay/config.toml"))
    }

    /// Write the config file atomically.
    ///
    /// Creates parent directories if needed.
    pub fn write(&self) -> Result<PathBuf, ConfigError> {
        self.global.validate()?;
        let path = self.write_path()?;
        Self::write_config_atomic(&path, &self.global)?;
        Ok(path)
    }

    /// Write a config file atomically (temp file, then rename).
    fn write_config_atomic<T: serde::Serialize>(
        path: &Path,
        config: &T,
    ) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolve a site alias or URL to a base URL.
    ///
    /// Returns `None` when nothing was given and no default is configured.
    pub fn resolve_url(&self, raw: Option<&str>) -> Option<String> {
        let value = match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => self
                .global
                .urls
                .get(raw)
                .cloned()
                .unwrap_or_else(|| raw.to_string()),
            None => self
                .env_url
                .clone()
                .or_else(|| self.global.urls.get(DEFAULT_ALIAS).cloned())?,
        };
        Some(sanitize_url(&value))
    }

    /// Resolve a key alias or literal key.
    pub fn resolve_key(&self, raw: Option<&str>) -> Option<String> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                self.global
                    .keys
                    .get(raw)
                    .cloned()
                    .unwrap_or_else(|| raw.to_string()),
            ),
            None => self
                .env_key
                .clone()
                .or_else(|| self.global.keys.get(DEFAULT_ALIAS).cloned()),
        }
    }

    /// Find the key configured under the same alias as a site.
    pub fn key_for_site(&self, site: Option<&str>) -> Option<String> {
        site.and_then(|alias| self.global.keys.get(alias.trim()).cloned())
    }

    /// Get the default concurrency.
    ///
    /// Defaults to [`DEFAULT_CONCURRENCY`] if not configured.
    pub fn concurrency(&self) -> usize {
        self.global.concurrency.unwrap_or(DEFAULT_CONCURRENCY)
    }

    /// Get the path to the loaded config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Add `http://` when no scheme is present and drop trailing slashes.
pub fn sanitize_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if has_scheme(url) {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
