//! config command - Get, set, or list configuration values

use anyhow::{bail, Context as _, Result};

use crate::cli::Context;
use crate::core::config::Config;
use crate::ui::output;

/// A configuration key as typed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConfigKey {
    /// `url.<alias>`
    Url(String),
    /// `key.<alias>`
    Key(String),
    /// `concurrency`
    Concurrency,
}

impl ConfigKey {
    fn parse(raw: &str) -> Result<Self> {
        let parsed = match raw.split_once('.') {
            Some(("url", alias)) if !alias.is_empty() => ConfigKey::Url(alias.to_string()),
            Some(("key", alias)) if !alias.is_empty() => ConfigKey::Key(alias.to_string()),
            None if raw == "concurrency" => ConfigKey::Concurrency,
            _ => bail!(
                "Unknown configuration key: {} (expected url.<alias>, key.<alias> or concurrency)",
                raw
            ),
        };
        Ok(parsed)
    }
}

/// Get a configuration value.
pub fn get(key: &str) -> Result<()> {
    let key = ConfigKey::parse(key)?;
    let config = Config::load().context("Failed to load config")?;

    let value = match &key {
        ConfigKey::Url(alias) => config.global.urls.get(alias).cloned(),
        ConfigKey::Key(alias) => config.global.keys.get(alias).cloned(),
        ConfigKey::Concurrency => Some(config.concurrency().to_string()),
    };

    // Key exists but has no value - exit silently
    if let Some(value) = value {
        println!("{}", value);
    }
    Ok(())
}

/// Set a configuration value.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let parsed = ConfigKey::parse(key)?;
    let mut config = Config::load().context("Failed to load config")?;

    match parsed {
        ConfigKey::Url(alias) => {
            config.global.urls.insert(alias, value.trim().to_string());
        }
        ConfigKey::Key(alias) => {
            config.global.keys.insert(alias, value.trim().to_string());
        }
        ConfigKey::Concurrency => {
            let concurrency: usize = value
                .trim()
                .parse()
                .with_context(|| format!("Invalid concurrency: {}", value))?;
            config.global.concurrency = Some(concurrency);
        }
    }

    let path = config.write().context("Failed to write config")?;
    tracing::debug!(path = %path.display(), "config written");

    output::print(format!("Set {} = {}", key, value), ctx.verbosity());

    Ok(())
}

/// List all configuration values.
///
/// Keys are masked; use `config get key.<alias>` to print one.
pub fn list() -> Result<()> {
    let config = Config::load().context("Failed to load config")?;

    match config.loaded_from() {
        Some(path) => println!("# {}", path.display()),
        None => println!("# (no config file, using defaults)"),
    }

    println!("concurrency = {}", config.concurrency());
    for (alias, url) in &config.global.urls {
        println!("url.{} = {}", alias, url);
    }
    for alias in config.global.keys.keys() {
        println!("key.{} = ********", alias);
    }

    Ok(())
}
