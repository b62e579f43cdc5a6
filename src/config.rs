//! Configuration management
//!
//! Handles loading and validating runtime configuration from TOML files.
//! Embedding applications typically ship defaults and only override the
//! arbiter tick interval.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub arbiter: ArbiterConfig,
}

/// Background ticker configuration
///
/// Meters and timers normalize their per-second rates to the tick period
/// they were built with; when overriding this interval, build them with
/// `with_tick_period` to match.
#[derive(Debug, Clone, Deserialize)]
pub struct ArbiterConfig {
    /// Seconds between tick passes over rate-based metrics
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval(),
        }
    }
}

impl ArbiterConfig {
    /// Tick period as a `Duration`
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }
}

// Default value functions
fn default_tick_interval() -> u64 { 5 }

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| "Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.arbiter.tick_interval_secs == 0 {
            anyhow::bail!("tick_interval_secs must be > 0");
        }
        Ok(())
    }
}
