//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tokio::time::Duration;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct AcquireConfig {
    #[serde(default)]
    pub bus: BusConfig,

    #[serde(default)]
    pub sim: SimConfig,
}

/// Telemetry bus acquisition configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BusConfig {
    /// Desired sample interval requested for every channel, in milliseconds
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,

    /// Bound for the per-cycle readiness wait, in milliseconds
    #[serde(default = "default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,
}

/// Simulated bus and acquisition-loop configuration (consumed by the binary)
#[derive(Debug, Deserialize, Clone)]
pub struct SimConfig {
    /// Period between simulated publishes, in milliseconds
    #[serde(default = "default_publish_period_ms")]
    pub publish_period_ms: u64,

    /// Period of the acquisition loop, in milliseconds
    #[serde(default = "default_cycle_period_ms")]
    pub cycle_period_ms: u64,

    /// Log a snapshot status line every this many cycles
    #[serde(default = "default_status_every_cycles")]
    pub status_every_cycles: u64,
}

// Default value functions
fn default_sample_interval_ms() -> u64 { 100 }
fn default_wait_timeout_ms() -> u64 { 200 }

fn default_publish_period_ms() -> u64 { 50 }
fn default_cycle_period_ms() -> u64 { 500 }
fn default_status_every_cycles() -> u64 { 20 }

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: default_sample_interval_ms(),
            wait_timeout_ms: default_wait_timeout_ms(),
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            publish_period_ms: default_publish_period_ms(),
            cycle_period_ms: default_cycle_period_ms(),
            status_every_cycles: default_status_every_cycles(),
        }
    }
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            bus: BusConfig::default(),
            sim: SimConfig::default(),
        }
    }
}

impl AcquireConfig {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AcquireConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist
    ///
    /// A present-but-invalid file is still an error; only a missing file falls
    /// back.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Desired per-channel sample interval
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.bus.sample_interval_ms)
    }

    /// Bound for the per-cycle readiness wait
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.bus.wait_timeout_ms)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.bus.sample_interval_ms == 0 || self.bus.sample_interval_ms > 10000 {
            return Err(crate::error::AcquireError::Config(
                toml::de::Error::custom("sample_interval_ms must be between 1 and 10000")
            ));
        }

        if self.bus.wait_timeout_ms == 0 || self.bus.wait_timeout_ms > 10000 {
            return Err(crate::error::AcquireError::Config(
                toml::de::Error::custom("wait_timeout_ms must be between 1 and 10000")
            ));
        }

        if self.sim.publish_period_ms == 0 || self.sim.publish_period_ms > 60000 {
            return Err(crate::error::AcquireError::Config(
                toml::de::Error::custom("publish_period_ms must be between 1 and 60000")
            ));
        }

        if self.sim.cycle_period_ms == 0 || self.sim.cycle_period_ms > 60000 {
            return Err(crate::error::AcquireError::Config(
                toml::de::Error::custom("cycle_period_ms must be between 1 and 60000")
            ));
        }

        if self.sim.status_every_cycles == 0 {
            return Err(crate::error::AcquireError::Config(
                toml::de::Error::custom("status_every_cycles must be greater than 0")
            ));
        }

        Ok(())
    }
}
