//! Layered configuration for the `rigwatch` binary.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file
//! 3. `RIGWATCH_*` environment variables (`__` separates nested keys, e.g.
//!    `RIGWATCH_THRESHOLDS__VOLTAGE=18.5`)
//!
//! Command-line flags are applied on top by the binary.
//!
//! ```toml
//! equipment_id = "press-3"
//! source = "live"
//! connect = "plant-gateway:7000"
//!
//! [thresholds]
//! voltage = 18.5
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::DEFAULT_CAPACITY;
use crate::source::DEFAULT_INTERVAL;
use rigwatch_types::PartialThresholdConfig;

/// Where readings come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Generated demo data.
    #[default]
    Simulated,
    /// Records from a network ingest stream.
    Live,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RigwatchConfig {
    pub equipment_id: String,
    pub source: SourceMode,
    /// `host:port` of the ingest stream, required in live mode.
    pub connect: Option<String>,
    pub interval_ms: u64,
    pub capacity: usize,
    /// Seed for reproducible simulated data.
    pub seed: Option<u64>,
    /// Threshold overrides applied at startup.
    pub thresholds: PartialThresholdConfig,
}

impl Default for RigwatchConfig {
    fn default() -> Self {
        Self {
            equipment_id: "mock-equipment-1".to_string(),
            source: SourceMode::Simulated,
            connect: None,
            interval_ms: DEFAULT_INTERVAL.as_millis() as u64,
            capacity: DEFAULT_CAPACITY,
            seed: None,
            thresholds: PartialThresholdConfig::default(),
        }
    }
}

impl RigwatchConfig {
    /// Load configuration from an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(
                Environment::with_prefix("RIGWATCH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that cannot run a session.
    pub fn validate(&self) -> Result<()> {
        if self.equipment_id.trim().is_empty() {
            bail!("equipment_id must not be empty");
        }
        if self.interval_ms == 0 {
            bail!("interval_ms must be greater than zero");
        }
        if self.capacity == 0 {
            bail!("capacity must be greater than zero");
        }
        if self.source == SourceMode::Live && self.connect.is_none() {
            bail!("live source requires a connect address");
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}
