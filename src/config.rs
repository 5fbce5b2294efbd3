//! Run configuration loaded from TOML.

use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Error, Result};
use crate::logging::LogConfig;
use crate::sensitivity::SweepConfig;
use crate::synthesis::SynthesisConfig;

/// Synthetic population parameters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of assets to generate
    pub count: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { count: 100 }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    /// RNG seed; 0 draws one from the OS
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub logging: LogConfig,
}

impl AppConfig {
    /// Load from `path`, or defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config = Self::from_toml(&content)?;
            debug!(path = %path.display(), "Loaded config");
            Ok(config)
        } else {
            debug!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Check the values serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        self.sweep.validate()?;
        if self.logging.level.trim().is_empty() {
            return Err(Error::config("logging.level must not be empty"));
        }
        Ok(())
    }

    /// Default configuration rendered as a commented TOML document.
    pub fn sample_toml() -> Result<String> {
        let content = toml::to_string_pretty(&Self::default())?;
        Ok(format!(
            r#"# theta_sweep configuration
# See: theta_sweep --help
#
# seed = 0 draws a fresh seed from the OS on every run.
# Percentages are whole numbers in 0..=100.
# sweep.counter_policy is "continuous" or "random_phase".

{content}"#
        ))
    }
}

/// RNG for a run: seeded when `seed` is non-zero, otherwise from entropy.
pub fn make_rng(seed: u64) -> StdRng {
    if seed > 0 {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_entropy()
    }
}
