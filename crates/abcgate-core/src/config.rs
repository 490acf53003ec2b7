//! Gate configuration loaded from `abcgate.toml`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::instruments::{normalize_instrument_name, InstrumentCatalog, InstrumentProfile};
use crate::statistics::DEFAULT_THRESHOLD;

/// Name of the per-project config file.
pub const CONFIG_FILE_NAME: &str = "abcgate.toml";

/// Top-level abcgate configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Learning-value score required to publish.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Adapt the threshold to the scores of the current batch.
    #[serde(default)]
    pub dynamic_threshold: bool,
    /// Instrument used when none is given on the command line.
    #[serde(default = "default_instrument")]
    pub default_instrument: String,
    /// Profiles added to, or replacing entries in, the built-in catalog.
    #[serde(default)]
    pub instruments: HashMap<String, InstrumentProfile>,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}
fn default_instrument() -> String {
    "piano".to_string()
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            dynamic_threshold: false,
            default_instrument: default_instrument(),
            instruments: HashMap::new(),
        }
    }
}

impl GateConfig {
    /// The built-in catalog with this config's overrides applied.
    pub fn catalog(&self) -> InstrumentCatalog {
        self.instruments
            .iter()
            .fold(InstrumentCatalog::standard(), |catalog, (name, profile)| {
                catalog.with_profile(name, *profile)
            })
    }

    /// Check values that parse but make no sense.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=10.0).contains(&self.threshold) {
            anyhow::bail!("threshold must be between 0 and 10, got {}", self.threshold);
        }
        for (name, p) in &self.instruments {
            if p.min > p.max || p.comfortable_min > p.comfortable_max {
                anyhow::bail!("instrument '{name}' has an inverted pitch range");
            }
            if p.tempo_coefficient <= 0.0 || p.leap_coefficient <= 0.0 {
                anyhow::bail!("instrument '{name}' must have positive coefficients");
            }
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("ABCGATE_THRESHOLD") {
            match value.trim().parse::<f64>() {
                Ok(threshold) => self.threshold = threshold,
                Err(_) => tracing::warn!(value, "ignoring unparsable ABCGATE_THRESHOLD"),
            }
        }
        if let Ok(instrument) = std::env::var("ABCGATE_INSTRUMENT") {
            let instrument = normalize_instrument_name(&instrument);
            if !instrument.is_empty() {
                self.default_instrument = instrument;
            }
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `abcgate.toml` in the current directory
/// 2. `~/.config/abcgate/config.toml`
///
/// Environment variable overrides: `ABCGATE_THRESHOLD`, `ABCGATE_INSTRUMENT`.
pub fn load_config() -> Result<GateConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<GateConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GateConfig::default(),
    };

    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Parse config TOML without touching the environment.
pub fn parse_config(content: &str) -> Result<GateConfig> {
    let mut config: GateConfig = toml::from_str(content)?;
    config.default_instrument = normalize_instrument_name(&config.default_instrument);
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("abcgate"))
}
