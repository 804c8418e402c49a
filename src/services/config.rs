//! User configuration (~/.subtrack/config.json)
//!
//! Every field has a default, so a missing file or a partial file is fine.
//! Command-line flags override whatever is loaded here.

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::aggregator::ProviderOrder;
use super::renewal::RenewalCalculator;
use crate::types::{Result, SubtrackError};

/// Default lookahead for upcoming renewals
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Renewal stepping rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleMode {
    /// 30-day months, 365-day years
    #[default]
    Fixed,
    /// Calendar months and years
    Calendar,
}

impl CycleMode {
    pub fn calculator(self) -> RenewalCalculator {
        match self {
            CycleMode::Fixed => RenewalCalculator::new(),
            CycleMode::Calendar => RenewalCalculator::calendar(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub snapshot_path: Option<PathBuf>,
    pub window_days: u32,
    pub cycle_mode: CycleMode,
    pub provider_order: ProviderOrder,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            window_days: DEFAULT_WINDOW_DAYS,
            cycle_mode: CycleMode::default(),
            provider_order: ProviderOrder::default(),
        }
    }
}

/// subtrack's home directory (~/.subtrack)
pub fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new()
        .ok_or_else(|| SubtrackError::Config("Cannot determine home directory".into()))?;
    Ok(base_dirs.home_dir().join(".subtrack"))
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.json"))
    }

    /// Load from the default location, or defaults if there is no file
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from `path`. A missing file yields defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content).map_err(|e| {
            SubtrackError::Config(format!("Invalid config {}: {}", path.display(), e))
        })?;
        Ok(config)
    }
}
