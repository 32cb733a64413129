// Operator settings
// Loaded from ~/.config/rentroll/settings.json, then RENTROLL_DATA_ROOT / DATA_MONTH

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_DATA_ROOT: &str = "RENTROLL_DATA_ROOT";
pub const ENV_PERIOD: &str = "DATA_MONTH";
pub const DEFAULT_PERIOD: &str = "2025-09";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error parsing {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid period '{0}' (expected YYYY-MM)")]
    InvalidPeriod(String),
}

/// Where the rent rolls and domain configs live. Paths are relative to the
/// working directory unless absolute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Holds `am/` and `pm/` subdirectories of `{period}.csv|xlsx` files.
    pub data_root: PathBuf,
    /// `YYYY-MM`
    pub period: String,
    pub bridge_path: PathBuf,
    pub thresholds_path: PathBuf,
    pub owners_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("data"),
            period: DEFAULT_PERIOD.to_string(),
            bridge_path: PathBuf::from("data/bridge/tenants.json"),
            thresholds_path: PathBuf::from("config/thresholds.json"),
            owners_path: PathBuf::from("data/bridge/assets.json"),
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rentroll")
            .join("settings.json")
    }

    /// Settings file (if any) with environment overrides applied, validated.
    pub fn load() -> Result<Self, SettingsError> {
        let settings = Self::load_from(&Self::config_path())?.with_env(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    /// Read one settings file; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned)
    }

    /// Apply `RENTROLL_DATA_ROOT` and `DATA_MONTH` as read through `lookup`.
    /// Empty values are ignored. Call [`Settings::validate`] once every
    /// override is in.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(root) = get(ENV_DATA_ROOT) {
            self.data_root = PathBuf::from(root);
        }
        if let Some(period) = get(ENV_PERIOD) {
            self.period = period.trim().to_string();
        }
        self
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_period(&self.period)
    }
}

/// Accepts `YYYY-MM` with a real month.
pub fn validate_period(period: &str) -> Result<(), SettingsError> {
    let well_formed = period.len() == 7
        && chrono::NaiveDate::parse_from_str(&format!("{period}-01"), "%Y-%m-%d").is_ok();
    if well_formed {
        Ok(())
    } else {
        Err(SettingsError::InvalidPeriod(period.to_string()))
    }
}
