//! Resolving settings, config files and manager scope for a command.

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::Args;
use rentroll_config::settings::validate_period;
use rentroll_config::Settings;
use rentroll_recon::{AssetOwners, BridgeConfig, Row, TenantBridge, Thresholds};

use crate::CliError;

/// Config file locations. Unset flags fall back to the settings file.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Tenant bridge, JSON or TOML
    #[arg(long, value_name = "FILE")]
    pub bridge: Option<PathBuf>,

    /// Classification thresholds, JSON or TOML
    #[arg(long, value_name = "FILE")]
    pub thresholds: Option<PathBuf>,

    /// Asset-to-manager map, JSON or TOML
    #[arg(long, value_name = "FILE")]
    pub owners: Option<PathBuf>,

    /// Settings file [default: <config dir>/rentroll/settings.json]
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,
}

/// Which rent rolls to read.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Period to load, YYYY-MM (env: DATA_MONTH)
    #[arg(long, value_name = "YYYY-MM")]
    pub period: Option<String>,

    /// Directory holding am/ and pm/ (env: RENTROLL_DATA_ROOT)
    #[arg(long, value_name = "DIR")]
    pub data_root: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

impl ConfigArgs {
    /// Settings file, then environment, then these flags.
    pub fn resolve(&self) -> Result<Settings, CliError> {
        let path = self.settings.clone().unwrap_or_else(Settings::config_path);
        let mut settings = Settings::load_from(&path)
            .map_err(|e| CliError::config(e.to_string()).with_hint(format!("settings file: {}", path.display())))?
            .with_env(|key| std::env::var(key).ok());

        if let Some(p) = &self.bridge {
            settings.bridge_path = p.clone();
        }
        if let Some(p) = &self.thresholds {
            settings.thresholds_path = p.clone();
        }
        if let Some(p) = &self.owners {
            settings.owners_path = p.clone();
        }
        Ok(settings)
    }
}

impl SourceArgs {
    pub fn resolve(&self) -> Result<Settings, CliError> {
        let mut settings = self.config.resolve()?;
        if let Some(period) = &self.period {
            validate_period(period).map_err(|e| CliError::usage(e.to_string()))?;
            settings.period = period.clone();
        }
        if let Some(root) = &self.data_root {
            settings.data_root = root.clone();
        }
        settings.validate().map_err(|e| {
            CliError::config(e.to_string()).with_hint("set DATA_MONTH or the settings period as YYYY-MM, or pass --period")
        })?;
        Ok(settings)
    }
}

pub fn load_bridge(settings: &Settings) -> Result<TenantBridge, CliError> {
    let path = &settings.bridge_path;
    let config = BridgeConfig::load(path).map_err(|e| CliError::from(e).with_hint(format!("bridge: {}", path.display())))?;
    TenantBridge::new(&config).map_err(|e| CliError::from(e).with_hint(format!("bridge: {}", path.display())))
}

pub fn load_thresholds(settings: &Settings) -> Result<Thresholds, CliError> {
    let path = &settings.thresholds_path;
    Thresholds::load(path).map_err(|e| CliError::from(e).with_hint(format!("thresholds: {}", path.display())))
}

pub fn load_owners(settings: &Settings) -> Result<AssetOwners, CliError> {
    let path = &settings.owners_path;
    AssetOwners::load(path).map_err(|e| CliError::from(e).with_hint(format!("owners: {}", path.display())))
}

/// Assets a manager may see. `None` when no manager was given or the
/// manager is a super user; the owners file is only read otherwise.
pub fn manager_scope(settings: &Settings, manager: Option<&str>) -> Result<Option<BTreeSet<String>>, CliError> {
    let Some(manager) = manager.map(str::trim).filter(|m| !m.is_empty()) else {
        return Ok(None);
    };
    if AssetOwners::is_super(manager) {
        return Ok(None);
    }
    let owners = load_owners(settings)?;
    let scope = owners.scope_for(manager);
    if let Some(assets) = &scope {
        if assets.is_empty() {
            tracing::warn!(manager, "manager owns no assets");
        }
    }
    Ok(scope)
}

/// Rows whose asset is in scope; all rows when unrestricted.
pub fn scoped_rows(rows: &[Row], scope: Option<&BTreeSet<String>>) -> Vec<Row> {
    match scope {
        Some(assets) => rows
            .iter()
            .filter(|r| assets.contains(r.asset_code.trim()))
            .cloned()
            .collect(),
        None => rows.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_filters_rows_by_trimmed_asset() {
        let rows = vec![
            Row::new(" DE01 ", "Lidl", 1.0, 1.0, 1.0),
            Row::new("DE03", "Kik", 1.0, 1.0, 1.0),
        ];
        let scope: BTreeSet<String> = ["DE01".to_string()].into_iter().collect();
        let kept = scoped_rows(&rows, Some(&scope));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].tenant_name, "Lidl");
        assert_eq!(scoped_rows(&rows, None).len(), 2);
        assert!(scoped_rows(&rows, Some(&BTreeSet::new())).is_empty());
    }
}
