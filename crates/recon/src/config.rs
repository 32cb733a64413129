use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Bridge
// ---------------------------------------------------------------------------

/// Alias table: raw tenant names per side, grouped under a canonical label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub version: u32,
    #[serde(default)]
    pub groups: Vec<BridgeGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeGroup {
    pub canonical: String,
    #[serde(default)]
    pub am: Vec<String>,
    #[serde(default)]
    pub pm: Vec<String>,
    /// When set, the aliases only apply at these assets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_codes: Option<Vec<String>>,
}

impl BridgeConfig {
    pub fn from_json(input: &str) -> Result<Self, ReconError> {
        let config: BridgeConfig =
            serde_json::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: BridgeConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ReconError> {
        let config: BridgeConfig = load_structured(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for (i, group) in self.groups.iter().enumerate() {
            if group.canonical.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "bridge group #{i}: canonical label is empty"
                )));
            }
            if let Some(ref assets) = group.asset_codes {
                if assets.iter().any(|a| a.trim().is_empty()) {
                    return Err(ReconError::ConfigValidation(format!(
                        "bridge group '{}': empty asset code in asset_codes",
                        group.canonical
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn alias_count(&self) -> usize {
        self.groups.iter().map(|g| g.am.len() + g.pm.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Which side's value is the denominator of a percentage mismatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PercentBase {
    #[default]
    Am,
    Pm,
}

impl std::fmt::Display for PercentBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Am => write!(f, "am"),
            Self::Pm => write!(f, "pm"),
        }
    }
}

/// Tolerances for classifying a matched tenancy.
///
/// GLA and rent match when either the absolute or the percentage tolerance
/// holds. WALT only has an absolute tolerance, in years. A field is a major
/// mismatch once it exceeds `major_multiplier` times its tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_version")]
    pub version: u32,
    pub gla_abs: f64,
    pub gla_pct: f64,
    pub rent_abs: f64,
    pub rent_pct: f64,
    #[serde(alias = "walt_year")]
    pub walt_years: f64,
    pub major_multiplier: f64,
    #[serde(default)]
    pub percent_base: PercentBase,
}

fn default_version() -> u32 {
    1
}

impl Thresholds {
    pub fn from_json(input: &str) -> Result<Self, ReconError> {
        let t: Thresholds =
            serde_json::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        t.validate()?;
        Ok(t)
    }

    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let t: Thresholds =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        t.validate()?;
        Ok(t)
    }

    pub fn load(path: &Path) -> Result<Self, ReconError> {
        let t: Thresholds = load_structured(path)?;
        t.validate()?;
        Ok(t)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let fields = [
            ("gla_abs", self.gla_abs),
            ("gla_pct", self.gla_pct),
            ("rent_abs", self.rent_abs),
            ("rent_pct", self.rent_pct),
            ("walt_years", self.walt_years),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ReconError::ConfigValidation(format!(
                    "threshold {name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        if !self.major_multiplier.is_finite() || self.major_multiplier < 1.0 {
            return Err(ReconError::ConfigValidation(format!(
                "major_multiplier must be >= 1, got {}",
                self.major_multiplier
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Asset ownership
// ---------------------------------------------------------------------------

/// Manager codes that see every asset.
pub const SUPER_MANAGERS: &[&str] = &["ADMIN", "MGA"];

/// Asset code → asset-manager code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetOwners {
    owners: BTreeMap<String, String>,
}

impl AssetOwners {
    pub fn from_json(input: &str) -> Result<Self, ReconError> {
        let o: AssetOwners =
            serde_json::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        o.validate()?;
        Ok(o)
    }

    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let o: AssetOwners =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        o.validate()?;
        Ok(o)
    }

    pub fn load(path: &Path) -> Result<Self, ReconError> {
        let o: AssetOwners = load_structured(path)?;
        o.validate()?;
        Ok(o)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for (asset, manager) in &self.owners {
            if asset.trim().is_empty() || manager.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "asset owners: empty asset or manager code ('{asset}' -> '{manager}')"
                )));
            }
        }
        Ok(())
    }

    pub fn owner_of(&self, asset: &str) -> Option<&str> {
        self.owners.get(asset.trim()).map(|s| s.as_str())
    }

    pub fn is_super(manager: &str) -> bool {
        SUPER_MANAGERS.contains(&manager)
    }

    /// Assets visible to `manager`. `None` means unrestricted.
    pub fn scope_for(&self, manager: &str) -> Option<BTreeSet<String>> {
        if Self::is_super(manager) {
            return None;
        }
        Some(
            self.owners
                .iter()
                .filter(|(_, m)| m.trim() == manager)
                .map(|(a, _)| a.trim().to_string())
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

impl FromIterator<(String, String)> for AssetOwners {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self { owners: iter.into_iter().collect() }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Read a JSON or TOML file, picking the format from the extension.
fn load_structured<T: DeserializeOwned>(path: &Path) -> Result<T, ReconError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ReconError::Io(format!("cannot read {}: {e}", path.display())))?;
    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
    let parsed = if is_toml {
        toml::from_str(&text).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(&text).map_err(|e| e.to_string())
    };
    parsed.map_err(|e| ReconError::ConfigParse(format!("{}: {e}", path.display())))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const BRIDGE_JSON: &str = r#"{
  "version": 3,
  "groups": [
    { "canonical": "Lidl", "am": ["LIDL SAS"], "pm": ["Lidl France"] },
    { "canonical": "Netto", "am": [], "pm": ["Netto Marken-Discount"], "asset_codes": ["AA1"] }
  ]
}"#;

    const THRESHOLDS_TOML: &str = r#"
gla_abs = 5.0
gla_pct = 0.01
rent_abs = 100.0
rent_pct = 0.02
walt_years = 0.25
major_multiplier = 3.0
"#;

    #[test]
    fn parse_bridge_json() {
        let bridge = BridgeConfig::from_json(BRIDGE_JSON).unwrap();
        assert_eq!(bridge.version, 3);
        assert_eq!(bridge.groups.len(), 2);
        assert_eq!(bridge.alias_count(), 3);
        assert_eq!(bridge.groups[1].asset_codes.as_deref(), Some(&["AA1".to_string()][..]));
    }

    #[test]
    fn bridge_without_version_is_rejected() {
        let err = BridgeConfig::from_json(r#"{ "groups": [] }"#).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn bridge_with_blank_canonical_is_rejected() {
        let err = BridgeConfig::from_json(r#"{ "version": 1, "groups": [{ "canonical": "  " }] }"#)
            .unwrap_err();
        assert!(err.to_string().contains("canonical label is empty"));
    }

    #[test]
    fn parse_thresholds_toml_defaults() {
        let t = Thresholds::from_toml(THRESHOLDS_TOML).unwrap();
        assert_eq!(t.version, 1);
        assert_eq!(t.percent_base, PercentBase::Am);
        assert_eq!(t.walt_years, 0.25);
    }

    #[test]
    fn thresholds_accept_legacy_walt_year_key() {
        let json = r#"{"gla_abs":1,"gla_pct":0.01,"rent_abs":1,"rent_pct":0.01,
                       "walt_year":0.5,"major_multiplier":2,"percent_base":"pm"}"#;
        let t = Thresholds::from_json(json).unwrap();
        assert_eq!(t.walt_years, 0.5);
        assert_eq!(t.percent_base, PercentBase::Pm);
    }

    #[test]
    fn thresholds_reject_negative_tolerance() {
        let toml = THRESHOLDS_TOML.replace("rent_abs = 100.0", "rent_abs = -1.0");
        let err = Thresholds::from_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("rent_abs"));
    }

    #[test]
    fn thresholds_reject_small_multiplier() {
        let toml = THRESHOLDS_TOML.replace("major_multiplier = 3.0", "major_multiplier = 0.5");
        let err = Thresholds::from_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("major_multiplier"));
    }

    #[test]
    fn thresholds_missing_field_is_parse_error() {
        let err = Thresholds::from_json(r#"{"gla_abs": 1}"#).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn owners_scope() {
        let owners =
            AssetOwners::from_json(r#"{"AA1":"CFR","AA2":"FKE","AA3":"CFR"}"#).unwrap();
        assert_eq!(owners.owner_of(" AA2 "), Some("FKE"));
        let cfr = owners.scope_for("CFR").unwrap();
        assert_eq!(cfr.into_iter().collect::<Vec<_>>(), vec!["AA1", "AA3"]);
        assert!(owners.scope_for("BKO").unwrap().is_empty());
        assert!(owners.scope_for("ADMIN").is_none());
        assert!(owners.scope_for("MGA").is_none());
    }

    #[test]
    fn owners_scope_trims_codes() {
        let owners = AssetOwners::from_json(r#"{" AA1":"CFR ","AA2":"FKE"}"#).unwrap();
        let cfr = owners.scope_for("CFR").unwrap();
        assert_eq!(cfr.into_iter().collect::<Vec<_>>(), vec!["AA1"]);
    }

    #[test]
    fn load_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("thresholds.toml");
        std::fs::write(&toml_path, THRESHOLDS_TOML).unwrap();
        assert_eq!(Thresholds::load(&toml_path).unwrap().gla_abs, 5.0);

        let json_path = dir.path().join("tenants.json");
        std::fs::write(&json_path, BRIDGE_JSON).unwrap();
        assert_eq!(BridgeConfig::load(&json_path).unwrap().version, 3);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Thresholds::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ReconError::Io(_)));
    }
}
