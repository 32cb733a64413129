use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::config::{PercentBase, Thresholds};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One line item from one side's rent roll for one period.
///
/// Numeric fields are already coerced (malformed cells become 0) by the
/// ingestion layer; optional text fields are `None` when the column is absent
/// or the cell is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub asset_code: String,
    pub tenant_name: String,
    pub gla_m2: f64,
    pub rent_eur_pa: f64,
    pub walt_years: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl Row {
    pub fn new(asset_code: &str, tenant_name: &str, gla_m2: f64, rent_eur_pa: f64, walt_years: f64) -> Self {
        Self {
            asset_code: asset_code.to_string(),
            tenant_name: tenant_name.to_string(),
            gla_m2,
            rent_eur_pa,
            walt_years,
            ..Self::default()
        }
    }
}

/// Which feed a row or aggregate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Am,
    Pm,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Am => "am",
            Side::Pm => "pm",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Canonical tenant identity: `asset_code::canonical_slug`.
///
/// Ordering is by asset, then slug, so a `BTreeMap<TenantId, _>` iterates
/// assets together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TenantId {
    pub asset: String,
    pub slug: String,
}

impl TenantId {
    pub const SEPARATOR: &'static str = "::";

    pub fn new(asset: impl Into<String>, slug: impl Into<String>) -> Self {
        Self { asset: asset.into(), slug: slug.into() }
    }

    /// Parse the `asset::slug` form used as the annotation-store key.
    pub fn parse(s: &str) -> Option<Self> {
        let (asset, slug) = s.split_once(Self::SEPARATOR)?;
        if asset.is_empty() {
            return None;
        }
        Some(Self::new(asset, slug))
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.asset, Self::SEPARATOR, self.slug)
    }
}

impl Serialize for TenantId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// One side's summed measures for a single TenantId.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedTenant {
    pub label: String,
    pub gla_m2: f64,
    pub rent_eur_pa: f64,
    pub walt_years: f64,
    pub row_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

// ---------------------------------------------------------------------------
// Diff output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Match,
    MinorMismatch,
    MajorMismatch,
    MissingOnAm,
    MissingOnPm,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Match,
        Status::MinorMismatch,
        Status::MajorMismatch,
        Status::MissingOnAm,
        Status::MissingOnPm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Match => "match",
            Status::MinorMismatch => "minor_mismatch",
            Status::MajorMismatch => "major_mismatch",
            Status::MissingOnAm => "missing_on_am",
            Status::MissingOnPm => "missing_on_pm",
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Status::Match)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .iter()
            .copied()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| format!("unknown status '{s}'"))
    }
}

/// Per-field differences, AM minus PM. Percentages are fractions (0.01 = 1%).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Delta {
    pub gla: f64,
    pub gla_pct: f64,
    pub rent: f64,
    pub rent_pct: f64,
    pub walt: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffLine {
    pub asset: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub tenant_id: TenantId,
    pub tenant_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub am: Option<AggregatedTenant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pm: Option<AggregatedTenant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<Delta>,
    pub status: Status,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub match_rate: f64,
    pub tenants_total: usize,
    pub tenants_mismatch: usize,
    pub delta_rent_sum: f64,
    pub status_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiffResult {
    pub generated_at: String,
    pub engine_version: String,
    pub percent_base: PercentBase,
    pub thresholds: Thresholds,
    pub kpis: Kpis,
    pub lines: Vec<DiffLine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_id_display_and_parse() {
        let id = TenantId::new("AA1", "netto");
        assert_eq!(id.to_string(), "AA1::netto");
        assert_eq!(TenantId::parse("AA1::netto"), Some(id));
        assert_eq!(TenantId::parse("::netto"), None);
        assert_eq!(TenantId::parse("no-separator"), None);
    }

    #[test]
    fn tenant_id_serializes_as_string() {
        let json = serde_json::to_string(&TenantId::new("B2", "lidl")).unwrap();
        assert_eq!(json, "\"B2::lidl\"");
    }

    #[test]
    fn status_roundtrips_through_str() {
        for st in Status::ALL {
            assert_eq!(st.as_str().parse::<Status>().unwrap(), st);
        }
        assert!("mismatch".parse::<Status>().is_err());
        assert_eq!(serde_json::to_string(&Status::MissingOnPm).unwrap(), "\"missing_on_pm\"");
    }
}
