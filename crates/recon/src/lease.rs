use serde::Serialize;

use crate::bridge::TenantBridge;
use crate::model::{Row, TenantId};

/// One lease as listed on one side, tagged with its canonical identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaseLine {
    pub asset: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub tenant_id: TenantId,
    pub tenant_label: String,
    pub gla_m2: f64,
    pub rent_eur_pa: f64,
    pub walt_years: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lease_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lease_end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psm: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaseKpis {
    pub tenants_total: usize,
    pub rent_sum: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaseRegister {
    pub kpis: LeaseKpis,
    pub lines: Vec<LeaseLine>,
}

/// Flat lease listing in input order, one line per row (no aggregation).
pub fn lease_register(rows: &[Row], bridge: &TenantBridge) -> LeaseRegister {
    let lines: Vec<LeaseLine> = rows
        .iter()
        .filter(|r| !r.asset_code.trim().is_empty())
        .map(|r| {
            let asset = r.asset_code.trim();
            let resolved = bridge.resolve_at(asset, &r.tenant_name);
            LeaseLine {
                asset: asset.to_string(),
                city: r.city.clone(),
                tenant_id: TenantId::new(asset, resolved.slug),
                tenant_label: resolved.label,
                gla_m2: r.gla_m2,
                rent_eur_pa: r.rent_eur_pa,
                walt_years: r.walt_years,
                lease_start: r.lease_start.clone(),
                lease_end: r.lease_end.clone(),
                options_text: r.options_text.clone(),
                psm: r.psm,
            }
        })
        .collect();

    let kpis = LeaseKpis {
        tenants_total: lines.len(),
        rent_sum: lines.iter().map(|l| l.rent_eur_pa).sum(),
    };
    LeaseRegister { kpis, lines }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_keeps_rows_and_sums_rent() {
        let mut first = Row::new("AA1", "Netto", 500.0, 50000.0, 5.0);
        first.lease_end = Some("2030-12-31".into());
        first.options_text = Some("2x5y".into());
        let rows = vec![
            first,
            Row::new("AA1", "NETTO", 20.0, 1200.0, 5.0),
            Row::new("AA2", "dm", 700.0, 84000.0, 7.5),
        ];
        let reg = lease_register(&rows, &TenantBridge::empty());
        assert_eq!(reg.kpis.tenants_total, 3);
        assert_eq!(reg.kpis.rent_sum, 135200.0);
        assert_eq!(reg.lines[0].tenant_id, reg.lines[1].tenant_id);
        assert_eq!(reg.lines[0].lease_end.as_deref(), Some("2030-12-31"));
        assert_eq!(reg.lines[1].tenant_label, "NETTO");
        assert_eq!(reg.lines[2].tenant_id.to_string(), "AA2::dm");
    }

    #[test]
    fn empty_register() {
        let reg = lease_register(&[], &TenantBridge::empty());
        assert_eq!(reg.kpis.tenants_total, 0);
        assert_eq!(reg.kpis.rent_sum, 0.0);
    }
}
