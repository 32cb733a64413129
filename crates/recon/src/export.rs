use crate::error::ReconError;
use crate::model::{AggregatedTenant, DiffLine};

const HEADER: [&str; 14] = [
    "asset",
    "tenant_id",
    "am_gla_m2",
    "pm_gla_m2",
    "delta_gla",
    "delta_gla_pct",
    "am_rent_eur_pa",
    "pm_rent_eur_pa",
    "delta_rent",
    "delta_rent_pct",
    "am_walt_years",
    "pm_walt_years",
    "delta_walt",
    "status",
];

/// Render diff lines as CSV. Absent sides and deltas are written as 0.
pub fn lines_to_csv(lines: &[DiffLine]) -> Result<String, ReconError> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(HEADER)
        .map_err(|e| ReconError::Export(e.to_string()))?;

    for line in lines {
        let am = side_values(line.am.as_ref());
        let pm = side_values(line.pm.as_ref());
        let d = line.delta.unwrap_or_default();
        let record = [
            line.asset.clone(),
            line.tenant_id.to_string(),
            num(am.0),
            num(pm.0),
            num(d.gla),
            num(d.gla_pct),
            num(am.1),
            num(pm.1),
            num(d.rent),
            num(d.rent_pct),
            num(am.2),
            num(pm.2),
            num(d.walt),
            line.status.to_string(),
        ];
        writer
            .write_record(&record)
            .map_err(|e| ReconError::Export(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ReconError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ReconError::Export(e.to_string()))
}

fn side_values(side: Option<&AggregatedTenant>) -> (f64, f64, f64) {
    side.map_or((0.0, 0.0, 0.0), |t| (t.gla_m2, t.rent_eur_pa, t.walt_years))
}

fn num(v: f64) -> String {
    if v.is_finite() {
        v.to_string()
    } else {
        "0".to_string()
    }
}
