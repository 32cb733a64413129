use std::collections::BTreeMap;

use crate::model::{DiffLine, Kpis, Status};

/// KPIs over the emitted lines. One-sided lines add nothing to the rent
/// delta sum; an empty result has a match rate of exactly 1.
pub fn compute_kpis(lines: &[DiffLine]) -> Kpis {
    let tenants_total = lines.len();
    let tenants_mismatch = lines.iter().filter(|l| !l.status.is_match()).count();
    let delta_rent_sum = lines.iter().filter_map(|l| l.delta).map(|d| d.rent).sum();
    let match_rate = if tenants_total == 0 {
        1.0
    } else {
        (tenants_total - tenants_mismatch) as f64 / tenants_total as f64
    };

    let mut status_counts: BTreeMap<String, usize> =
        Status::ALL.iter().map(|s| (s.as_str().to_string(), 0)).collect();
    for line in lines {
        *status_counts.entry(line.status.as_str().to_string()).or_insert(0) += 1;
    }

    Kpis {
        match_rate,
        tenants_total,
        tenants_mismatch,
        delta_rent_sum,
        status_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Delta, TenantId};

    fn line(status: Status, rent_delta: Option<f64>) -> DiffLine {
        DiffLine {
            asset: "A".into(),
            city: None,
            tenant_id: TenantId::new("A", "t"),
            tenant_label: "T".into(),
            am: None,
            pm: None,
            delta: rent_delta.map(|r| Delta { rent: r, ..Delta::default() }),
            status,
        }
    }

    #[test]
    fn empty_match_rate_is_one() {
        let k = compute_kpis(&[]);
        assert_eq!(k.match_rate, 1.0);
        assert_eq!(k.tenants_total, 0);
        assert_eq!(k.delta_rent_sum, 0.0);
        assert_eq!(k.status_counts.len(), 5);
    }

    #[test]
    fn counts_and_sums() {
        let lines = vec![
            line(Status::Match, Some(0.0)),
            line(Status::MinorMismatch, Some(250.0)),
            line(Status::MajorMismatch, Some(-1000.0)),
            line(Status::MissingOnPm, None),
        ];
        let k = compute_kpis(&lines);
        assert_eq!(k.tenants_total, 4);
        assert_eq!(k.tenants_mismatch, 3);
        assert_eq!(k.delta_rent_sum, -750.0);
        assert_eq!(k.match_rate, 0.25);
        assert_eq!(k.status_counts["missing_on_pm"], 1);
        assert_eq!(k.status_counts["missing_on_am"], 0);
    }
}
