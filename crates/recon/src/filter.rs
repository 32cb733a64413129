use std::collections::BTreeSet;

use crate::config::PercentBase;
use crate::model::{DiffLine, Status};

/// Predicate deciding whether a diff line is emitted.
#[derive(Debug, Clone, PartialEq)]
pub enum LineFilter {
    /// Drop lines where both sides report zero rent (an absent side counts as zero).
    ExcludeZeroRent,
    /// Keep only these asset codes.
    Assets(BTreeSet<String>),
    /// Keep only these statuses.
    Statuses(BTreeSet<Status>),
    /// Drop lines whose |Δrent| exceeds the cap. Lines without a delta pass.
    MaxAbsRentDelta(f64),
    /// Drop lines whose |ΔGLA| exceeds the cap. Lines without a delta pass.
    MaxAbsGlaDelta(f64),
}

impl LineFilter {
    pub fn admits(&self, line: &DiffLine) -> bool {
        match self {
            LineFilter::ExcludeZeroRent => {
                let am = line.am.as_ref().map_or(0.0, |a| a.rent_eur_pa);
                let pm = line.pm.as_ref().map_or(0.0, |p| p.rent_eur_pa);
                !(am == 0.0 && pm == 0.0)
            }
            LineFilter::Assets(assets) => assets.contains(&line.asset),
            LineFilter::Statuses(statuses) => statuses.contains(&line.status),
            LineFilter::MaxAbsRentDelta(cap) => line.delta.map_or(true, |d| d.rent.abs() <= *cap),
            LineFilter::MaxAbsGlaDelta(cap) => line.delta.map_or(true, |d| d.gla.abs() <= *cap),
        }
    }
}

/// Caller-side knobs for [`crate::engine::diff`].
#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    /// Overrides the thresholds' percentage base when set.
    pub percent_base: Option<PercentBase>,
    /// All filters must admit a line for it to be emitted.
    pub filters: Vec<LineFilter>,
}

impl DiffOptions {
    /// The portfolio overview: zero-rent tenancies hidden.
    pub fn overview() -> Self {
        Self {
            percent_base: None,
            filters: vec![LineFilter::ExcludeZeroRent],
        }
    }

    pub fn with_filter(mut self, filter: LineFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_percent_base(mut self, base: PercentBase) -> Self {
        self.percent_base = Some(base);
        self
    }

    pub fn admits(&self, line: &DiffLine) -> bool {
        self.filters.iter().all(|f| f.admits(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AggregatedTenant, Delta, TenantId};

    fn agg(rent: f64) -> AggregatedTenant {
        AggregatedTenant {
            label: "X".into(),
            gla_m2: 0.0,
            rent_eur_pa: rent,
            walt_years: 0.0,
            row_count: 1,
            city: None,
        }
    }

    fn line(asset: &str, am: Option<f64>, pm: Option<f64>, status: Status) -> DiffLine {
        let delta = match (am, pm) {
            (Some(a), Some(p)) => Some(Delta { rent: a - p, gla: 2.0 * (a - p), ..Delta::default() }),
            _ => None,
        };
        DiffLine {
            asset: asset.into(),
            city: None,
            tenant_id: TenantId::new(asset, "x"),
            tenant_label: "X".into(),
            am: am.map(agg),
            pm: pm.map(agg),
            delta,
            status,
        }
    }

    #[test]
    fn zero_rent_filter() {
        let f = LineFilter::ExcludeZeroRent;
        assert!(!f.admits(&line("A", Some(0.0), Some(0.0), Status::Match)));
        assert!(!f.admits(&line("A", Some(0.0), None, Status::MissingOnPm)));
        assert!(f.admits(&line("A", Some(0.0), Some(10.0), Status::MajorMismatch)));
        assert!(f.admits(&line("A", None, Some(10.0), Status::MissingOnAm)));
    }

    #[test]
    fn asset_and_status_filters() {
        let assets = LineFilter::Assets(["A".to_string()].into_iter().collect());
        assert!(assets.admits(&line("A", Some(1.0), Some(1.0), Status::Match)));
        assert!(!assets.admits(&line("B", Some(1.0), Some(1.0), Status::Match)));

        let statuses = LineFilter::Statuses([Status::MajorMismatch].into_iter().collect());
        assert!(statuses.admits(&line("A", Some(1.0), Some(9.0), Status::MajorMismatch)));
        assert!(!statuses.admits(&line("A", Some(1.0), Some(1.0), Status::Match)));
    }

    #[test]
    fn delta_caps_skip_one_sided_lines() {
        let rent_cap = LineFilter::MaxAbsRentDelta(100.0);
        assert!(rent_cap.admits(&line("A", Some(1000.0), Some(900.0), Status::MinorMismatch)));
        assert!(!rent_cap.admits(&line("A", Some(1000.0), Some(899.0), Status::MinorMismatch)));
        assert!(rent_cap.admits(&line("A", Some(1000.0), None, Status::MissingOnPm)));

        let gla_cap = LineFilter::MaxAbsGlaDelta(10.0);
        assert!(gla_cap.admits(&line("A", Some(5.0), Some(0.0), Status::MinorMismatch)));
        assert!(!gla_cap.admits(&line("A", Some(6.0), Some(0.0), Status::MinorMismatch)));
    }

    #[test]
    fn options_require_every_filter() {
        let opts = DiffOptions::overview()
            .with_filter(LineFilter::Assets(["A".to_string()].into_iter().collect()));
        assert!(opts.admits(&line("A", Some(1.0), Some(1.0), Status::Match)));
        assert!(!opts.admits(&line("A", Some(0.0), Some(0.0), Status::Match)));
        assert!(!opts.admits(&line("B", Some(1.0), Some(1.0), Status::Match)));
        assert!(DiffOptions::default().admits(&line("B", Some(0.0), Some(0.0), Status::Match)));
    }
}
