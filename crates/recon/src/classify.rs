use crate::config::{PercentBase, Thresholds};
use crate::model::{AggregatedTenant, Delta, Status};

/// Percentage mismatch as a fraction of `base`; 0 when the base is 0.
pub fn pct(delta: f64, base: f64) -> f64 {
    if base == 0.0 || !base.is_finite() {
        return 0.0;
    }
    delta.abs() / base.abs()
}

/// Deltas AM minus PM, percentages against the chosen base side.
pub fn compute_delta(am: &AggregatedTenant, pm: &AggregatedTenant, base: PercentBase) -> Delta {
    let gla = am.gla_m2 - pm.gla_m2;
    let rent = am.rent_eur_pa - pm.rent_eur_pa;
    let walt = am.walt_years - pm.walt_years;
    let (gla_base, rent_base) = match base {
        PercentBase::Am => (am.gla_m2, am.rent_eur_pa),
        PercentBase::Pm => (pm.gla_m2, pm.rent_eur_pa),
    };
    Delta {
        gla,
        gla_pct: pct(gla, gla_base),
        rent,
        rent_pct: pct(rent, rent_base),
        walt,
    }
}

/// Inclusive `measure <= limit`, with a relative epsilon so decimal
/// boundaries (e.g. 0.1 years against a 0.1 tolerance) stay inclusive under
/// IEEE-754 rounding.
fn within(measure: f64, limit: f64) -> bool {
    let scale = 1.0_f64.max(measure.abs()).max(limit.abs());
    let eps = f64::EPSILON * 16.0 * scale;
    measure <= limit + eps
}

fn exceeds(measure: f64, limit: f64) -> bool {
    !within(measure, limit)
}

/// Severity of a tenancy present on both sides.
///
/// GLA and rent pass on the looser of their absolute and percentage
/// tolerances; WALT only has an absolute tolerance. A field is major when it
/// exceeds the scaled tolerance on every measure it has.
pub fn classify_status(delta: &Delta, t: &Thresholds) -> Status {
    let gla_ok = within(delta.gla.abs(), t.gla_abs) || within(delta.gla_pct, t.gla_pct);
    let rent_ok = within(delta.rent.abs(), t.rent_abs) || within(delta.rent_pct, t.rent_pct);
    let walt_ok = within(delta.walt.abs(), t.walt_years);

    if gla_ok && rent_ok && walt_ok {
        return Status::Match;
    }

    let m = t.major_multiplier;
    let gla_major =
        exceeds(delta.gla.abs(), m * t.gla_abs) && exceeds(delta.gla_pct, m * t.gla_pct);
    let rent_major =
        exceeds(delta.rent.abs(), m * t.rent_abs) && exceeds(delta.rent_pct, m * t.rent_pct);
    let walt_major = exceeds(delta.walt.abs(), m * t.walt_years);

    if gla_major || rent_major || walt_major {
        Status::MajorMismatch
    } else {
        Status::MinorMismatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> Thresholds {
        Thresholds {
            version: 1,
            gla_abs: 10.0,
            gla_pct: 0.01,
            rent_abs: 100.0,
            rent_pct: 0.01,
            walt_years: 0.5,
            major_multiplier: 3.0,
            percent_base: PercentBase::Am,
        }
    }

    fn side(gla: f64, rent: f64, walt: f64) -> AggregatedTenant {
        AggregatedTenant {
            label: "T".into(),
            gla_m2: gla,
            rent_eur_pa: rent,
            walt_years: walt,
            row_count: 1,
            city: None,
        }
    }

    fn status(am: AggregatedTenant, pm: AggregatedTenant) -> Status {
        classify_status(&compute_delta(&am, &pm, PercentBase::Am), &thresholds())
    }

    #[test]
    fn pct_zero_base_is_zero() {
        assert_eq!(pct(50.0, 0.0), 0.0);
        assert_eq!(pct(-50.0, 200.0), 0.25);
    }

    #[test]
    fn delta_is_am_minus_pm() {
        let d = compute_delta(&side(110.0, 900.0, 2.0), &side(100.0, 1000.0, 3.5), PercentBase::Am);
        assert_eq!(d.gla, 10.0);
        assert_eq!(d.rent, -100.0);
        assert_eq!(d.walt, -1.5);
        assert!((d.gla_pct - 10.0 / 110.0).abs() < 1e-12);
        assert!((d.rent_pct - 100.0 / 900.0).abs() < 1e-12);
    }

    #[test]
    fn percent_base_selects_denominator() {
        let am = side(200.0, 1000.0, 1.0);
        let pm = side(100.0, 500.0, 1.0);
        assert_eq!(compute_delta(&am, &pm, PercentBase::Am).gla_pct, 0.5);
        assert_eq!(compute_delta(&am, &pm, PercentBase::Pm).gla_pct, 1.0);
        assert_eq!(compute_delta(&am, &pm, PercentBase::Pm).rent_pct, 1.0);
    }

    #[test]
    fn identical_sides_match() {
        assert_eq!(status(side(500.0, 50000.0, 5.0), side(500.0, 50000.0, 5.0)), Status::Match);
    }

    #[test]
    fn exact_boundary_is_match() {
        // |ΔGLA| = 10 = gla_abs; gla% = 10/1000 = gla_pct
        assert_eq!(status(side(1000.0, 1.0, 1.0), side(990.0, 1.0, 1.0)), Status::Match);
        // WALT exactly at tolerance
        assert_eq!(status(side(1.0, 1.0, 2.5), side(1.0, 1.0, 2.0)), Status::Match);
        // decimal boundary that is not exact in binary
        let mut t = thresholds();
        t.walt_years = 0.1;
        let d = compute_delta(&side(1.0, 1.0, 0.3), &side(1.0, 1.0, 0.2), PercentBase::Am);
        assert_eq!(classify_status(&d, &t), Status::Match);
    }

    #[test]
    fn one_unit_past_boundary_is_mismatch() {
        // |ΔGLA| = 11 > 10 and 11/1000 > 0.01
        assert_eq!(status(side(1000.0, 1.0, 1.0), side(989.0, 1.0, 1.0)), Status::MinorMismatch);
    }

    #[test]
    fn either_tolerance_suffices() {
        // abs 50 > 10 but pct 50/100000 well under 1%
        assert_eq!(status(side(100000.0, 1.0, 1.0), side(99950.0, 1.0, 1.0)), Status::Match);
        // pct 5/20 = 25% but abs 5 <= 10
        assert_eq!(status(side(20.0, 1.0, 1.0), side(15.0, 1.0, 1.0)), Status::Match);
    }

    #[test]
    fn walt_has_no_percentage_escape() {
        assert_eq!(status(side(1.0, 1.0, 10.0), side(1.0, 1.0, 9.0)), Status::MinorMismatch);
    }

    #[test]
    fn major_requires_both_measures_for_gla() {
        // abs 40 > 30 (3x10) and pct 40/1000 = 4% > 3%
        assert_eq!(status(side(1000.0, 1.0, 1.0), side(960.0, 1.0, 1.0)), Status::MajorMismatch);
        // abs 200 > 30 but pct 200/10000 = 2% <= 3% → minor
        assert_eq!(status(side(10000.0, 1.0, 1.0), side(9800.0, 1.0, 1.0)), Status::MinorMismatch);
    }

    #[test]
    fn major_rent() {
        // Δrent 5000 on 50000 = 10% > 3%, abs 5000 > 300
        assert_eq!(status(side(1.0, 50000.0, 1.0), side(1.0, 45000.0, 1.0)), Status::MajorMismatch);
    }

    #[test]
    fn major_walt_on_absolute_only() {
        // 2.0 > 3 * 0.5
        assert_eq!(status(side(1.0, 1.0, 5.0), side(1.0, 1.0, 3.0)), Status::MajorMismatch);
        // 1.5 == 3 * 0.5 → not major
        assert_eq!(status(side(1.0, 1.0, 4.5), side(1.0, 1.0, 3.0)), Status::MinorMismatch);
    }
}
