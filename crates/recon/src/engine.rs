use std::collections::{BTreeMap, BTreeSet};

use crate::aggregate::{aggregate, SideAggregate};
use crate::bridge::{label_from_slug, TenantBridge};
use crate::classify::{classify_status, compute_delta};
use crate::config::Thresholds;
use crate::filter::DiffOptions;
use crate::model::{DiffLine, DiffResult, Row, Status, TenantId};
use crate::summary::compute_kpis;

/// Aggregate both sides and diff them.
pub fn reconcile(
    am_rows: &[Row],
    pm_rows: &[Row],
    bridge: &TenantBridge,
    thresholds: &Thresholds,
    options: &DiffOptions,
) -> DiffResult {
    let am = aggregate(am_rows, bridge);
    let pm = aggregate(pm_rows, bridge);
    diff(&am, &pm, thresholds, options)
}

/// Pair AM and PM aggregates by TenantId, classify each pair, apply the
/// caller's filters and summarize.
pub fn diff(
    am: &SideAggregate,
    pm: &SideAggregate,
    thresholds: &Thresholds,
    options: &DiffOptions,
) -> DiffResult {
    let base = options.percent_base.unwrap_or(thresholds.percent_base);
    let cities = asset_cities(am, pm);

    let keys: BTreeSet<&TenantId> = am.keys().chain(pm.keys()).collect();
    let mut lines = Vec::with_capacity(keys.len());
    let mut filtered_out = 0usize;

    for key in keys {
        let a = am.get(key);
        let p = pm.get(key);

        let (delta, status) = match (a, p) {
            (Some(a), Some(p)) => {
                let d = compute_delta(a, p, base);
                (Some(d), classify_status(&d, thresholds))
            }
            (Some(_), None) => (None, Status::MissingOnPm),
            (None, Some(_)) => (None, Status::MissingOnAm),
            (None, None) => continue,
        };

        let label = [a, p]
            .into_iter()
            .flatten()
            .map(|t| t.label.trim())
            .find(|l| !l.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| label_from_slug(&key.slug));

        let line = DiffLine {
            asset: key.asset.clone(),
            city: cities.get(key.asset.as_str()).map(|c| c.to_string()),
            tenant_id: key.clone(),
            tenant_label: label,
            am: a.cloned(),
            pm: p.cloned(),
            delta,
            status,
        };

        if options.admits(&line) {
            lines.push(line);
        } else {
            filtered_out += 1;
        }
    }

    sort_lines(&mut lines);
    let kpis = compute_kpis(&lines);

    tracing::info!(
        tenants = kpis.tenants_total,
        mismatches = kpis.tenants_mismatch,
        filtered_out,
        percent_base = %base,
        "diff complete"
    );

    DiffResult {
        generated_at: chrono::Utc::now().to_rfc3339(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        percent_base: base,
        thresholds: thresholds.clone(),
        kpis,
        lines,
    }
}

/// Asset code → city; the AM side's city wins.
fn asset_cities<'a>(am: &'a SideAggregate, pm: &'a SideAggregate) -> BTreeMap<&'a str, &'a str> {
    let mut cities = BTreeMap::new();
    for (id, t) in am.iter().chain(pm.iter()) {
        if let Some(city) = t.city.as_deref() {
            cities.entry(id.asset.as_str()).or_insert(city);
        }
    }
    cities
}

/// Asset, then display label (falling back to the TenantId), ascending.
pub fn sort_lines(lines: &mut [DiffLine]) {
    lines.sort_by(|x, y| {
        x.asset
            .cmp(&y.asset)
            .then_with(|| sort_label(x).cmp(&sort_label(y)))
            .then_with(|| x.tenant_id.cmp(&y.tenant_id))
    });
}

fn sort_label(line: &DiffLine) -> String {
    if line.tenant_label.is_empty() {
        line.tenant_id.to_string().to_lowercase()
    } else {
        line.tenant_label.to_lowercase()
    }
}
