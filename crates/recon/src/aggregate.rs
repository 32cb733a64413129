use std::collections::BTreeMap;

use crate::bridge::TenantBridge;
use crate::model::{AggregatedTenant, Row, TenantId};

/// One side's tenancies keyed by canonical identity.
pub type SideAggregate = BTreeMap<TenantId, AggregatedTenant>;

/// Group rows by (asset, canonical tenant), sum GLA/rent/WALT.
///
/// The display label comes from the first row of each group and is never
/// overwritten. Rows with a blank asset code are skipped.
pub fn aggregate(rows: &[Row], bridge: &TenantBridge) -> SideAggregate {
    let mut groups: SideAggregate = BTreeMap::new();
    let mut skipped = 0usize;

    for row in rows {
        let asset = row.asset_code.trim();
        if asset.is_empty() {
            skipped += 1;
            continue;
        }
        let resolved = bridge.resolve_at(asset, &row.tenant_name);
        let key = TenantId::new(asset, resolved.slug);

        let entry = groups.entry(key).or_insert_with(|| AggregatedTenant {
            label: resolved.label,
            gla_m2: 0.0,
            rent_eur_pa: 0.0,
            walt_years: 0.0,
            row_count: 0,
            city: None,
        });
        entry.gla_m2 += row.gla_m2;
        entry.rent_eur_pa += row.rent_eur_pa;
        entry.walt_years += row.walt_years;
        entry.row_count += 1;
        if entry.city.is_none() {
            entry.city = row
                .city
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string);
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "rows without asset code excluded from aggregation");
    }
    groups
}
