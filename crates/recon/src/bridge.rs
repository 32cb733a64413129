//! Tenant identity bridge.
//!
//! Every alias listed in the bridge config is keyed by its normalized form, so
//! spelling variants that differ only in case, accents or punctuation resolve
//! to the same canonical tenant. Names the bridge does not know fall back to
//! their own normalized form and still flow through the pipeline.

use std::collections::HashMap;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::config::BridgeConfig;
use crate::error::ReconError;

/// Normalize a raw tenant name into a slug.
///
/// Lower-cases, strips diacritics, expands `&` to "and", collapses every run
/// of characters outside `[a-z0-9]` into a single `_` and trims `_` from both
/// ends. The output only contains `[a-z0-9_]`, which makes the function
/// idempotent.
pub fn normalize_name(raw: &str) -> String {
    let folded: String = raw
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    let expanded = folded.replace('&', " and ");

    let mut out = String::with_capacity(expanded.len());
    let mut pending_sep = false;
    for c in expanded.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c);
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Title-case a slug for display (`best_buy` → `Best Buy`).
pub fn label_from_slug(slug: &str) -> String {
    slug.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Canonical {
    slug: String,
    label: String,
}

/// Outcome of resolving one raw name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub slug: String,
    pub label: String,
    /// True when the name was found in the bridge.
    pub mapped: bool,
}

/// Lookup tables built once from a [`BridgeConfig`]; immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct TenantBridge {
    version: u32,
    global: HashMap<String, Canonical>,
    /// Keyed by (asset code, normalized alias) for groups with `asset_codes`.
    scoped: HashMap<(String, String), Canonical>,
}

impl TenantBridge {
    /// A bridge with no aliases: every name resolves to its own slug.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(config: &BridgeConfig) -> Result<Self, ReconError> {
        config.validate()?;

        let mut bridge = Self {
            version: config.version,
            ..Self::default()
        };

        for group in &config.groups {
            let slug = normalize_name(&group.canonical);
            if slug.is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "bridge group '{}': canonical label normalizes to an empty slug",
                    group.canonical
                )));
            }
            let canonical = Canonical {
                slug,
                label: group.canonical.trim().to_string(),
            };

            let aliases = std::iter::once(&group.canonical)
                .chain(group.am.iter())
                .chain(group.pm.iter());

            for raw in aliases {
                let key = normalize_name(raw);
                if key.is_empty() {
                    tracing::warn!(
                        group = %group.canonical,
                        alias = %raw,
                        "bridge alias normalizes to nothing, skipped"
                    );
                    continue;
                }
                match group.asset_codes {
                    Some(ref assets) => {
                        for asset in assets {
                            let asset = asset.trim().to_string();
                            insert_alias(
                                &mut bridge.scoped,
                                (asset.clone(), key.clone()),
                                &canonical,
                                &key,
                                Some(asset),
                            )?;
                        }
                    }
                    None => insert_alias(&mut bridge.global, key.clone(), &canonical, &key, None)?,
                }
            }
        }

        tracing::debug!(
            version = bridge.version,
            global = bridge.global.len(),
            scoped = bridge.scoped.len(),
            "tenant bridge built"
        );
        Ok(bridge)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Number of distinct (scope, alias) entries.
    pub fn alias_count(&self) -> usize {
        self.global.len() + self.scoped.len()
    }

    /// Resolve a raw name, ignoring asset-scoped groups.
    pub fn resolve(&self, raw: &str) -> Resolution {
        let key = normalize_name(raw);
        self.finish(raw, key, None)
    }

    /// Resolve a raw name as it appears at `asset`. Groups scoped to that
    /// asset win over unscoped ones.
    pub fn resolve_at(&self, asset: &str, raw: &str) -> Resolution {
        let key = normalize_name(raw);
        let scoped = if self.scoped.is_empty() {
            None
        } else {
            self.scoped.get(&(asset.trim().to_string(), key.clone()))
        };
        self.finish(raw, key, scoped)
    }

    fn finish(&self, raw: &str, key: String, scoped: Option<&Canonical>) -> Resolution {
        match scoped.or_else(|| self.global.get(&key)) {
            Some(c) => Resolution {
                slug: c.slug.clone(),
                label: c.label.clone(),
                mapped: true,
            },
            None => Resolution {
                slug: key,
                label: raw.to_string(),
                mapped: false,
            },
        }
    }

    pub fn canonical_slug(&self, raw: &str) -> String {
        self.resolve(raw).slug
    }

    pub fn canonical_label(&self, raw: &str) -> String {
        self.resolve(raw).label
    }

    pub fn canonical_slug_at(&self, asset: &str, raw: &str) -> String {
        self.resolve_at(asset, raw).slug
    }

    pub fn canonical_label_at(&self, asset: &str, raw: &str) -> String {
        self.resolve_at(asset, raw).label
    }
}

fn insert_alias<K: std::hash::Hash + Eq>(
    table: &mut HashMap<K, Canonical>,
    key: K,
    canonical: &Canonical,
    alias: &str,
    asset: Option<String>,
) -> Result<(), ReconError> {
    match table.get(&key) {
        Some(existing) if existing.slug != canonical.slug => Err(ReconError::ConflictingAlias {
            alias: alias.to_string(),
            first: existing.label.clone(),
            second: canonical.label.clone(),
            asset,
        }),
        Some(_) => Ok(()),
        None => {
            table.insert(key, canonical.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeGroup;

    fn group(canonical: &str, am: &[&str], pm: &[&str]) -> BridgeGroup {
        BridgeGroup {
            canonical: canonical.into(),
            am: am.iter().map(|s| s.to_string()).collect(),
            pm: pm.iter().map(|s| s.to_string()).collect(),
            asset_codes: None,
        }
    }

    fn bridge(groups: Vec<BridgeGroup>) -> TenantBridge {
        TenantBridge::new(&BridgeConfig { version: 1, groups }).unwrap()
    }

    #[test]
    fn normalize_basic() {
        assert_eq!(normalize_name("Netto"), "netto");
        assert_eq!(normalize_name("  LIDL  SAS "), "lidl_sas");
        assert_eq!(normalize_name("C&A"), "c_and_a");
        assert_eq!(normalize_name("H & M"), "h_and_m");
        assert_eq!(normalize_name("--dm--drogerie--"), "dm_drogerie");
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("!!!"), "");
    }

    #[test]
    fn normalize_strips_diacritics() {
        assert_eq!(normalize_name("Café Müller"), "cafe_muller");
        assert_eq!(normalize_name("CAFÉ MÜLLER"), "cafe_muller");
        // Decomposed input (e + combining acute) folds the same way.
        assert_eq!(normalize_name("Cafe\u{301}"), normalize_name("Café"));
    }

    #[test]
    fn normalize_is_idempotent_on_samples() {
        for s in ["Rossmann GmbH & Co. KG", "ÄÖÜ ß", "__a__b__", "Ł ø", "42nd Street"] {
            let once = normalize_name(s);
            assert_eq!(normalize_name(&once), once, "input {s:?}");
        }
    }

    #[test]
    fn label_from_slug_title_cases() {
        assert_eq!(label_from_slug("best_buy"), "Best Buy");
        assert_eq!(label_from_slug("netto"), "Netto");
        assert_eq!(label_from_slug(""), "");
    }

    #[test]
    fn aliases_from_both_sides_resolve_to_canonical() {
        let b = bridge(vec![group("Lidl", &["LIDL SAS"], &["Lidl France"])]);
        assert_eq!(b.canonical_slug("LIDL SAS"), "lidl");
        assert_eq!(b.canonical_slug("Lidl France"), "lidl");
        assert_eq!(b.canonical_slug("lidl"), "lidl");
        assert_eq!(b.canonical_label("lidl  france"), "Lidl");
        assert!(b.resolve("LIDL-SAS").mapped);
    }

    #[test]
    fn unmapped_name_falls_back() {
        let b = bridge(vec![group("Lidl", &["LIDL SAS"], &[])]);
        let r = b.resolve("ACME Corp.");
        assert_eq!(r.slug, "acme_corp");
        assert_eq!(r.label, "ACME Corp.");
        assert!(!r.mapped);
    }

    #[test]
    fn scoped_group_only_applies_at_its_assets() {
        let mut g = group("Netto", &[], &["Netto Marken-Discount"]);
        g.asset_codes = Some(vec!["AA1".into()]);
        let b = bridge(vec![g]);
        assert_eq!(b.canonical_slug_at("AA1", "Netto Marken-Discount"), "netto");
        assert_eq!(b.canonical_label_at("AA1", "Netto Marken-Discount"), "Netto");
        assert_eq!(
            b.canonical_slug_at("BB2", "Netto Marken-Discount"),
            "netto_marken_discount"
        );
        assert_eq!(b.canonical_slug("Netto Marken-Discount"), "netto_marken_discount");
    }

    #[test]
    fn scoped_group_wins_over_global_at_its_asset() {
        let mut special = group("Edeka Center", &["Edeka"], &[]);
        special.asset_codes = Some(vec!["ZZ9".into()]);
        let b = bridge(vec![group("Edeka", &["EDEKA Markt"], &[]), special]);
        assert_eq!(b.canonical_slug_at("ZZ9", "EDEKA"), "edeka_center");
        assert_eq!(b.canonical_slug_at("AA1", "EDEKA"), "edeka");
    }

    #[test]
    fn conflicting_alias_is_rejected() {
        let config = BridgeConfig {
            version: 1,
            groups: vec![group("Lidl", &["Discount"], &[]), group("Aldi", &[], &["discount"])],
        };
        let err = TenantBridge::new(&config).unwrap_err();
        match err {
            ReconError::ConflictingAlias { alias, first, second, asset } => {
                assert_eq!(alias, "discount");
                assert_eq!(first, "Lidl");
                assert_eq!(second, "Aldi");
                assert!(asset.is_none());
            }
            other => panic!("expected ConflictingAlias, got {other:?}"),
        }
    }

    #[test]
    fn repeated_alias_within_group_is_fine() {
        let b = bridge(vec![group("Rewe", &["REWE"], &["rewe", "Rewe Markt"])]);
        assert_eq!(b.alias_count(), 2);
        assert_eq!(b.version(), 1);
    }

    #[test]
    fn punctuation_only_canonical_is_rejected() {
        let config = BridgeConfig { version: 1, groups: vec![group("***", &[], &[])] };
        assert!(matches!(
            TenantBridge::new(&config),
            Err(ReconError::ConfigValidation(_))
        ));
    }
}
