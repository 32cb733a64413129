//! `rrecon validate` and `rrecon normalize`.

use clap::Args;
use rentroll_recon::normalize_name;
use serde::Serialize;

use crate::context::{load_bridge, load_owners, load_thresholds, ConfigArgs};
use crate::CliError;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Print the summary as one JSON value on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Raw tenant names
    #[arg(required = true, value_name = "NAME")]
    pub names: Vec<String>,

    /// Resolve as seen at this asset (applies asset-scoped bridge groups)
    #[arg(long, value_name = "CODE")]
    pub asset: Option<String>,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Print the resolutions as one JSON value on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ValidateSummary {
    bridge_version: u32,
    bridge_aliases: usize,
    thresholds_version: u32,
    percent_base: String,
    owned_assets: usize,
}

#[derive(Serialize)]
struct NameResolution {
    raw: String,
    normalized: String,
    slug: String,
    label: String,
    mapped: bool,
}

// ============================================================================
// validate
// ============================================================================

pub fn cmd_validate(args: ValidateArgs) -> Result<(), CliError> {
    let settings = args.config.resolve()?;
    let bridge = load_bridge(&settings)?;
    let thresholds = load_thresholds(&settings)?;
    let owners = load_owners(&settings)?;

    let summary = ValidateSummary {
        bridge_version: bridge.version(),
        bridge_aliases: bridge.alias_count(),
        thresholds_version: thresholds.version,
        percent_base: thresholds.percent_base.to_string(),
        owned_assets: owners.len(),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;
        println!("{json}");
    }

    eprintln!(
        "valid: bridge v{} with {} alias(es) ({})",
        summary.bridge_version,
        summary.bridge_aliases,
        settings.bridge_path.display()
    );
    eprintln!(
        "valid: thresholds v{}, percent base {} ({})",
        summary.thresholds_version,
        summary.percent_base,
        settings.thresholds_path.display()
    );
    eprintln!(
        "valid: owners for {} asset(s) ({})",
        summary.owned_assets,
        settings.owners_path.display()
    );
    Ok(())
}

// ============================================================================
// normalize
// ============================================================================

pub fn cmd_normalize(args: NormalizeArgs) -> Result<(), CliError> {
    let settings = args.config.resolve()?;
    let bridge = load_bridge(&settings)?;

    let resolutions: Vec<NameResolution> = args
        .names
        .iter()
        .map(|raw| {
            let resolved = match args.asset.as_deref() {
                Some(asset) => bridge.resolve_at(asset, raw),
                None => bridge.resolve(raw),
            };
            NameResolution {
                raw: raw.clone(),
                normalized: normalize_name(raw),
                slug: resolved.slug,
                label: resolved.label,
                mapped: resolved.mapped,
            }
        })
        .collect();

    if args.json {
        let json = serde_json::to_string_pretty(&resolutions)
            .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;
        println!("{json}");
        return Ok(());
    }

    for r in &resolutions {
        let via = if r.mapped { "bridge" } else { "fallback" };
        println!("{}\t{}\t{}\t{} ({via})", r.raw, r.normalized, r.slug, r.label);
    }
    Ok(())
}
