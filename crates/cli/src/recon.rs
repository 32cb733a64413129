//! `rrecon diff` and `rrecon leases`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Args, ValueEnum};
use rentroll_io::{load_side, Ingested};
use rentroll_recon::{
    lease_register, lines_to_csv, reconcile, DiffLine, DiffOptions, DiffResult, LeaseRegister, LineFilter,
    PercentBase, Side, Status,
};

use crate::context::{load_bridge, load_thresholds, manager_scope, scoped_rows, SourceArgs};
use crate::exit_codes::EXIT_MISMATCH;
use crate::CliError;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SideArg {
    Am,
    Pm,
}

impl From<SideArg> for Side {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Am => Side::Am,
            SideArg::Pm => Side::Pm,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum BaseArg {
    Am,
    Pm,
}

impl From<BaseArg> for PercentBase {
    fn from(base: BaseArg) -> Self {
        match base {
            BaseArg::Am => PercentBase::Am,
            BaseArg::Pm => PercentBase::Pm,
        }
    }
}

fn parse_status(s: &str) -> Result<Status, String> {
    Status::from_str(s)
}

#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Only the assets this manager owns (ADMIN and MGA see everything)
    #[arg(long, value_name = "CODE")]
    pub manager: Option<String>,

    /// Only these asset codes. Repeatable.
    #[arg(long = "asset", value_name = "CODE")]
    pub assets: Vec<String>,

    /// Only these statuses (match, minor_mismatch, major_mismatch,
    /// missing_on_am, missing_on_pm). Repeatable.
    #[arg(long = "status", value_name = "STATUS", value_parser = parse_status)]
    pub statuses: Vec<Status>,

    /// Keep tenancies where both sides report zero rent
    #[arg(long)]
    pub include_zero_rent: bool,

    /// Drop lines whose absolute rent delta exceeds this (EUR p.a.)
    #[arg(long, value_name = "EUR")]
    pub max_rent_delta: Option<f64>,

    /// Drop lines whose absolute GLA delta exceeds this (m²)
    #[arg(long, value_name = "M2")]
    pub max_gla_delta: Option<f64>,

    /// Side whose values are the denominator of percentage deltas
    /// [default: from thresholds, else am]
    #[arg(long, value_enum)]
    pub percent_base: Option<BaseArg>,

    /// Print the result as one JSON value on stdout
    #[arg(long, conflicts_with = "csv")]
    pub json: bool,

    /// Print the diff lines as CSV on stdout
    #[arg(long)]
    pub csv: bool,

    /// Write the result to a file (CSV with --csv, JSON otherwise)
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Exit 1 when any line is not a match
    #[arg(long)]
    pub fail_on_mismatch: bool,

    /// Suppress the summary on stderr
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(Args, Debug)]
pub struct LeasesArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Which side's rent roll to list
    #[arg(long, value_enum, default_value = "am")]
    pub side: SideArg,

    /// Only the assets this manager owns (ADMIN and MGA see everything)
    #[arg(long, value_name = "CODE")]
    pub manager: Option<String>,

    /// Print the register as one JSON value on stdout
    #[arg(long)]
    pub json: bool,

    /// Suppress the summary on stderr
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

// ============================================================================
// diff
// ============================================================================

pub fn cmd_diff(args: DiffArgs) -> Result<(), CliError> {
    for (flag, cap) in [("--max-rent-delta", args.max_rent_delta), ("--max-gla-delta", args.max_gla_delta)] {
        if let Some(v) = cap {
            if !v.is_finite() || v < 0.0 {
                return Err(CliError::usage(format!("{flag} must be a non-negative number, got {v}")));
            }
        }
    }

    let settings = args.source.resolve()?;
    let bridge = load_bridge(&settings)?;
    let thresholds = load_thresholds(&settings)?;
    let scope = manager_scope(&settings, args.manager.as_deref())?;

    let (am_path, am) = load_side(&settings.data_root, Side::Am, &settings.period)?;
    let (pm_path, pm) = load_side(&settings.data_root, Side::Pm, &settings.period)?;
    let am_rows = scoped_rows(&am.rows, scope.as_ref());
    let pm_rows = scoped_rows(&pm.rows, scope.as_ref());

    let options = diff_options(&args);
    let result = reconcile(&am_rows, &pm_rows, &bridge, &thresholds, &options);

    let payload = if args.csv {
        lines_to_csv(&result.lines)?
    } else {
        serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &payload)
            .map_err(|e| CliError::runtime(format!("cannot write {}: {e}", path.display())))?;
        if !args.quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if args.json || args.csv {
        if args.output.is_none() {
            if args.json {
                println!("{payload}");
            } else {
                print!("{payload}");
            }
        }
    } else {
        print_diff_table(&result.lines)?;
    }

    if !args.quiet {
        print_source_summary(Side::Am, &am_path, &am);
        print_source_summary(Side::Pm, &pm_path, &pm);
        print_diff_summary(&settings.period, &result);
    }

    if args.fail_on_mismatch && result.kpis.tenants_mismatch > 0 {
        return Err(CliError::new(
            EXIT_MISMATCH,
            format!("{} of {} tenancies do not match", result.kpis.tenants_mismatch, result.kpis.tenants_total),
        ));
    }
    Ok(())
}

fn diff_options(args: &DiffArgs) -> DiffOptions {
    let mut options = DiffOptions::default();
    if !args.include_zero_rent {
        options = options.with_filter(LineFilter::ExcludeZeroRent);
    }
    if !args.assets.is_empty() {
        let assets = args.assets.iter().map(|a| a.trim().to_string()).collect();
        options = options.with_filter(LineFilter::Assets(assets));
    }
    if !args.statuses.is_empty() {
        options = options.with_filter(LineFilter::Statuses(args.statuses.iter().copied().collect()));
    }
    if let Some(cap) = args.max_rent_delta {
        options = options.with_filter(LineFilter::MaxAbsRentDelta(cap));
    }
    if let Some(cap) = args.max_gla_delta {
        options = options.with_filter(LineFilter::MaxAbsGlaDelta(cap));
    }
    if let Some(base) = args.percent_base {
        options = options.with_percent_base(base.into());
    }
    options
}

fn print_diff_table(lines: &[DiffLine]) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let write_err = |e: std::io::Error| CliError::runtime(e.to_string());

    let width = lines.iter().map(|l| l.tenant_label.chars().count()).max().unwrap_or(6).max(6);
    writeln!(
        out,
        "{:<8} {:<width$} {:<15} {:>10} {:>12} {:>7}",
        "ASSET", "TENANT", "STATUS", "ΔGLA", "ΔRENT", "ΔWALT"
    )
    .map_err(write_err)?;
    for line in lines {
        let (gla, rent, walt) = match line.delta {
            Some(d) => (format!("{:.1}", d.gla), format!("{:.2}", d.rent), format!("{:.2}", d.walt)),
            None => ("-".to_string(), "-".to_string(), "-".to_string()),
        };
        writeln!(
            out,
            "{:<8} {:<width$} {:<15} {:>10} {:>12} {:>7}",
            line.asset, line.tenant_label, line.status.as_str(), gla, rent, walt
        )
        .map_err(write_err)?;
    }
    Ok(())
}

fn print_source_summary(side: Side, path: &Path, ingested: &Ingested) {
    eprintln!("{side}: {} ({})", path.display(), ingested.report.summary());
}

fn print_diff_summary(period: &str, result: &DiffResult) {
    let k = &result.kpis;
    let count = |s: Status| k.status_counts.get(s.as_str()).copied().unwrap_or(0);
    eprintln!(
        "{period}: {} tenancies, {} match, {} minor, {} major, {} missing on AM, {} missing on PM",
        k.tenants_total,
        count(Status::Match),
        count(Status::MinorMismatch),
        count(Status::MajorMismatch),
        count(Status::MissingOnAm),
        count(Status::MissingOnPm),
    );
    eprintln!(
        "match rate {:.1}%, rent delta {:.2} EUR p.a. (percent base {})",
        k.match_rate * 100.0,
        k.delta_rent_sum,
        result.percent_base,
    );
}

// ============================================================================
// leases
// ============================================================================

pub fn cmd_leases(args: LeasesArgs) -> Result<(), CliError> {
    let settings = args.source.resolve()?;
    let bridge = load_bridge(&settings)?;
    let scope = manager_scope(&settings, args.manager.as_deref())?;

    let side: Side = args.side.into();
    let (path, ingested) = load_side(&settings.data_root, side, &settings.period)?;

    let rows = scoped_rows(&ingested.rows, scope.as_ref());
    let register = lease_register(&rows, &bridge);

    if args.json {
        let json = serde_json::to_string_pretty(&register)
            .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;
        println!("{json}");
    } else {
        print_lease_table(&register)?;
    }

    if !args.quiet {
        print_source_summary(side, &path, &ingested);
        eprintln!(
            "{}: {} leases, rent {:.2} EUR p.a.",
            settings.period, register.kpis.tenants_total, register.kpis.rent_sum
        );
    }
    Ok(())
}

fn print_lease_table(register: &LeaseRegister) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let write_err = |e: std::io::Error| CliError::runtime(e.to_string());

    let width = register
        .lines
        .iter()
        .map(|l| l.tenant_label.chars().count())
        .max()
        .unwrap_or(6)
        .max(6);
    writeln!(
        out,
        "{:<8} {:<width$} {:>10} {:>12} {:>6} {:<10}",
        "ASSET", "TENANT", "GLA", "RENT", "WALT", "LEASE END"
    )
    .map_err(write_err)?;
    for line in &register.lines {
        writeln!(
            out,
            "{:<8} {:<width$} {:>10.1} {:>12.2} {:>6.2} {:<10}",
            line.asset,
            line.tenant_label,
            line.gla_m2,
            line.rent_eur_pa,
            line.walt_years,
            line.lease_end.as_deref().unwrap_or("-"),
        )
        .map_err(write_err)?;
    }
    Ok(())
}
