// rrecon - AM vs PM rent-roll reconciliation (headless)

mod context;
mod exit_codes;
mod recon;
mod validate;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rentroll_io::IngestError;
use rentroll_recon::ReconError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use exit_codes::{EXIT_INVALID_CONFIG, EXIT_NO_SOURCE, EXIT_RUNTIME, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "rrecon")]
#[command(about = "Reconcile asset-management and property-management rent rolls")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare AM and PM rent rolls for one period (exit 1 with --fail-on-mismatch if they differ)
    #[command(after_help = "\
Examples:
  rrecon diff
  rrecon diff --period 2025-10 --manager JK
  rrecon diff --asset DE01 --asset DE02 --status major_mismatch
  rrecon diff --json > diff.json
  rrecon diff --csv --output diff.csv
  rrecon diff --percent-base pm --fail-on-mismatch")]
    Diff(recon::DiffArgs),

    /// List one side's leases for a period, one line per row
    #[command(after_help = "\
Examples:
  rrecon leases
  rrecon leases --side pm --manager JK --json")]
    Leases(recon::LeasesArgs),

    /// Load and validate the bridge, thresholds and owners files
    #[command(after_help = "\
Examples:
  rrecon validate
  rrecon validate --bridge data/bridge/tenants.toml --json")]
    Validate(validate::ValidateArgs),

    /// Show how tenant names normalize and resolve through the bridge
    #[command(after_help = "\
Examples:
  rrecon normalize \"LIDL SAS\" \"Müller GmbH & Co. KG\"
  rrecon normalize \"Cafe Zentral\" --asset DE02")]
    Normalize(validate::NormalizeArgs),
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  rentroll-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

/// Logs go to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Diff(args) => recon::cmd_diff(args),
        Commands::Leases(args) => recon::cmd_leases(args),
        Commands::Validate(args) => validate::cmd_validate(args),
        Commands::Normalize(args) => validate::cmd_normalize(args),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(EXIT_INVALID_CONFIG, msg)
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::new(EXIT_RUNTIME, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        match err {
            ReconError::Export(_) => CliError::runtime(err.to_string()),
            _ => CliError::config(err.to_string()),
        }
    }
}

impl From<IngestError> for CliError {
    fn from(err: IngestError) -> Self {
        match &err {
            IngestError::NoSource { side, .. } => CliError::new(EXIT_NO_SOURCE, err.to_string()).with_hint(format!(
                "export the {side} rent roll as {{period}}.csv or {{period}}.xlsx under the data root, or pass --period / --data-root"
            )),
            _ => CliError::runtime(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn recon_errors_map_to_exit_codes() {
        assert_eq!(CliError::from(ReconError::ConfigParse("x".into())).code, EXIT_INVALID_CONFIG);
        assert_eq!(CliError::from(ReconError::Io("x".into())).code, EXIT_INVALID_CONFIG);
        assert_eq!(CliError::from(ReconError::Export("x".into())).code, EXIT_RUNTIME);
    }

    #[test]
    fn ingest_errors_map_to_exit_codes() {
        let no_source = IngestError::NoSource {
            side: rentroll_recon::Side::Am,
            period: "2025-09".into(),
            tried: vec![],
        };
        let err = CliError::from(no_source);
        assert_eq!(err.code, EXIT_NO_SOURCE);
        assert!(err.hint.is_some());
        assert_eq!(CliError::from(IngestError::MissingHeader).code, EXIT_RUNTIME);
    }
}
