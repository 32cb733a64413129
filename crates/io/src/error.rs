use std::path::PathBuf;

use rentroll_recon::Side;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Input had no header row (empty or whitespace-only).
    #[error("missing header row")]
    MissingHeader,
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Excel parse error: {0}")]
    Xlsx(String),
    /// No `.csv` or `.xlsx` file exists for this side and period.
    #[error("no {side} source for period {period} (tried {})", display_paths(.tried))]
    NoSource {
        side: Side,
        period: String,
        tried: Vec<PathBuf>,
    },
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
