// Locating a side's rent roll for a period under the data root.

use std::path::{Path, PathBuf};

use rentroll_recon::Side;

use crate::error::IngestError;
use crate::{parse_tabular, Ingested};

const EXTENSIONS: [&str; 2] = ["csv", "xlsx"];

/// Candidate files for one side and period, in lookup order.
pub fn candidates(root: &Path, side: Side, period: &str) -> Vec<PathBuf> {
    let dir = root.join(side.as_str());
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{period}.{ext}")))
        .collect()
}

/// First existing candidate, `{root}/{am|pm}/{period}.csv` before `.xlsx`.
pub fn locate_side(root: &Path, side: Side, period: &str) -> Result<PathBuf, IngestError> {
    let tried = candidates(root, side, period);
    match tried.iter().find(|p| p.is_file()) {
        Some(path) => Ok(path.clone()),
        None => Err(IngestError::NoSource {
            side,
            period: period.to_string(),
            tried,
        }),
    }
}

/// Locate and parse one side's rent roll.
pub fn load_side(root: &Path, side: Side, period: &str) -> Result<(PathBuf, Ingested), IngestError> {
    let path = locate_side(root, side, period)?;
    let ingested = load_file(&path)?;
    Ok((path, ingested))
}

/// Parse a rent roll from an explicit path.
pub fn load_file(path: &Path) -> Result<Ingested, IngestError> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ingested = parse_tabular(&bytes, &name)?;
    ingested.report.log(&path.display().to_string());
    Ok(ingested)
}
