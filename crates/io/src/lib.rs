//! `rentroll-io`: rent-roll ingestion.
//!
//! Turns CSV or Excel bytes into [`rentroll_recon::Row`]s plus an
//! [`IngestReport`] of data-quality diagnostics, and locates each side's
//! file for a period under a data root.

pub mod csv;
pub mod error;
pub mod fields;
pub mod report;
pub mod source;
pub mod xlsx;

use rentroll_recon::Row;

pub use crate::csv::{decode_text, parse_csv_text};
pub use error::IngestError;
pub use report::{CoercedCell, DroppedRow, IngestReport, SourceFormat};
pub use source::{load_file, load_side, locate_side};

/// Rows admitted from one file, with the diagnostics gathered on the way.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub rows: Vec<Row>,
    pub report: IngestReport,
}

/// Spreadsheet when the name ends in `.xlsx` (any case) or the bytes carry
/// a ZIP signature; delimited text otherwise.
pub fn detect_format(bytes: &[u8], filename: &str) -> SourceFormat {
    let is_xlsx_name = filename.to_ascii_lowercase().ends_with(".xlsx");
    if is_xlsx_name || bytes.starts_with(b"PK") {
        SourceFormat::Xlsx
    } else {
        SourceFormat::Csv
    }
}

/// Parse a rent roll in either supported format.
pub fn parse_tabular(bytes: &[u8], filename: &str) -> Result<Ingested, IngestError> {
    match detect_format(bytes, filename) {
        SourceFormat::Xlsx => crate::xlsx::parse_xlsx_bytes(bytes),
        SourceFormat::Csv => crate::csv::parse_csv_bytes(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_detection() {
        assert_eq!(detect_format(b"a,b", "AM.XLSX"), SourceFormat::Xlsx);
        assert_eq!(detect_format(b"PK\x03\x04", "upload.bin"), SourceFormat::Xlsx);
        assert_eq!(detect_format(b"asset_code,tenant_name", "202509.csv"), SourceFormat::Csv);
        assert_eq!(detect_format(b"", ""), SourceFormat::Csv);
    }
}
