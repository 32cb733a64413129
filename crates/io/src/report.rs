use serde::Serialize;

/// Where a batch of rows came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Xlsx,
}

/// A record left out of the output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedRow {
    /// 1-based line (CSV) or sheet row (Excel).
    pub line: usize,
    pub reason: String,
}

/// A non-empty numeric cell that could not be parsed and was read as 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoercedCell {
    pub line: usize,
    pub column: String,
    pub raw: String,
}

/// Data-quality diagnostics collected while ingesting one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestReport {
    pub format: SourceFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
    /// Bytes were not valid UTF-8 and were decoded as Windows-1252.
    pub encoding_fallback: bool,
    pub records_read: usize,
    pub rows_admitted: usize,
    pub dropped_rows: Vec<DroppedRow>,
    pub coerced_cells: Vec<CoercedCell>,
    /// Recognised columns that the header does not contain.
    pub missing_columns: Vec<String>,
}

impl IngestReport {
    pub fn new(format: SourceFormat) -> Self {
        Self {
            format,
            delimiter: None,
            encoding_fallback: false,
            records_read: 0,
            rows_admitted: 0,
            dropped_rows: Vec::new(),
            coerced_cells: Vec::new(),
            missing_columns: Vec::new(),
        }
    }

    pub fn has_warnings(&self) -> bool {
        self.encoding_fallback
            || !self.dropped_rows.is_empty()
            || !self.coerced_cells.is_empty()
            || !self.missing_columns.is_empty()
    }

    /// One-line human summary, e.g. `12 rows (csv ';'), 1 dropped, 2 coerced cells`.
    pub fn summary(&self) -> String {
        let format = match (self.format, self.delimiter) {
            (SourceFormat::Csv, Some('\t')) => "csv '\\t'".to_string(),
            (SourceFormat::Csv, Some(d)) => format!("csv '{d}'"),
            (SourceFormat::Csv, None) => "csv".to_string(),
            (SourceFormat::Xlsx, _) => "xlsx".to_string(),
        };
        let mut parts = vec![format!("{} rows ({format})", self.rows_admitted)];
        if !self.dropped_rows.is_empty() {
            parts.push(format!("{} dropped", self.dropped_rows.len()));
        }
        if !self.coerced_cells.is_empty() {
            parts.push(format!("{} coerced cells", self.coerced_cells.len()));
        }
        if !self.missing_columns.is_empty() {
            parts.push(format!("missing columns: {}", self.missing_columns.join(", ")));
        }
        if self.encoding_fallback {
            parts.push("decoded as Windows-1252".to_string());
        }
        parts.join(", ")
    }

    /// Emit the warnings this report carries.
    pub(crate) fn log(&self, source: &str) {
        tracing::debug!(
            source,
            records = self.records_read,
            admitted = self.rows_admitted,
            format = ?self.format,
            "ingested rent roll"
        );
        if self.encoding_fallback {
            tracing::warn!(source, "input is not valid UTF-8, decoded as Windows-1252");
        }
        if !self.missing_columns.is_empty() {
            tracing::warn!(source, columns = ?self.missing_columns, "recognised columns missing from header");
        }
        if !self.dropped_rows.is_empty() {
            tracing::warn!(source, count = self.dropped_rows.len(), "rows dropped (no asset code or tenant name)");
        }
        if !self.coerced_cells.is_empty() {
            tracing::warn!(source, count = self.coerced_cells.len(), "unparsable numeric cells read as 0");
        }
    }
}
