// Excel rent rolls: first worksheet only, cells rendered to text and fed
// through the same column mapping as CSV.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use chrono::{Days, NaiveDate};
use unicode_normalization::UnicodeNormalization;

use crate::error::IngestError;
use crate::fields::ColumnMap;
use crate::report::{IngestReport, SourceFormat};
use crate::Ingested;

pub fn parse_xlsx_bytes(bytes: &[u8]) -> Result<Ingested, IngestError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| IngestError::Xlsx(format!("failed to open workbook: {e}")))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| IngestError::Xlsx(format!("failed to read first sheet: {e}")))?,
        None => return Err(IngestError::Xlsx("workbook contains no sheets".to_string())),
    };

    let mut report = IngestReport::new(SourceFormat::Xlsx);
    let (start_row, _) = range.start().unwrap_or((0, 0));
    let mut rows_iter = range.rows();

    let header: Vec<String> = match rows_iter.next() {
        Some(cells) => cells.iter().map(cell_text).collect(),
        None => return Err(IngestError::MissingHeader),
    };
    if header.iter().all(|h| h.is_empty()) {
        return Err(IngestError::MissingHeader);
    }
    let columns = ColumnMap::from_headers(&header, &mut report);

    let mut rows = Vec::new();
    for (idx, cells) in rows_iter.enumerate() {
        let fields: Vec<String> = cells.iter().map(cell_text).collect();
        if fields.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        // Header sits on sheet row start_row + 1 (1-based).
        let line = start_row as usize + idx + 2;
        if let Some(row) = columns.map_record(&fields, line, &mut report) {
            rows.push(row);
        }
    }

    Ok(Ingested { rows, report })
}

/// Render one cell as text. Integral floats lose their decimals, dates
/// become `YYYY-MM-DD`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.nfc().collect(),
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => serial_to_iso_date(dt.as_f64()),
        Data::DateTimeIso(s) => s.split('T').next().unwrap_or_default().to_string(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Excel 1900-system serial to an ISO date; the time of day is dropped.
fn serial_to_iso_date(serial: f64) -> String {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30);
    if !serial.is_finite() || serial < 0.0 {
        return format!("{}", serial);
    }
    epoch
        .and_then(|d| d.checked_add_days(Days::new(serial.floor() as u64)))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| format!("{}", serial))
}
