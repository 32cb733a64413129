// Header recognition and cell coercion shared by the CSV and Excel readers.

use rentroll_recon::Row;

use crate::report::{CoercedCell, DroppedRow, IngestReport};

/// Columns every rent roll should carry. A missing one is reported; the
/// rows are still read with the field left at its default.
const EXPECTED: [&str; 5] = ["asset_code", "tenant_name", "gla_m2", "rent_eur_pa", "walt_years"];

/// Lower-case, whitespace runs to `_`, drop anything outside `[a-z0-9_]`,
/// trim `_` from both ends.
pub fn normalize_header(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut in_space = false;
    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
            out.push(c);
        }
    }
    out.trim_matches('_').to_string()
}

/// Parse a numeric cell. Non-breaking spaces are removed and the first comma
/// is read as the decimal separator. `None` means the cell was non-empty but
/// unparsable (or non-finite).
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '\u{00A0}' | '\u{202F}'))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Some(0.0);
    }
    let dotted = cleaned.replacen(',', ".", 1);
    dotted.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Column positions resolved from a header row.
#[derive(Debug, Default)]
pub(crate) struct ColumnMap {
    asset_code: Option<usize>,
    tenant_name: Option<usize>,
    gla_m2: Option<usize>,
    rent_eur_pa: Option<usize>,
    walt_years: Option<usize>,
    lease_start: Option<usize>,
    lease_end: Option<usize>,
    options_text: Option<usize>,
    psm: Option<usize>,
    city: Option<usize>,
}

impl ColumnMap {
    /// First occurrence wins when a header repeats.
    pub fn from_headers<S: AsRef<str>>(headers: &[S], report: &mut IngestReport) -> Self {
        let mut map = ColumnMap::default();
        for (idx, raw) in headers.iter().enumerate() {
            let slot = match normalize_header(raw.as_ref()).as_str() {
                "asset_code" => &mut map.asset_code,
                "tenant_name" => &mut map.tenant_name,
                "gla_m2" => &mut map.gla_m2,
                "rent_eur_pa" => &mut map.rent_eur_pa,
                "walt_years" => &mut map.walt_years,
                "lease_start" => &mut map.lease_start,
                "lease_end" => &mut map.lease_end,
                "options" | "options_text" => &mut map.options_text,
                "psm" => &mut map.psm,
                "city" => &mut map.city,
                _ => continue,
            };
            slot.get_or_insert(idx);
        }

        let present = [
            map.asset_code,
            map.tenant_name,
            map.gla_m2,
            map.rent_eur_pa,
            map.walt_years,
        ];
        report.missing_columns = EXPECTED
            .iter()
            .zip(present)
            .filter(|(_, idx)| idx.is_none())
            .map(|(name, _)| name.to_string())
            .collect();
        map
    }

    /// Build a row from one record's fields, or record why it was dropped.
    pub fn map_record<S: AsRef<str>>(
        &self,
        fields: &[S],
        line: usize,
        report: &mut IngestReport,
    ) -> Option<Row> {
        report.records_read += 1;
        let asset_code = cell(fields, self.asset_code);
        let tenant_name = cell(fields, self.tenant_name);
        let reason = match (asset_code.is_empty(), tenant_name.is_empty()) {
            (true, true) => Some("empty asset code and tenant name"),
            (true, false) => Some("empty asset code"),
            (false, true) => Some("empty tenant name"),
            (false, false) => None,
        };
        if let Some(reason) = reason {
            report.dropped_rows.push(DroppedRow { line, reason: reason.to_string() });
            return None;
        }

        let mut number = |idx: Option<usize>, column: &str| -> Option<f64> {
            let raw = cell(fields, idx);
            if raw.is_empty() {
                return None;
            }
            match parse_number(raw) {
                Some(v) => Some(v),
                None => {
                    report.coerced_cells.push(CoercedCell {
                        line,
                        column: column.to_string(),
                        raw: raw.to_string(),
                    });
                    Some(0.0)
                }
            }
        };

        let gla_m2 = number(self.gla_m2, "gla_m2").unwrap_or(0.0);
        let rent_eur_pa = number(self.rent_eur_pa, "rent_eur_pa").unwrap_or(0.0);
        let walt_years = number(self.walt_years, "walt_years").unwrap_or(0.0);
        let psm = number(self.psm, "psm");

        report.rows_admitted += 1;
        Some(Row {
            asset_code: asset_code.to_string(),
            tenant_name: tenant_name.to_string(),
            gla_m2,
            rent_eur_pa,
            walt_years,
            lease_start: optional(fields, self.lease_start),
            lease_end: optional(fields, self.lease_end),
            options_text: optional(fields, self.options_text),
            psm,
            city: optional(fields, self.city),
        })
    }
}

fn cell<S: AsRef<str>>(fields: &[S], idx: Option<usize>) -> &str {
    idx.and_then(|i| fields.get(i)).map_or("", |f| f.as_ref().trim())
}

fn optional<S: AsRef<str>>(fields: &[S], idx: Option<usize>) -> Option<String> {
    Some(cell(fields, idx)).filter(|s| !s.is_empty()).map(str::to_string)
}
