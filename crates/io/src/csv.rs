// Delimited-text rent rolls: decoding, delimiter sniffing, record mapping.

use unicode_normalization::UnicodeNormalization;

use crate::error::IngestError;
use crate::fields::ColumnMap;
use crate::report::{IngestReport, SourceFormat};
use crate::Ingested;

/// Decode raw bytes to NFC text. Returns the text and whether the
/// Windows-1252 fallback was used.
///
/// UTF-8 is tried first; input that is invalid UTF-8 or already carries
/// U+FFFD is re-decoded as Windows-1252 (common for Excel-exported CSVs).
pub fn decode_text(bytes: &[u8]) -> (String, bool) {
    let (text, fallback) = match std::str::from_utf8(bytes) {
        Ok(s) if !s.contains('\u{FFFD}') => (s.to_string(), false),
        _ => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            (decoded.into_owned(), true)
        }
    };
    (text.trim_start_matches('\u{FEFF}').nfc().collect(), fallback)
}

/// Detect the field delimiter by checking consistency across the first lines.
///
/// For each candidate (tab, semicolon, comma), count fields per line. The one
/// giving the most consistent field count (>1 field on the header) wins; ties
/// go to the earlier candidate. Falls back to comma.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b','];
    let sample_lines: Vec<&str> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(10)
        .collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        let target = counts[0];
        if target <= 1 {
            continue;
        }

        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;
        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Parse delimited bytes (any of the supported encodings).
pub fn parse_csv_bytes(bytes: &[u8]) -> Result<Ingested, IngestError> {
    let (text, fallback) = decode_text(bytes);
    let mut ingested = parse_text(&text)?;
    ingested.report.encoding_fallback = fallback;
    Ok(ingested)
}

/// Parse already-decoded text. The text is NFC-normalized first.
pub fn parse_csv_text(text: &str) -> Result<Ingested, IngestError> {
    let normalized: String = text.trim_start_matches('\u{FEFF}').nfc().collect();
    parse_text(&normalized)
}

fn parse_text(content: &str) -> Result<Ingested, IngestError> {
    if content.trim().is_empty() {
        return Err(IngestError::MissingHeader);
    }

    let delimiter = sniff_delimiter(content);
    let mut report = IngestReport::new(SourceFormat::Csv);
    report.delimiter = Some(delimiter as char);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(IngestError::MissingHeader);
    }
    let columns = ColumnMap::from_headers(&headers.iter().collect::<Vec<_>>(), &mut report);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line() as usize);
        let fields: Vec<&str> = record.iter().collect();
        if let Some(row) = columns.map_record(&fields, line, &mut report) {
            rows.push(row);
        }
    }

    Ok(Ingested { rows, report })
}
