pub mod dates;
pub mod delimiter;
pub mod encoding;
pub mod headers;
pub mod report;

use std::collections::HashMap;
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::models::complaint::ComplaintRaw;
use crate::store::Store;

use delimiter::{parse_with_delimiter, width, ParsedCsv};
use encoding::FileEncoding;
use report::IngestReport;

/// Parse, normalize, and upsert one file (§4.1). Returns the upserted row count and
/// a diagnostics report; on any fatal error the file is not partially committed.
pub fn ingest_file(store: &Store, path: impl AsRef<Path>) -> Result<IngestReport> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;

    let (text, chosen_encoding) = decode_with_ladder(&bytes)?;

    let (parsed, delimiter_used, used_fallback) = parse_with_ladder(&text)?;

    let canonical_headers: Vec<String> = parsed
        .headers
        .iter()
        .map(|h| headers::canonicalize(h))
        .collect();
    headers::validate(&canonical_headers)?;

    let col_index: HashMap<&str, usize> = canonical_headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.as_str(), i))
        .collect();

    let sample_raw_first_row = parsed.rows.first().map(|r| r.join(","));

    let mut ok_rows = Vec::with_capacity(parsed.rows.len());
    let mut dropped_missing_sr_number = 0usize;
    let mut dropped_unparseable_date = 0usize;

    for raw_row in &parsed.rows {
        let get = |col: &str| -> Option<String> {
            col_index
                .get(col)
                .and_then(|&i| raw_row.get(i))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let sr_number = match get("sr_number") {
            Some(v) => v,
            None => {
                dropped_missing_sr_number += 1;
                continue;
            }
        };

        let open_ts_raw = get("open_ts");
        let open_ts = open_ts_raw.as_deref().and_then(dates::parse_datetime);
        let open_ts = match open_ts {
            Some(ts) => ts,
            None => {
                dropped_unparseable_date += 1;
                continue;
            }
        };

        let open_date = get("open_date")
            .as_deref()
            .and_then(dates::parse_date)
            .unwrap_or_else(|| open_ts.date());

        let close_ts = get("close_ts").as_deref().and_then(dates::parse_datetime);

        ok_rows.push(ComplaintRaw {
            sr_number,
            sr_row_id: get("sr_row_id"),
            mdn: get("mdn"),
            open_ts,
            close_ts,
            open_date,
            sr_type: get("sr_type"),
            sr_sub_type: get("sr_sub_type"),
            sr_status: get("sr_status"),
            sr_sub_status: get("sr_sub_status"),
            region: get("region"),
            city: get("city"),
            exc_id: get("exc_id"),
            cabinet_id: get("cabinet_id"),
            dp_id: get("dp_id"),
            switch_id: get("switch_id"),
            rca: get("rca"),
            desc_text: get("desc_text"),
            priority: get("priority"),
            product: get("product"),
            sub_product: get("sub_product"),
            cust_seg: get("cust_seg"),
            service_type: get("service_type"),
            sr_duration: get("sr_duration"),
        });
    }

    if ok_rows.is_empty() && dropped_unparseable_date > 0 {
        return Err(PipelineError::DateParse {
            raw_sample: sample_raw_first_row,
        });
    }

    let sample_parsed_first_row = ok_rows.first().map(|r| format!("{r:?}"));
    let rows_read = parsed.rows.len();

    let upserted = store.upsert_complaints(&ok_rows)?;

    Ok(IngestReport {
        source: path.display().to_string(),
        encoding_used: chosen_encoding.as_str().to_string(),
        delimiter_used: delimiter_used as char,
        used_tolerant_fallback: used_fallback,
        rows_read,
        rows_upserted: upserted,
        rows_dropped_missing_sr_number: dropped_missing_sr_number,
        rows_dropped_unparseable_date: dropped_unparseable_date,
        sample_raw_first_row,
        sample_parsed_first_row,
    })
}

fn decode_with_ladder(bytes: &[u8]) -> Result<(String, FileEncoding)> {
    for enc in FileEncoding::LADDER {
        if let Some(text) = enc.decode(bytes) {
            if !text.trim().is_empty() {
                return Ok((text, enc));
            }
        }
    }
    Err(PipelineError::Encoding)
}

/// §4.1 steps 1-3: comma first; if width 1, retry the ladder delimiters; if nothing
/// yields width > 1, fall back to a flexible (ragged-row-tolerant) comma parse.
fn parse_with_delimiter_ladder(text: &str) -> Option<(ParsedCsv, u8, bool)> {
    if let Some(parsed) = parse_with_delimiter(text, b',', false) {
        if width(&parsed) > 1 {
            return Some((parsed, b',', false));
        }
    }
    for delim in delimiter::DELIMITER_LADDER {
        if let Some(parsed) = parse_with_delimiter(text, delim, false) {
            if width(&parsed) > 1 {
                return Some((parsed, delim, false));
            }
        }
    }
    None
}

fn parse_with_ladder(text: &str) -> Result<(ParsedCsv, u8, bool)> {
    if let Some(found) = parse_with_delimiter_ladder(text) {
        return Ok(found);
    }
    // Tolerant secondary parser: flexible comma parse, skip malformed lines.
    if let Some(parsed) = parse_with_delimiter(text, b',', true) {
        if width(&parsed) > 1 {
            return Ok((parsed, b',', true));
        }
    }
    Err(PipelineError::Encoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn ingest_round_trip_with_synonym_headers() {
        let store = Store::open_in_memory().unwrap();
        let csv = "sr_number,exchange,type,region,open_ts\n\
                   A,EXC1,Billing,Karachi,2024-01-15 10:00:00\n\
                   B,EXC2,Network,Lahore,2024-01-15 11:00:00\n\
                   C,EXC1,Billing,Karachi,2024-01-15 12:00:00\n";
        let file = write_fixture(csv);
        let report = ingest_file(&store, file.path()).unwrap();
        assert_eq!(report.rows_upserted, 3);
        assert_eq!(store.count_all_complaints().unwrap(), 3);

        // Re-ingest: idempotent row count.
        let report2 = ingest_file(&store, file.path()).unwrap();
        assert_eq!(report2.rows_upserted, 3);
        assert_eq!(store.count_all_complaints().unwrap(), 3);
    }

    #[test]
    fn semicolon_delimited_file_falls_back_correctly() {
        let store = Store::open_in_memory().unwrap();
        let csv = "sr_number;exc_id;sr_type;region;open_ts\n\
                   A;EXC1;Billing;Karachi;2024-01-15 10:00:00\n";
        let file = write_fixture(csv);
        let report = ingest_file(&store, file.path()).unwrap();
        assert_eq!(report.delimiter_used, ';');
        assert_eq!(report.rows_upserted, 1);
    }

    #[test]
    fn missing_required_column_is_a_schema_error() {
        let store = Store::open_in_memory().unwrap();
        let csv = "sr_number,region\nA,Karachi\n";
        let file = write_fixture(csv);
        let err = ingest_file(&store, file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Schema { .. }));
    }

    #[test]
    fn rows_with_unparseable_dates_are_dropped_not_fatal() {
        let store = Store::open_in_memory().unwrap();
        let csv = "sr_number,exc_id,sr_type,region,open_ts\n\
                   A,EXC1,Billing,Karachi,2024-01-15 10:00:00\n\
                   B,EXC1,Billing,Karachi,not-a-date\n";
        let file = write_fixture(csv);
        let report = ingest_file(&store, file.path()).unwrap();
        assert_eq!(report.rows_upserted, 1);
        assert_eq!(report.rows_dropped_unparseable_date, 1);
    }
}
