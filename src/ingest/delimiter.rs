//! Delimiter ladder (§4.1 step 2) and tolerant fallback parser (step 3).

use csv::ReaderBuilder;

/// Delimiters retried, in order, when the comma-delimited parse yields a width-1
/// frame. Matches `original_source/agents/ingestion_agent.py`'s retry list.
pub const DELIMITER_LADDER: [u8; 3] = [b';', b'\t', b'|'];

pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Parse `text` with the given delimiter. `flexible` allows ragged row widths
/// (tolerant secondary parser, step 3) instead of erroring on them.
pub fn parse_with_delimiter(text: &str, delimiter: u8, flexible: bool) -> Option<ParsedCsv> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(flexible)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers().ok()?.iter().map(|s| s.to_string()).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        match record {
            Ok(r) => rows.push(r.iter().map(|s| s.to_string()).collect()),
            Err(_) if flexible => continue,
            Err(_) => return None,
        }
    }
    Some(ParsedCsv { headers, rows })
}

/// Width of a parsed frame (number of header columns).
pub fn width(parsed: &ParsedCsv) -> usize {
    parsed.headers.len()
}
