use serde::Serialize;

/// Ingest diagnostics, in the shape of `mqk-db`'s `MdQualityReport`/`CoverageTotals`
/// (`Hartman25-MiniQuantDeskV4/core-rs/crates/mqk-db/src/md.rs`): counts plus a
/// sample of the first raw/parsed row so an operator can see what the parser chose
/// without re-running it.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub source: String,
    pub encoding_used: String,
    pub delimiter_used: char,
    pub used_tolerant_fallback: bool,
    pub rows_read: usize,
    pub rows_upserted: usize,
    pub rows_dropped_missing_sr_number: usize,
    pub rows_dropped_unparseable_date: usize,
    pub sample_raw_first_row: Option<String>,
    pub sample_parsed_first_row: Option<String>,
}
