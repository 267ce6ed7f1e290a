//! Header normalization and the synonym table (§4.1). Grounded on
//! `original_source/agents/ingestion_agent.py`'s `synonyms` dict and
//! `required_columns` list.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{PipelineError, Result};

pub const REQUIRED_COLUMNS: [&str; 5] = ["sr_number", "open_ts", "sr_type", "region", "exc_id"];

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static pattern"))
}

/// Lowercase, trim, runs of whitespace -> a single underscore (real headers carry
/// double spaces and tabs as often as single spaces).
pub fn normalize(header: &str) -> String {
    whitespace_run()
        .replace_all(header.trim(), "_")
        .to_lowercase()
}

fn synonym_table() -> HashMap<&'static str, &'static str> {
    let mut m = HashMap::new();
    for s in [
        "date",
        "time",
        "open_date",
        "opened",
        "timestamp",
        "created_at",
        "open_dttm",
        "occurrence_time",
        "sr_open_dttm",
    ] {
        m.insert(s, "open_ts");
    }
    for s in ["exchange", "exc", "exchange_id", "excid"] {
        m.insert(s, "exc_id");
    }
    for s in ["type", "complaint_type", "category", "order_type"] {
        m.insert(s, "sr_type");
    }
    for s in ["location", "zone", "area", "region_name"] {
        m.insert(s, "region");
    }
    for s in ["id", "row_id", "record_id", "row", "sr_id", "sr_row", "rowid"] {
        m.insert(s, "sr_row_id");
    }
    for s in ["sr_prio_cd"] {
        m.insert(s, "priority");
    }
    m
}

/// Normalize then map through the synonym table, leaving unrecognized columns as-is
/// (retained but unused per §4.1).
pub fn canonicalize(header: &str) -> String {
    let normalized = normalize(header);
    synonym_table()
        .get(normalized.as_str())
        .map(|s| s.to_string())
        .unwrap_or(normalized)
}

/// Returns the missing required columns, if any.
pub fn validate(canonical_headers: &[String]) -> Result<()> {
    let found: Vec<String> = canonical_headers.to_vec();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !found.iter().any(|f| f == *c))
        .map(|s| s.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::Schema { missing, found })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_spaces() {
        assert_eq!(normalize("  SR Number  "), "sr_number");
    }

    #[test]
    fn collapses_runs_of_whitespace_to_one_underscore() {
        assert_eq!(normalize("SR   Sub\tType"), "sr_sub_type");
    }

    #[test]
    fn maps_common_synonyms() {
        assert_eq!(canonicalize("Exchange"), "exc_id");
        assert_eq!(canonicalize("Type"), "sr_type");
        assert_eq!(canonicalize("Opened"), "open_ts");
    }

    #[test]
    fn validate_flags_missing_required_columns() {
        let headers = vec!["sr_number".to_string(), "region".to_string()];
        let err = validate(&headers).unwrap_err();
        match err {
            PipelineError::Schema { missing, .. } => {
                assert!(missing.contains(&"open_ts".to_string()));
                assert!(missing.contains(&"sr_type".to_string()));
                assert!(missing.contains(&"exc_id".to_string()));
            }
            _ => panic!("expected Schema error"),
        }
    }
}
