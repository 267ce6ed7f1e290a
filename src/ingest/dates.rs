//! Ordered date/time format catalog (§4.1, §6 "~15 formats"). Grounded on
//! `original_source/agents/ingestion_agent.py`'s format list.

use chrono::{NaiveDate, NaiveDateTime};

pub const DATETIME_FORMATS: &[&str] = &[
    "%d-%b-%y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%y %H:%M:%S",
    "%d/%m/%y %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d-%b-%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%d/%m/%Y %I:%M:%S %p",
    "%Y-%m-%d %I:%M:%S %p",
];

pub const DATE_ONLY_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%d-%m-%Y"];

/// Try every datetime format in order, first match wins; falls back to date-only
/// formats (midnight) if none of the datetime formats match.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_ONLY_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d.and_hms_opt(0, 0, 0).unwrap());
        }
    }
    None
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in DATE_ONLY_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    parse_datetime(raw).map(|dt| dt.date())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_datetime() {
        assert!(parse_datetime("2024-01-15 13:45:00").is_some());
    }

    #[test]
    fn parses_day_month_year_slash() {
        let dt = parse_datetime("15/01/2024 13:45:00").unwrap();
        assert_eq!(dt.date().format("%Y-%m-%d").to_string(), "2024-01-15");
    }

    #[test]
    fn parses_12_hour_am_pm() {
        assert!(parse_datetime("01/15/2024 01:45:00 PM").is_some());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_datetime("not-a-date").is_none());
    }
}
