use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dimension::Dimension;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Severity> {
        match s {
            "INFO" => Some(Severity::Info),
            "WARNING" => Some(Severity::Warning),
            "CRITICAL" => Some(Severity::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected deviation at (date, dimension, dimension_key). See spec §3/§4.3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyAnomaly {
    pub id: Option<i64>,
    pub anomaly_date: NaiveDate,
    pub dimension: Dimension,
    pub dimension_key: String,
    pub metric_value: i64,
    pub baseline_avg: f64,
    pub baseline_std: f64,
    pub z_score: f64,
    pub severity: Severity,
    pub rca_context: Option<String>,
}

impl DailyAnomaly {
    /// Appends a new context fragment, joining on " | " with whatever is already
    /// there (Correlation and RCA both append; neither ever overwrites).
    pub fn append_context(&mut self, fragment: &str) {
        match &mut self.rca_context {
            Some(existing) if !existing.is_empty() => {
                existing.push_str(" | ");
                existing.push_str(fragment);
            }
            _ => self.rca_context = Some(fragment.to_string()),
        }
    }
}
