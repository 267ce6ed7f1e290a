pub mod anomaly;
pub mod baseline;
pub mod correlation;
pub mod narrator;
pub mod rca;
pub mod repeat;
pub mod resolution;
pub mod severity;
pub mod surge;
pub mod trend;
pub mod trend_plot;
pub mod variation;

use serde::Serialize;

/// A stage's outcome (§7 "every stage returns a structured result
/// `{status, message?, diagnostics?, counts?}`").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StageStatus {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageResult {
    pub stage: &'static str,
    pub status: StageStatus,
    pub message: Option<String>,
    pub diagnostics: Vec<String>,
    pub counts: std::collections::BTreeMap<&'static str, i64>,
}

impl StageResult {
    pub fn success(stage: &'static str) -> Self {
        Self {
            stage,
            status: StageStatus::Success,
            message: None,
            diagnostics: Vec::new(),
            counts: Default::default(),
        }
    }

    pub fn warning(stage: &'static str, message: impl Into<String>) -> Self {
        Self {
            stage,
            status: StageStatus::Warning,
            message: Some(message.into()),
            diagnostics: Vec::new(),
            counts: Default::default(),
        }
    }

    pub fn error(stage: &'static str, message: impl Into<String>) -> Self {
        Self {
            stage,
            status: StageStatus::Error,
            message: Some(message.into()),
            diagnostics: Vec::new(),
            counts: Default::default(),
        }
    }

    pub fn with_count(mut self, key: &'static str, value: i64) -> Self {
        self.counts.insert(key, value);
        self
    }

    pub fn with_diagnostic(mut self, diagnostic: impl Into<String>) -> Self {
        self.diagnostics.push(diagnostic.into());
        self
    }
}
