use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::anomaly::Severity;

/// Narrator output. Immutable and append-only, but re-runs of the pipeline for the
/// same date must not duplicate rows (§9) — the store deletes by `(date, title)`
/// before inserting, not this type's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecInsight {
    pub id: Option<i64>,
    pub created_at: NaiveDateTime,
    pub title: String,
    pub summary: String,
    pub severity: Severity,
}
