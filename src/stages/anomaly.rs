use chrono::NaiveDate;

use crate::config::PulseConfig;
use crate::error::Result;
use crate::models::anomaly::{DailyAnomaly, Severity};
use crate::store::Store;

use super::StageResult;

const EPSILON: f64 = 1e-3;
const ANOMALY_WINDOW: u32 = 30;

/// Per-day Z-score detection against the 30-day baseline (§4.3). Grounded on
/// `original_source/agents/anomaly_agent.py`; control-flow shape (evaluate all
/// series, collect results, log a summary) follows the teacher's
/// `eval_anomaly_rules` (`examples/RushObservability-query-api/src/anomaly_engine.rs`).
pub fn run(store: &Store, config: &PulseConfig, target_date: NaiveDate) -> Result<StageResult> {
    let mut emitted: Vec<DailyAnomaly> = Vec::new();
    let mut skipped_dimensions: Vec<&'static str> = Vec::new();

    for &dim in &config.dimensions {
        let baseline = store.baseline_stats(dim, ANOMALY_WINDOW)?;
        if baseline.is_empty() {
            tracing::warn!(dimension = %dim, "anomaly: no baseline found, skipping dimension");
            skipped_dimensions.push(dim.as_str());
            continue;
        }

        let counts = store.daily_counts_by_dimension(dim, target_date, target_date)?;
        for (key, _date, count) in counts {
            let Some(stat) = baseline.get(&key) else {
                continue;
            };
            let z = (count as f64 - stat.avg) / (stat.std + EPSILON);
            if z > config.z_score_warning {
                let severity = if z > config.z_score_critical {
                    Severity::Critical
                } else {
                    Severity::Warning
                };
                emitted.push(DailyAnomaly {
                    id: None,
                    anomaly_date: target_date,
                    dimension: dim,
                    dimension_key: key,
                    metric_value: count,
                    baseline_avg: stat.avg,
                    baseline_std: stat.std,
                    z_score: z,
                    severity,
                    rca_context: None,
                });
            }
        }
    }

    store.replace_anomalies_for_date(target_date, &emitted)?;

    tracing::info!(count = emitted.len(), "anomaly: stage complete");

    let mut result = StageResult::success("anomaly").with_count("anomalies", emitted.len() as i64);
    for dim in skipped_dimensions {
        result = result.with_diagnostic(format!("missing baseline for dimension {dim}, skipped"));
    }
    Ok(result)
}

/// Used by Severity/Correlation/RCA/Narrator to decide whether they should run at
/// all (§4.13: "run only if Anomaly produced >= 1 row").
pub fn anomaly_count(store: &Store, target_date: NaiveDate) -> Result<usize> {
    Ok(store.anomalies_for_date(target_date)?.len())
}
