use chrono::NaiveDate;

use crate::error::Result;
use crate::models::anomaly::Severity;
use crate::models::insight::ExecInsight;
use crate::store::Store;

use super::StageResult;

/// Deterministic templated insight records (§4.9), with the idempotency fix from §9
/// applied at the store layer (`replace_insights_for_date` deletes by
/// `(date(created_at), title)` before inserting — the original's unscoped-append bug
/// is not reproduced). Grounded on `original_source/agents/narrator_agent.py`.
pub fn run(store: &Store, target_date: NaiveDate) -> Result<StageResult> {
    let anomalies = store.anomalies_for_date(target_date)?;
    let created_at = target_date.and_hms_opt(0, 0, 0).expect("midnight is always valid");

    let insights: Vec<ExecInsight> = anomalies
        .into_iter()
        .filter(|a| a.severity != Severity::Info)
        .map(|a| {
            let mut summary = format!(
                "Observed {} vs baseline average {:.1} (z-score {:.1}\u{03c3}). Severity: {}.",
                a.metric_value,
                a.baseline_avg,
                a.z_score,
                a.severity.as_str(),
            );
            if let Some(context) = &a.rca_context {
                if !context.is_empty() {
                    summary.push('\n');
                    summary.push_str(context);
                }
            }
            ExecInsight {
                id: None,
                created_at,
                title: format!("Spike in {} ({})", a.dimension_key, a.dimension),
                summary,
                severity: a.severity,
            }
        })
        .collect();

    store.replace_insights_for_date(target_date, &insights)?;
    tracing::info!(count = insights.len(), "narrator: stage complete");

    Ok(StageResult::success("narrator").with_count("insights", insights.len() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::Dimension;
    use crate::models::anomaly::DailyAnomaly;

    #[test]
    fn emits_one_insight_per_non_info_anomaly() {
        let store = Store::open_in_memory().unwrap();
        let d = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        store
            .replace_anomalies_for_date(
                d,
                &[DailyAnomaly {
                    id: None,
                    anomaly_date: d,
                    dimension: Dimension::Region,
                    dimension_key: "Karachi".to_string(),
                    metric_value: 100,
                    baseline_avg: 10.2,
                    baseline_std: 2.0,
                    z_score: 5.3,
                    severity: Severity::Critical,
                    rca_context: Some("Probable RCA: Fiber Cut (66.7%)".to_string()),
                }],
            )
            .unwrap();

        run(&store, d).unwrap();

        let insights = store.insights_for_date(d).unwrap();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].title, "Spike in Karachi (Region)");
        assert!(insights[0].summary.contains("5.3\u{03c3}"));
        assert!(insights[0].summary.contains("Probable RCA"));
    }

    #[test]
    fn rerun_for_same_date_does_not_duplicate() {
        let store = Store::open_in_memory().unwrap();
        let d = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        store
            .replace_anomalies_for_date(
                d,
                &[DailyAnomaly {
                    id: None,
                    anomaly_date: d,
                    dimension: Dimension::Region,
                    dimension_key: "Karachi".to_string(),
                    metric_value: 100,
                    baseline_avg: 10.0,
                    baseline_std: 2.0,
                    z_score: 5.0,
                    severity: Severity::Critical,
                    rca_context: None,
                }],
            )
            .unwrap();

        run(&store, d).unwrap();
        run(&store, d).unwrap();

        assert_eq!(store.insights_for_date(d).unwrap().len(), 1);
    }
}
