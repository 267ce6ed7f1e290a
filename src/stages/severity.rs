use chrono::{Duration, NaiveDate};

use crate::config::PulseConfig;
use crate::dimension::Dimension;
use crate::error::Result;
use crate::models::anomaly::{DailyAnomaly, Severity};
use crate::store::Store;

use super::StageResult;

/// Persistence + spread-based severity upgrades (§4.8). Never downgrades — only
/// `Warning -> Critical` transitions are applied. State-transition idiom borrowed
/// from the teacher's `slo_engine.rs` evaluation loop (evaluate every row against a
/// set of rules, apply the result, move on), grounded on
/// `original_source/agents/severity_agent.py`.
pub fn run(store: &Store, config: &PulseConfig, target_date: NaiveDate) -> Result<StageResult> {
    let anomalies = store.anomalies_for_date(target_date)?;
    if anomalies.is_empty() {
        return Ok(StageResult::success("severity").with_count("upgraded", 0));
    }

    let region_anomaly_count = store.region_anomaly_count(target_date)?;
    let yesterday = target_date - Duration::days(1);

    let mut upgraded: Vec<DailyAnomaly> = Vec::new();

    for mut anomaly in anomalies {
        if anomaly.severity == Severity::Critical {
            continue;
        }

        let persisted = store.anomaly_exists(yesterday, anomaly.dimension, &anomaly.dimension_key)?;
        let spread = anomaly.dimension == Dimension::Type
            && region_anomaly_count > config.widespread_region_count as i64;

        if persisted || spread {
            anomaly.severity = Severity::Critical;
            upgraded.push(anomaly);
        }
    }

    store.update_anomaly_context_and_severity(&upgraded)?;
    tracing::info!(count = upgraded.len(), "severity: stage complete");

    Ok(StageResult::success("severity").with_count("upgraded", upgraded.len() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anomaly(dim: Dimension, key: &str, date: NaiveDate, severity: Severity) -> DailyAnomaly {
        DailyAnomaly {
            id: None,
            anomaly_date: date,
            dimension: dim,
            dimension_key: key.to_string(),
            metric_value: 50,
            baseline_avg: 10.0,
            baseline_std: 2.0,
            z_score: 2.5,
            severity,
            rca_context: None,
        }
    }

    #[test]
    fn upgrades_on_persistence_from_prior_day() {
        let store = Store::open_in_memory().unwrap();
        let config = PulseConfig::default();
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let yesterday = d - Duration::days(1);

        store
            .replace_anomalies_for_date(
                yesterday,
                &[anomaly(Dimension::Region, "Karachi", yesterday, Severity::Warning)],
            )
            .unwrap();
        store
            .replace_anomalies_for_date(
                d,
                &[anomaly(Dimension::Region, "Karachi", d, Severity::Warning)],
            )
            .unwrap();

        run(&store, &config, d).unwrap();

        let after = store.anomalies_for_date(d).unwrap();
        assert_eq!(after[0].severity, Severity::Critical);
    }

    #[test]
    fn upgrades_type_anomaly_on_widespread_region_count() {
        let store = Store::open_in_memory().unwrap();
        let config = PulseConfig::default();
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let mut rows = vec![anomaly(Dimension::Type, "Billing", d, Severity::Warning)];
        for region in ["Karachi", "Lahore", "Islamabad", "Quetta"] {
            rows.push(anomaly(Dimension::Region, region, d, Severity::Warning));
        }
        store.replace_anomalies_for_date(d, &rows).unwrap();

        run(&store, &config, d).unwrap();

        let after = store.anomalies_for_date(d).unwrap();
        let type_anomaly = after
            .iter()
            .find(|a| a.dimension == Dimension::Type)
            .unwrap();
        assert_eq!(type_anomaly.severity, Severity::Critical);
    }

    #[test]
    fn never_downgrades_an_existing_critical() {
        let store = Store::open_in_memory().unwrap();
        let config = PulseConfig::default();
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        store
            .replace_anomalies_for_date(
                d,
                &[anomaly(Dimension::Region, "Karachi", d, Severity::Critical)],
            )
            .unwrap();

        run(&store, &config, d).unwrap();

        let after = store.anomalies_for_date(d).unwrap();
        assert_eq!(after[0].severity, Severity::Critical);
    }
}
