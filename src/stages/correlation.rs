use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::dimension::Dimension;
use crate::error::Result;
use crate::models::anomaly::DailyAnomaly;
use crate::stats::pearson;
use crate::store::Store;

use super::StageResult;

const CORRELATION_WINDOW_DAYS: i64 = 30;
const CANDIDATES_PER_DIMENSION: usize = 5;
const MIN_OVERLAP_POINTS: usize = 3;
const CORRELATION_THRESHOLD: f64 = 0.7;

/// Pairwise Pearson correlation between each anomaly's series and the top-5 series
/// of every *other* dimension (§4.6). Writes only augment `rca_context`; never
/// creates or deletes anomaly rows. Grounded on
/// `original_source/agents/correlation_agent.py`.
pub fn run(store: &Store, target_date: NaiveDate) -> Result<StageResult> {
    let anomalies = store.anomalies_for_date(target_date)?;
    let window_start = target_date - Duration::days(CORRELATION_WINDOW_DAYS);

    let mut updated: Vec<DailyAnomaly> = Vec::new();

    for mut anomaly in anomalies {
        if anomaly.dimension == Dimension::Rca {
            continue;
        }

        let s1 = series_for(store, anomaly.dimension, &anomaly.dimension_key, window_start, target_date)?;
        if s1.len() < MIN_OVERLAP_POINTS {
            continue;
        }

        let mut matches: Vec<(String, f64)> = Vec::new();
        for &other_dim in Dimension::ALL.iter().filter(|d| **d != anomaly.dimension) {
            let top_keys = store.top_keys_by_volume(
                other_dim,
                window_start,
                target_date,
                CANDIDATES_PER_DIMENSION,
            )?;
            for key in top_keys {
                let s2 = series_for(store, other_dim, &key, window_start, target_date)?;
                let (xs, ys) = inner_join(&s1, &s2);
                if xs.len() < MIN_OVERLAP_POINTS {
                    continue;
                }
                if let Some(rho) = pearson(&xs, &ys) {
                    if rho > CORRELATION_THRESHOLD {
                        matches.push((key, rho));
                    }
                }
            }
        }

        if matches.is_empty() {
            continue;
        }

        // Deterministic tie-break: descending rho, then ascending key (§4.6).
        matches.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then(a.0.cmp(&b.0)));

        let text = matches
            .iter()
            .map(|(key, rho)| format!("{key} ({rho:.2})"))
            .collect::<Vec<_>>()
            .join(", ");
        anomaly.append_context(&format!("Correlated with: {text}"));
        updated.push(anomaly);
    }

    store.update_anomaly_context_and_severity(&updated)?;
    tracing::info!(count = updated.len(), "correlation: stage complete");

    Ok(StageResult::success("correlation").with_count("correlated", updated.len() as i64))
}

fn series_for(
    store: &Store,
    dim: Dimension,
    key: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<BTreeMap<NaiveDate, i64>> {
    let rows = store.daily_counts_by_dimension(dim, start, end)?;
    Ok(rows
        .into_iter()
        .filter(|(k, _, _)| k == key)
        .map(|(_, date, count)| (date, count))
        .collect())
}

/// Inner-join two date-keyed series, never aligned by vector position (§9).
fn inner_join(a: &BTreeMap<NaiveDate, i64>, b: &BTreeMap<NaiveDate, i64>) -> (Vec<f64>, Vec<f64>) {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for (date, va) in a {
        if let Some(vb) = b.get(date) {
            xs.push(*va as f64);
            ys.push(*vb as f64);
        }
    }
    (xs, ys)
}
