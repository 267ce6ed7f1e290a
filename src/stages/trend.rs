use std::collections::HashMap;

use chrono::{Duration, NaiveDate};

use crate::config::PulseConfig;
use crate::models::trend::{DailyTrend, TrendDirection};
use crate::error::Result;
use crate::stats::linregress;
use crate::store::Store;

use super::StageResult;

/// OLS regression over 7/14/30-day windows (§4.4). Grounded on
/// `original_source/agents/trend_agent.py`; p-value significance uses `statrs`'s
/// Student's t CDF (`stats::linregress`) rather than `scipy.stats.linregress`.
pub fn run(store: &Store, config: &PulseConfig, target_date: NaiveDate) -> Result<StageResult> {
    let mut trends: Vec<DailyTrend> = Vec::new();

    for &dim in &config.dimensions {
        for &window in &config.baseline_windows {
            let start = target_date - Duration::days(window as i64);
            let daily = store.daily_counts_by_dimension(dim, start, target_date)?;

            let mut by_key: HashMap<String, Vec<(NaiveDate, i64)>> = HashMap::new();
            for (key, date, count) in daily {
                by_key.entry(key).or_default().push((date, count));
            }

            for (key, mut samples) in by_key {
                if samples.len() < 3 {
                    continue;
                }
                samples.sort_by_key(|(d, _)| *d);

                let xs: Vec<f64> = (0..samples.len()).map(|i| i as f64).collect();
                let ys: Vec<f64> = samples.iter().map(|(_, c)| *c as f64).collect();
                let fit = linregress(&xs, &ys);

                let first = ys.first().copied().unwrap_or(0.0);
                let last = ys.last().copied().unwrap_or(0.0);
                let strength = if first == 0.0 {
                    0.0
                } else {
                    (last - first) / first * 100.0
                };

                let direction = match fit.p_value {
                    Some(p) if p < config.trend_significance && fit.slope > 0.0 => TrendDirection::Up,
                    Some(p) if p < config.trend_significance && fit.slope < 0.0 => TrendDirection::Down,
                    _ => TrendDirection::Stable,
                };

                let metric_value = samples
                    .last()
                    .filter(|(d, _)| *d == target_date)
                    .map(|(_, c)| *c)
                    .unwrap_or(last as i64);

                trends.push(DailyTrend {
                    id: None,
                    trend_date: target_date,
                    dimension: dim,
                    dimension_key: key,
                    window_days: window,
                    metric_value,
                    trend_direction: direction,
                    trend_strength: strength,
                    significance: fit.p_value,
                });
            }
        }
    }

    store.replace_trends_for_date(target_date, &trends)?;
    tracing::info!(count = trends.len(), "trend: stage complete");

    Ok(StageResult::success("trend").with_count("trends", trends.len() as i64))
}
