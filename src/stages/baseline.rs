use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use rayon::ThreadPoolBuilder;

use crate::config::PulseConfig;
use crate::dimension::Dimension;
use crate::error::Result;
use crate::models::baseline::BaselineStat;
use crate::stats::{mean, sample_stddev};
use crate::store::Store;

use super::StageResult;

/// Rolling mean/std per dimension x key (§4.2). Fans out across dimensions on a pool
/// bounded to `min(dimensions.len(), 5)` (§5.1), then commits each dimension/window
/// slice in its own `replace_baseline_stats` transaction.
pub fn run(store: &Store, config: &PulseConfig, target_date: NaiveDate) -> Result<StageResult> {
    let dimensions: Vec<Dimension> = config
        .dimensions
        .iter()
        .copied()
        .collect();

    let pool = ThreadPoolBuilder::new()
        .num_threads(dimensions.len().min(5).max(1))
        .build()
        .expect("bounded baseline thread pool");

    let history_start = target_date - Duration::days(35);
    let history_end = target_date - Duration::days(1);

    let results: Vec<Result<usize>> = pool.install(|| {
        use rayon::prelude::*;
        dimensions
            .par_iter()
            .map(|&dim| compute_and_store_dimension(store, config, dim, history_start, history_end, target_date))
            .collect()
    });

    let mut total_keys = 0i64;
    for r in results {
        total_keys += r? as i64;
    }

    if total_keys == 0 {
        return Ok(StageResult::warning(
            "baseline",
            "empty history window: no baseline rows computed",
        )
        .with_count("keys", 0));
    }

    Ok(StageResult::success("baseline").with_count("keys", total_keys))
}

fn compute_and_store_dimension(
    store: &Store,
    config: &PulseConfig,
    dim: Dimension,
    history_start: NaiveDate,
    history_end: NaiveDate,
    target_date: NaiveDate,
) -> Result<usize> {
    let daily = store.daily_counts_by_dimension(dim, history_start, history_end)?;

    let mut by_key: HashMap<String, Vec<(NaiveDate, i64)>> = HashMap::new();
    for (key, date, count) in daily {
        // Leakage guard: the query range already excludes target_date, but assert
        // the invariant explicitly rather than trust the caller silently.
        debug_assert!(date < target_date);
        by_key.entry(key).or_default().push((date, count));
    }

    let mut total_rows = 0usize;
    for &window in &config.baseline_windows {
        let window_start = target_date - Duration::days(window as i64);
        let mut stats = Vec::new();
        for (key, samples) in &by_key {
            let in_window: Vec<f64> = samples
                .iter()
                .filter(|(d, _)| *d >= window_start && *d <= history_end)
                .map(|(_, c)| *c as f64)
                .collect();
            if in_window.is_empty() {
                continue;
            }
            stats.push(BaselineStat {
                dimension: dim,
                window_days: window,
                dimension_key: key.clone(),
                avg: mean(&in_window),
                std: sample_stddev(&in_window),
                samples: in_window.len() as u32,
            });
        }
        total_rows += stats.len();
        store.replace_baseline_stats(dim, window, &stats)?;
    }

    Ok(total_rows)
}
