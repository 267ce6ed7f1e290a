use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::config::PulseConfig;
use crate::error::Result;
use crate::models::variation::{DailyVariation, VariationType};
use crate::stats::mean;
use crate::store::Store;

use super::StageResult;

/// DoD/WoW/MoM comparisons using the redefined semantics of §4.5 (canonical per §9,
/// superseding `original_source/agents/variation_agent.py`'s simpler D vs D-delta
/// logic).
pub fn run(store: &Store, config: &PulseConfig, target_date: NaiveDate) -> Result<StageResult> {
    let mut variations: Vec<DailyVariation> = Vec::new();

    let month_start = target_date.with_day(1).unwrap();
    let prev_month_start = first_of_previous_month(month_start);
    let earliest = prev_month_start.min(target_date - Duration::days(14));

    for &dim in &config.dimensions {
        let daily = store.daily_counts_by_dimension(dim, earliest, target_date)?;
        let mut by_key: HashMap<String, HashMap<NaiveDate, i64>> = HashMap::new();
        let mut keys_on_target: Vec<String> = Vec::new();
        for (key, date, count) in &daily {
            by_key
                .entry(key.clone())
                .or_default()
                .insert(*date, *count);
            if *date == target_date {
                keys_on_target.push(key.clone());
            }
        }

        for key in keys_on_target {
            let series = &by_key[&key];
            let current = *series.get(&target_date).unwrap_or(&0);

            // DOD: D vs D-7 (same weekday).
            let dod_prev_date = target_date - Duration::days(7);
            let dod_prev = *series.get(&dod_prev_date).unwrap_or(&0);
            variations.push(make_variation(
                config,
                target_date,
                dim,
                &key,
                VariationType::Dod,
                current as f64,
                dod_prev as f64,
            ));

            // WOW: mean(Monday..D) vs mean(Monday-7..D-7).
            let monday = target_date - Duration::days(target_date.weekday().num_days_from_monday() as i64);
            let cur_week_mean = mean(&range_counts(series, monday, target_date));
            let prev_week_mean = mean(&range_counts(
                series,
                monday - Duration::days(7),
                target_date - Duration::days(7),
            ));
            variations.push(make_variation(
                config,
                target_date,
                dim,
                &key,
                VariationType::Wow,
                cur_week_mean,
                prev_week_mean,
            ));

            // MOM: mean(1st..D) vs mean(prev-1st..same relative day).
            let cur_month_mean = mean(&range_counts(series, month_start, target_date));
            let day_offset = (target_date - month_start).num_days();
            let prev_month_end = (prev_month_start + Duration::days(day_offset)).min(month_start - Duration::days(1));
            let prev_month_mean = mean(&range_counts(series, prev_month_start, prev_month_end));
            variations.push(make_variation(
                config,
                target_date,
                dim,
                &key,
                VariationType::Mom,
                cur_month_mean,
                prev_month_mean,
            ));
        }
    }

    store.replace_variations_for_date(target_date, &variations)?;
    tracing::info!(count = variations.len(), "variation: stage complete");

    Ok(StageResult::success("variation").with_count("variations", variations.len() as i64))
}

fn range_counts(series: &HashMap<NaiveDate, i64>, start: NaiveDate, end: NaiveDate) -> Vec<f64> {
    let mut out = Vec::new();
    let mut d = start;
    while d <= end {
        out.push(*series.get(&d).unwrap_or(&0) as f64);
        d += Duration::days(1);
    }
    out
}

fn first_of_previous_month(month_start: NaiveDate) -> NaiveDate {
    if month_start.month() == 1 {
        NaiveDate::from_ymd_opt(month_start.year() - 1, 12, 1).unwrap()
    } else {
        NaiveDate::from_ymd_opt(month_start.year(), month_start.month() - 1, 1).unwrap()
    }
}

fn make_variation(
    config: &PulseConfig,
    date: NaiveDate,
    dim: crate::dimension::Dimension,
    key: &str,
    variation_type: VariationType,
    current: f64,
    previous: f64,
) -> DailyVariation {
    let percent = if previous == 0.0 {
        if current > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        (current - previous) / previous * 100.0
    };
    let is_significant = percent.abs() >= config.variation_threshold_percent;
    DailyVariation {
        id: None,
        variation_date: date,
        dimension: dim,
        dimension_key: key.to_string(),
        variation_type,
        current_value: current,
        previous_value: previous,
        variation_percent: percent,
        is_significant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_previous_with_positive_current_is_100_percent() {
        let config = PulseConfig::default();
        let v = make_variation(
            &config,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            crate::dimension::Dimension::Region,
            "Karachi",
            VariationType::Dod,
            100.0,
            0.0,
        );
        assert_eq!(v.variation_percent, 100.0);
        assert!(v.is_significant);
    }

    #[test]
    fn zero_previous_with_zero_current_is_zero_percent() {
        let config = PulseConfig::default();
        let v = make_variation(
            &config,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            crate::dimension::Dimension::Region,
            "Karachi",
            VariationType::Dod,
            0.0,
            0.0,
        );
        assert_eq!(v.variation_percent, 0.0);
        assert!(!v.is_significant);
    }
}
