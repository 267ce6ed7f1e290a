use chrono::{Duration, NaiveDate};

use crate::dimension::Dimension;
use crate::error::Result;
use crate::store::Store;

/// Read-only series assembly for charting (§2.1, recovered from
/// `original_source/complaints_ai/agents/trend_plotter_agent.py`). This crate has no
/// UI layer, so the "plot" is just the same per-dimension daily-count series Trend
/// regresses over, handed back in a shape a caller can chart without re-deriving it.
/// Performs no persistence and is not part of the Orchestrator's sequence.
pub struct TrendSeries {
    pub dimension: Dimension,
    pub dimension_key: String,
    pub window_days: u32,
    pub points: Vec<(NaiveDate, i64)>,
}

pub fn series_for(
    store: &Store,
    dimension: Dimension,
    dimension_key: &str,
    window_days: u32,
    target_date: NaiveDate,
) -> Result<TrendSeries> {
    let start = target_date - Duration::days(window_days as i64);
    let daily = store.daily_counts_by_dimension(dimension, start, target_date)?;

    let mut points: Vec<(NaiveDate, i64)> = daily
        .into_iter()
        .filter(|(key, _, _)| key == dimension_key)
        .map(|(_, date, count)| (date, count))
        .collect();
    points.sort_by_key(|(date, _)| *date);

    Ok(TrendSeries {
        dimension,
        dimension_key: dimension_key.to_string(),
        window_days,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_is_sorted_and_scoped_to_the_key() {
        use crate::models::complaint::ComplaintRaw;

        let store = Store::open_in_memory().unwrap();
        let d = NaiveDate::from_ymd_opt(2024, 8, 10).unwrap();
        let row = |sr: &str, region: &str, date: NaiveDate| ComplaintRaw {
            sr_number: sr.to_string(),
            sr_row_id: None,
            mdn: None,
            open_ts: date.and_hms_opt(9, 0, 0).unwrap(),
            close_ts: None,
            open_date: date,
            sr_type: None,
            sr_sub_type: None,
            sr_status: None,
            sr_sub_status: None,
            region: Some(region.to_string()),
            city: None,
            exc_id: None,
            cabinet_id: None,
            dp_id: None,
            switch_id: None,
            rca: None,
            desc_text: None,
            priority: None,
            product: None,
            sub_product: None,
            cust_seg: None,
            service_type: None,
            sr_duration: None,
        };

        store
            .upsert_complaints(&[
                row("A", "Karachi", d - Duration::days(2)),
                row("B", "Karachi", d),
                row("C", "Lahore", d),
            ])
            .unwrap();

        let series = series_for(&store, Dimension::Region, "Karachi", 7, d).unwrap();
        assert_eq!(series.points.len(), 2);
        assert!(series.points.windows(2).all(|w| w[0].0 < w[1].0));
    }
}
