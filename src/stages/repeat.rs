use std::collections::HashMap;

use chrono::{Duration, NaiveDate};

use crate::error::Result;
use crate::models::complaint::ComplaintRaw;
use crate::models::repeat::{RepeatHighlight, RepeatReport, RepeatSeverity};
use crate::store::Store;

use super::StageResult;

const WINDOW_DAYS: i64 = 30;
const TOP_N: usize = 10;

/// 30-day MDN repetition classifier (§4.11). Read-mostly: no persisted table, so
/// this returns the aggregated report directly rather than a `StageResult` count
/// alone, mirroring Surge's split between the Orchestrator's log line and the
/// caller-facing payload.
pub fn run(store: &Store, target_date: NaiveDate) -> Result<(StageResult, RepeatReport)> {
    let report = report_for(store, target_date)?;
    let result = StageResult::success("repeat").with_count("repeaters", report.repeaters.len() as i64);
    tracing::info!(count = report.repeaters.len(), "repeat: stage complete");
    Ok((result, report))
}

pub fn report_for(store: &Store, target_date: NaiveDate) -> Result<RepeatReport> {
    let window_start = target_date - Duration::days(WINDOW_DAYS - 1);
    let rows = store.rows_in_range(window_start, target_date)?;

    let mut by_mdn: HashMap<String, Vec<&ComplaintRaw>> = HashMap::new();
    for row in &rows {
        if let Some(mdn) = row.mdn.as_deref().filter(|m| !m.is_empty()) {
            by_mdn.entry(mdn.to_string()).or_default().push(row);
        }
    }

    let mut report = RepeatReport::default();

    for (mdn, mdn_rows) in by_mdn {
        let repeat_count = mdn_rows.len() as i64;
        if repeat_count <= 1 {
            continue;
        }

        let severity = RepeatSeverity::classify(repeat_count);
        let region = modal(mdn_rows.iter().filter_map(|r| r.region.as_deref()));
        let exchange = modal(mdn_rows.iter().filter_map(|r| r.exc_id.as_deref()));
        let city = modal(mdn_rows.iter().filter_map(|r| r.city.as_deref()));
        let modal_sub_type = modal(mdn_rows.iter().filter_map(|r| r.sr_sub_type.as_deref()));

        if let Some(r) = &region {
            *report.by_region.entry(r.clone()).or_insert(0) += 1;
        }
        if let Some(e) = &exchange {
            *report.by_exchange.entry(e.clone()).or_insert(0) += 1;
        }
        if let Some(c) = &city {
            *report.by_city.entry(c.clone()).or_insert(0) += 1;
        }
        *report.by_severity.entry(severity.as_str()).or_insert(0) += 1;
        if let Some(st) = &modal_sub_type {
            *report.by_sub_type.entry(st.clone()).or_insert(0) += 1;
            if let Some(r) = &region {
                *report
                    .by_region_sub_type
                    .entry((r.clone(), st.clone()))
                    .or_insert(0) += 1;
            }
            if let Some(e) = &exchange {
                *report
                    .by_exchange_sub_type
                    .entry((e.clone(), st.clone()))
                    .or_insert(0) += 1;
            }
            if let Some(c) = &city {
                *report
                    .by_city_sub_type
                    .entry((c.clone(), st.clone()))
                    .or_insert(0) += 1;
            }
        }

        report.repeaters.push(RepeatHighlight {
            mdn,
            repeat_count,
            severity,
            region,
            exchange,
            city,
            modal_sub_type,
        });
    }

    report
        .repeaters
        .sort_by(|a, b| b.repeat_count.cmp(&a.repeat_count).then(a.mdn.cmp(&b.mdn)));

    report.top_repeaters = report.repeaters.iter().take(TOP_N).cloned().collect();

    Ok(report)
}

/// Most frequent value in `values`, ties broken ascending so the result is
/// deterministic.
fn modal<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for v in values.filter(|v| !v.is_empty()) {
        *counts.entry(v).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(a.0)))
        .map(|(v, _)| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(sr: &str, mdn: &str, region: &str, sub_type: &str, ts: chrono::NaiveDateTime) -> ComplaintRaw {
        ComplaintRaw {
            sr_number: sr.to_string(),
            sr_row_id: None,
            mdn: Some(mdn.to_string()),
            open_ts: ts,
            close_ts: None,
            open_date: ts.date(),
            sr_type: Some("Billing".to_string()),
            sr_sub_type: Some(sub_type.to_string()),
            sr_status: Some("Open".to_string()),
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
        }
    }

    #[test]
    fn classifies_and_breaks_down_repeaters() {
        let store = Store::open_in_memory().unwrap();
        let d = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let ts = d.and_hms_opt(9, 0, 0).unwrap();

        let mut rows = Vec::new();
        for i in 0..8 {
            rows.push(row(&format!("R-{i}"), "0300-1111111", "Karachi", "Disputed Bill", ts));
        }
        rows.push(row("R-single", "0300-2222222", "Lahore", "Network Down", ts));
        store.upsert_complaints(&rows).unwrap();

        let report = report_for(&store, d).unwrap();
        assert_eq!(report.repeaters.len(), 1);
        let repeater = &report.repeaters[0];
        assert_eq!(repeater.mdn, "0300-1111111");
        assert_eq!(repeater.repeat_count, 8);
        assert_eq!(repeater.severity, RepeatSeverity::Critical);
        assert_eq!(report.by_region.get("Karachi"), Some(&1));
    }

    #[test]
    fn single_occurrence_mdn_is_not_a_repeater() {
        let store = Store::open_in_memory().unwrap();
        let d = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let ts = d.and_hms_opt(9, 0, 0).unwrap();
        store
            .upsert_complaints(&[row("R-1", "0300-3333333", "Karachi", "Billing", ts)])
            .unwrap();

        let report = report_for(&store, d).unwrap();
        assert!(report.repeaters.is_empty());
    }
}
