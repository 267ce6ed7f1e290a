use std::collections::HashMap;

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::complaint::ComplaintRaw;
use crate::models::resolution::{AgingSlab, DailyAging, DailyMttr, ResolutionDimension};
use crate::store::Store;

use super::StageResult;

const MIN_RESOLUTION_SECONDS: i64 = 300;

/// MTTR + aging slabs (§4.12). Delete-then-insert for both `daily_mttr` and
/// `daily_aging` on `D` (`store::replace_resolution_for_date`).
pub fn run(store: &Store, target_date: NaiveDate) -> Result<StageResult> {
    let mttr = mttr_for_date(store, target_date)?;
    let aging = aging_as_of(store, target_date)?;

    let mttr_count = mttr.len();
    let aging_count = aging.len();
    store.replace_resolution_for_date(target_date, &mttr, &aging)?;

    tracing::info!(mttr = mttr_count, aging = aging_count, "resolution: stage complete");

    Ok(StageResult::success("resolution")
        .with_count("mttr_rows", mttr_count as i64)
        .with_count("aging_rows", aging_count as i64))
}

fn mttr_for_date(store: &Store, target_date: NaiveDate) -> Result<Vec<DailyMttr>> {
    let rows = store.closed_rows_on_date(target_date)?;

    let resolved: Vec<&ComplaintRaw> = rows
        .iter()
        .filter(|r| {
            r.close_ts
                .map(|close| (close - r.open_ts).num_seconds() >= MIN_RESOLUTION_SECONDS)
                .unwrap_or(false)
        })
        .collect();

    let mut out = Vec::new();
    out.extend(mttr_for_scope(&resolved, ResolutionDimension::Total, target_date, |_| {
        Some("Total")
    }));
    out.extend(mttr_for_scope(&resolved, ResolutionDimension::Region, target_date, |r| {
        r.region.as_deref()
    }));
    out.extend(mttr_for_scope(&resolved, ResolutionDimension::Exchange, target_date, |r| {
        r.exc_id.as_deref()
    }));
    out.extend(mttr_for_scope(&resolved, ResolutionDimension::City, target_date, |r| {
        r.city.as_deref()
    }));
    Ok(out)
}

fn mttr_for_scope<'a>(
    rows: &[&'a ComplaintRaw],
    dimension: ResolutionDimension,
    target_date: NaiveDate,
    key_of: impl Fn(&'a ComplaintRaw) -> Option<&'a str>,
) -> Vec<DailyMttr> {
    let mut by_key: HashMap<&str, Vec<f64>> = HashMap::new();
    for row in rows {
        let Some(key) = key_of(row).filter(|k| !k.is_empty()) else {
            continue;
        };
        let close = row.close_ts.expect("filtered to resolved rows with close_ts");
        let hours = (close - row.open_ts).num_seconds() as f64 / 3600.0;
        by_key.entry(key).or_default().push(hours);
    }

    by_key
        .into_iter()
        .map(|(key, durations)| DailyMttr {
            id: None,
            mttr_date: target_date,
            dimension,
            dimension_key: key.to_string(),
            avg_mttr_hours: crate::stats::mean(&durations),
            total_resolved_count: durations.len() as i64,
        })
        .collect()
}

fn aging_as_of(store: &Store, target_date: NaiveDate) -> Result<Vec<DailyAging>> {
    let rows = store.open_rows_as_of(target_date)?;
    let end_of_day = target_date
        .and_hms_opt(23, 59, 59)
        .expect("end of day is always valid");

    let mut out = Vec::new();
    out.extend(aging_for_scope(&rows, ResolutionDimension::Total, target_date, end_of_day, |_| {
        Some("Total")
    }));
    out.extend(aging_for_scope(
        &rows,
        ResolutionDimension::Region,
        target_date,
        end_of_day,
        |r| r.region.as_deref(),
    ));
    out.extend(aging_for_scope(
        &rows,
        ResolutionDimension::Exchange,
        target_date,
        end_of_day,
        |r| r.exc_id.as_deref(),
    ));
    out.extend(aging_for_scope(
        &rows,
        ResolutionDimension::City,
        target_date,
        end_of_day,
        |r| r.city.as_deref(),
    ));
    Ok(out)
}

fn aging_for_scope<'a>(
    rows: &'a [ComplaintRaw],
    dimension: ResolutionDimension,
    target_date: NaiveDate,
    end_of_day: chrono::NaiveDateTime,
    key_of: impl Fn(&'a ComplaintRaw) -> Option<&'a str>,
) -> Vec<DailyAging> {
    let mut by_key_slab: HashMap<(&str, AgingSlab), i64> = HashMap::new();
    for row in rows {
        let Some(key) = key_of(row).filter(|k| !k.is_empty()) else {
            continue;
        };
        let age_hours = (end_of_day - row.open_ts).num_seconds() as f64 / 3600.0;
        let Some(slab) = AgingSlab::classify(age_hours) else {
            continue;
        };
        *by_key_slab.entry((key, slab)).or_insert(0) += 1;
    }

    by_key_slab
        .into_iter()
        .map(|((key, slab), count)| DailyAging {
            id: None,
            aging_date: target_date,
            dimension,
            dimension_key: key.to_string(),
            slab,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::complaint::ComplaintRaw;
    use chrono::Duration;

    fn base_row(sr: &str, region: &str, open_ts: chrono::NaiveDateTime) -> ComplaintRaw {
        ComplaintRaw {
            sr_number: sr.to_string(),
            sr_row_id: None,
            mdn: None,
            open_ts,
            close_ts: None,
            open_date: open_ts.date(),
            sr_type: Some("Billing".to_string()),
            sr_sub_type: None,
            sr_status: Some("Open".to_string()),
            sr_sub_status: None,
            region: Some(region.to_string()),
            city: None,
            exc_id: Some("EXC1".to_string()),
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
    fn mttr_excludes_resolutions_under_five_minutes() {
        let store = Store::open_in_memory().unwrap();
        let d = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let open = d.and_hms_opt(8, 0, 0).unwrap();

        let mut slow = base_row("A", "Karachi", open);
        slow.close_ts = Some(open + Duration::hours(2));
        let mut fast = base_row("B", "Karachi", open);
        fast.close_ts = Some(open + Duration::seconds(60));

        store.upsert_complaints(&[slow, fast]).unwrap();

        let mttr = mttr_for_date(&store, d).unwrap();
        let total = mttr.iter().find(|m| m.dimension == ResolutionDimension::Total).unwrap();
        assert_eq!(total.total_resolved_count, 1);
        assert!((total.avg_mttr_hours - 2.0).abs() < 1e-9);
    }

    #[test]
    fn aging_buckets_open_rows_into_largest_satisfied_slab() {
        let store = Store::open_in_memory().unwrap();
        let d = NaiveDate::from_ymd_opt(2024, 7, 10).unwrap();
        let stale = base_row("A", "Karachi", (d - Duration::days(40)).and_hms_opt(8, 0, 0).unwrap());
        store.upsert_complaints(&[stale]).unwrap();

        let aging = aging_as_of(&store, d).unwrap();
        let total: Vec<_> = aging.iter().filter(|a| a.dimension == ResolutionDimension::Total).collect();
        assert_eq!(total.len(), 1);
        assert_eq!(total[0].slab, AgingSlab::Over30d);
    }
}
