use chrono::{Datelike, Duration, NaiveDate};

use crate::config::PulseConfig;
use crate::error::Result;
use crate::models::surge::{SurgeHighlight, SurgeLevel, SurgeSeverity};
use crate::store::Store;

use super::StageResult;

const INFINITE_PCT: f64 = 999.9;

/// MTD/last-week surge detector across four scope levels (§4.10). Read-mostly: no
/// table to delete-then-insert into (§6 names no `daily_surges` table), so this
/// stage is a pure query function the Orchestrator and a UI caller can both invoke.
pub fn run(store: &Store, config: &PulseConfig, target_date: NaiveDate) -> Result<(StageResult, Vec<SurgeHighlight>)> {
    let highlights = highlights_for(store, config, target_date)?;
    let result = StageResult::success("surge").with_count("surges", highlights.len() as i64);
    tracing::info!(count = highlights.len(), "surge: stage complete");
    Ok((result, highlights))
}

pub fn highlights_for(
    store: &Store,
    config: &PulseConfig,
    target_date: NaiveDate,
) -> Result<Vec<SurgeHighlight>> {
    let month_start = target_date.with_day(1).unwrap();
    let mtd_end = target_date - Duration::days(1);
    let mtd_days = (mtd_end - month_start).num_days() + 1;
    let last_week_date = target_date - Duration::days(7);

    let mut out = Vec::new();

    // Total.
    {
        let current = store.total_count_on_date(target_date)?;
        let mtd_total = if mtd_days > 0 {
            store.total_count_range(month_start, mtd_end)?
        } else {
            0
        };
        let mtd_avg = if mtd_days > 0 { mtd_total as f64 / mtd_days as f64 } else { 0.0 };
        let last_week = store.total_count_on_date(last_week_date)?;
        push_candidate(
            &mut out,
            config,
            SurgeLevel::Total,
            None,
            None,
            None,
            current,
            mtd_avg,
            last_week,
        );
    }

    // Region.
    for (region, current) in store.region_counts_on_date(target_date)? {
        let mtd_total = if mtd_days > 0 {
            store.region_count_range(&region, month_start, mtd_end)?
        } else {
            0
        };
        let mtd_avg = if mtd_days > 0 { mtd_total as f64 / mtd_days as f64 } else { 0.0 };
        let last_week = store.region_count_range(&region, last_week_date, last_week_date)?;
        push_candidate(
            &mut out,
            config,
            SurgeLevel::Region,
            Some(region),
            None,
            None,
            current,
            mtd_avg,
            last_week,
        );
    }

    // Region + Exchange.
    for (region, exchange, current) in store.region_exchange_counts_on_date(target_date)? {
        let mtd_total = if mtd_days > 0 {
            store.region_exchange_count_range(&region, &exchange, month_start, mtd_end)?
        } else {
            0
        };
        let mtd_avg = if mtd_days > 0 { mtd_total as f64 / mtd_days as f64 } else { 0.0 };
        let last_week =
            store.region_exchange_count_range(&region, &exchange, last_week_date, last_week_date)?;
        push_candidate(
            &mut out,
            config,
            SurgeLevel::RegionExchange,
            Some(region),
            Some(exchange),
            None,
            current,
            mtd_avg,
            last_week,
        );
    }

    // Region + Exchange + City.
    for (region, exchange, city, current) in store.region_exchange_city_counts_on_date(target_date)? {
        let mtd_total = if mtd_days > 0 {
            store.region_exchange_city_count_range(&region, &exchange, &city, month_start, mtd_end)?
        } else {
            0
        };
        let mtd_avg = if mtd_days > 0 { mtd_total as f64 / mtd_days as f64 } else { 0.0 };
        let last_week = store.region_exchange_city_count_range(
            &region,
            &exchange,
            &city,
            last_week_date,
            last_week_date,
        )?;
        push_candidate(
            &mut out,
            config,
            SurgeLevel::RegionExchangeCity,
            Some(region),
            Some(exchange),
            Some(city),
            current,
            mtd_avg,
            last_week,
        );
    }

    Ok(out)
}

#[allow(clippy::too_many_arguments)]
fn push_candidate(
    out: &mut Vec<SurgeHighlight>,
    config: &PulseConfig,
    level: SurgeLevel,
    region: Option<String>,
    exchange: Option<String>,
    city: Option<String>,
    current: i64,
    mtd_avg: f64,
    last_week: i64,
) {
    if let Some(floor) = level.floor() {
        if current < floor {
            return;
        }
    }

    let pct_mtd = percent_change(current as f64, mtd_avg);
    let pct_wow = percent_change(current as f64, last_week as f64);
    let max_pct = pct_mtd.max(pct_wow);

    if max_pct < config.surge_alarming {
        return;
    }

    let severity = if max_pct >= config.surge_critical {
        SurgeSeverity::Critical
    } else {
        SurgeSeverity::Alarming
    };

    out.push(SurgeHighlight {
        level,
        region,
        exchange,
        city,
        current,
        mtd_avg,
        last_week,
        pct_mtd,
        pct_wow,
        max_pct,
        severity,
    });
}

fn percent_change(current: f64, baseline: f64) -> f64 {
    if baseline == 0.0 {
        if current > 0.0 {
            INFINITE_PCT
        } else {
            0.0
        }
    } else {
        (current - baseline) / baseline * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::complaint::ComplaintRaw;
    use chrono::NaiveDateTime;

    fn row(sr: &str, region: &str, ts: NaiveDateTime) -> ComplaintRaw {
        ComplaintRaw {
            sr_number: sr.to_string(),
            sr_row_id: None,
            mdn: None,
            open_ts: ts,
            close_ts: None,
            open_date: ts.date(),
            sr_type: Some("Network".to_string()),
            sr_sub_type: None,
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
    fn region_floor_suppresses_low_count_surge() {
        let store = Store::open_in_memory().unwrap();
        let config = PulseConfig::default();
        let d = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();

        let mut rows = Vec::new();
        for i in 0..10 {
            rows.push(row(&format!("FATA-{i}"), "FATA", d.and_hms_opt(9, 0, 0).unwrap()));
        }
        for i in 0..2 {
            rows.push(row(
                &format!("FATA-mtd-{i}"),
                "FATA",
                month_day(d, 2).and_hms_opt(9, 0, 0).unwrap(),
            ));
        }
        store.upsert_complaints(&rows).unwrap();

        let highlights = highlights_for(&store, &config, d).unwrap();
        assert!(!highlights.iter().any(|h| h.region.as_deref() == Some("FATA")));
    }

    fn month_day(d: NaiveDate, day: u32) -> NaiveDate {
        d.with_day(day).unwrap()
    }
}
