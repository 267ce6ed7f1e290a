use std::collections::HashMap;

use chrono::NaiveDate;

use crate::dimension::Dimension;
use crate::error::Result;
use crate::models::anomaly::DailyAnomaly;
use crate::store::Store;

use super::StageResult;

const TOP_N: usize = 3;

/// Probability-weighted top RCA values per anomaly scope (§4.7). Only dimensions in
/// `Dimension::RCA_APPLICABLE` get an RCA pass — an RCA-dimension anomaly asking "what
/// caused this RCA spike" would be circular. Grounded on
/// `original_source/agents/rca_agent.py`, with the City mapping added (absent from the
/// original, per the canonical five-dimension set §9 resolves).
pub fn run(store: &Store, target_date: NaiveDate) -> Result<StageResult> {
    let anomalies = store.anomalies_for_date(target_date)?;
    if anomalies.is_empty() {
        return Ok(StageResult::success("rca").with_count("annotated", 0));
    }

    let rows = store.rows_on_date(target_date)?;
    let mut updated: Vec<DailyAnomaly> = Vec::new();

    for mut anomaly in anomalies {
        if !Dimension::RCA_APPLICABLE.contains(&anomaly.dimension) {
            continue;
        }

        let scoped_rows: Vec<&crate::models::complaint::ComplaintRaw> = rows
            .iter()
            .filter(|r| anomaly.dimension.column(r) == Some(anomaly.dimension_key.as_str()))
            .collect();

        if scoped_rows.is_empty() {
            continue;
        }

        // Percent of the scope's total row count (§4.7), not of the rows that happen
        // to carry an `rca` value — rows with a null/empty `rca` still count toward
        // the denominator, same as `rca_agent.py`'s `total = len(df)`.
        let total = scoped_rows.len() as f64;
        let scoped_rca: Vec<&str> = scoped_rows
            .iter()
            .filter_map(|r| r.rca.as_deref())
            .filter(|rca| !rca.is_empty())
            .collect();

        if scoped_rca.is_empty() {
            continue;
        }

        let mut counts: HashMap<&str, i64> = HashMap::new();
        for rca in &scoped_rca {
            *counts.entry(rca).or_insert(0) += 1;
        }

        let mut ranked: Vec<(&str, i64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        ranked.truncate(TOP_N);

        let text = ranked
            .iter()
            .map(|(value, count)| {
                let pct = *count as f64 / total * 100.0;
                format!("{value} ({pct:.1}%)")
            })
            .collect::<Vec<_>>()
            .join(", ");

        anomaly.append_context(&format!("Probable RCA: {text}"));
        updated.push(anomaly);
    }

    store.update_anomaly_context_and_severity(&updated)?;
    tracing::info!(count = updated.len(), "rca: stage complete");

    Ok(StageResult::success("rca").with_count("annotated", updated.len() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::complaint::ComplaintRaw;
    use chrono::NaiveDateTime;

    fn row(sr: &str, region: &str, rca: &str, ts: NaiveDateTime) -> ComplaintRaw {
        ComplaintRaw {
            sr_number: sr.to_string(),
            sr_row_id: None,
            mdn: None,
            open_ts: ts,
            close_ts: None,
            open_date: ts.date(),
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
            rca: Some(rca.to_string()),
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
    fn ranks_rca_values_by_frequency_within_scope() {
        let store = Store::open_in_memory().unwrap();
        let d = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let ts = d.and_hms_opt(9, 0, 0).unwrap();
        let rows = vec![
            row("A", "Karachi", "Fiber Cut", ts),
            row("B", "Karachi", "Fiber Cut", ts),
            row("C", "Karachi", "Power Outage", ts),
            row("D", "Lahore", "Congestion", ts),
        ];
        store.upsert_complaints(&rows).unwrap();

        let anomaly = DailyAnomaly {
            id: None,
            anomaly_date: d,
            dimension: Dimension::Region,
            dimension_key: "Karachi".to_string(),
            metric_value: 3,
            baseline_avg: 1.0,
            baseline_std: 0.5,
            z_score: 4.0,
            severity: crate::models::anomaly::Severity::Critical,
            rca_context: None,
        };
        store.replace_anomalies_for_date(d, &[anomaly]).unwrap();

        run(&store, d).unwrap();

        let after = store.anomalies_for_date(d).unwrap();
        let text = after[0].rca_context.as_deref().unwrap();
        assert!(text.starts_with("Probable RCA: Fiber Cut (66.7%)"));
    }
}
