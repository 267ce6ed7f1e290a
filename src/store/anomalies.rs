use chrono::NaiveDate;
use rusqlite::params;

use crate::dimension::Dimension;
use crate::error::Result;
use crate::models::anomaly::{DailyAnomaly, Severity};

use super::Store;

impl Store {
    /// Delete-then-insert for `anomaly_date = date` (§4.3 idempotency), one
    /// transaction.
    pub fn replace_anomalies_for_date(
        &self,
        date: NaiveDate,
        anomalies: &[DailyAnomaly],
    ) -> Result<()> {
        self.with_transaction(|conn| {
            conn.execute(
                "DELETE FROM daily_anomalies WHERE anomaly_date = ?1",
                params![date.to_string()],
            )?;
            let mut stmt = conn.prepare_cached(
                "INSERT INTO daily_anomalies (
                    anomaly_date, dimension, dimension_key, metric_value,
                    baseline_avg, baseline_std, z_score, severity, rca_context
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for a in anomalies {
                stmt.execute(params![
                    a.anomaly_date.to_string(),
                    a.dimension.as_str(),
                    a.dimension_key,
                    a.metric_value,
                    a.baseline_avg,
                    a.baseline_std,
                    a.z_score,
                    a.severity.as_str(),
                    a.rca_context,
                ])?;
            }
            Ok(())
        })
    }

    /// Apply in-place `rca_context`/`severity` updates produced by Correlation, RCA,
    /// and Severity (§4.6/§4.7/§4.8 only augment; they never delete or insert rows).
    pub fn update_anomaly_context_and_severity(&self, anomalies: &[DailyAnomaly]) -> Result<()> {
        self.with_transaction(|conn| {
            let mut stmt = conn.prepare_cached(
                "UPDATE daily_anomalies SET rca_context = ?1, severity = ?2 \
                 WHERE anomaly_date = ?3 AND dimension = ?4 AND dimension_key = ?5",
            )?;
            for a in anomalies {
                stmt.execute(params![
                    a.rca_context,
                    a.severity.as_str(),
                    a.anomaly_date.to_string(),
                    a.dimension.as_str(),
                    a.dimension_key,
                ])?;
            }
            Ok(())
        })
    }

    pub fn anomalies_for_date(&self, date: NaiveDate) -> Result<Vec<DailyAnomaly>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, anomaly_date, dimension, dimension_key, metric_value, \
             baseline_avg, baseline_std, z_score, severity, rca_context \
             FROM daily_anomalies WHERE anomaly_date = ?1",
        )?;
        let rows = stmt
            .query_map(params![date.to_string()], row_to_anomaly)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Existing anomalies for `(dimension, dimension_key)` on a specific date — used
    /// by Severity's persistence check (§4.8: "existed on D-1").
    pub fn anomaly_exists(&self, date: NaiveDate, dimension: Dimension, key: &str) -> Result<bool> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM daily_anomalies \
             WHERE anomaly_date = ?1 AND dimension = ?2 AND dimension_key = ?3",
            params![date.to_string(), dimension.as_str(), key],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Count of Region-dimension anomalies on a date — Severity's spread check.
    pub fn region_anomaly_count(&self, date: NaiveDate) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM daily_anomalies WHERE anomaly_date = ?1 AND dimension = ?2",
            params![date.to_string(), Dimension::Region.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn row_to_anomaly(row: &rusqlite::Row) -> rusqlite::Result<DailyAnomaly> {
    let date: String = row.get(1)?;
    let dim: String = row.get(2)?;
    let sev: String = row.get(8)?;
    Ok(DailyAnomaly {
        id: row.get(0)?,
        anomaly_date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").unwrap_or_default(),
        dimension: Dimension::from_str_opt(&dim).unwrap_or(Dimension::Type),
        dimension_key: row.get(3)?,
        metric_value: row.get(4)?,
        baseline_avg: row.get(5)?,
        baseline_std: row.get(6)?,
        z_score: row.get(7)?,
        severity: Severity::from_str_opt(&sev).unwrap_or(Severity::Info),
        rca_context: row.get(9)?,
    })
}
