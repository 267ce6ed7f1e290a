use chrono::NaiveDate;
use rusqlite::params;

use crate::dimension::Dimension;
use crate::error::Result;
use crate::models::trend::{DailyTrend, TrendDirection};

use super::Store;

impl Store {
    /// Delete-then-insert for `trend_date = date` (§4.4 idempotency).
    pub fn replace_trends_for_date(&self, date: NaiveDate, trends: &[DailyTrend]) -> Result<()> {
        self.with_transaction(|conn| {
            conn.execute(
                "DELETE FROM daily_trends WHERE trend_date = ?1",
                params![date.to_string()],
            )?;
            let mut stmt = conn.prepare_cached(
                "INSERT INTO daily_trends (
                    trend_date, dimension, dimension_key, window_days, metric_value,
                    trend_direction, trend_strength, significance
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for t in trends {
                stmt.execute(params![
                    t.trend_date.to_string(),
                    t.dimension.as_str(),
                    t.dimension_key,
                    t.window_days,
                    t.metric_value,
                    t.trend_direction.as_str(),
                    t.trend_strength,
                    t.significance,
                ])?;
            }
            Ok(())
        })
    }

    pub fn trends_for_date(&self, date: NaiveDate) -> Result<Vec<DailyTrend>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, trend_date, dimension, dimension_key, window_days, \
             metric_value, trend_direction, trend_strength, significance \
             FROM daily_trends WHERE trend_date = ?1",
        )?;
        let rows = stmt
            .query_map(params![date.to_string()], |row| {
                let date: String = row.get(1)?;
                let dim: String = row.get(2)?;
                let direction: String = row.get(6)?;
                Ok(DailyTrend {
                    id: row.get(0)?,
                    trend_date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").unwrap_or_default(),
                    dimension: Dimension::from_str_opt(&dim).unwrap_or(Dimension::Type),
                    dimension_key: row.get(3)?,
                    window_days: row.get(4)?,
                    metric_value: row.get(5)?,
                    trend_direction: TrendDirection::from_str_opt(&direction)
                        .unwrap_or(TrendDirection::Stable),
                    trend_strength: row.get(7)?,
                    significance: row.get(8)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}
