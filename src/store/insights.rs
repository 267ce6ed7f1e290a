use chrono::NaiveDate;
use rusqlite::params;

use crate::error::Result;
use crate::models::anomaly::Severity;
use crate::models::insight::ExecInsight;

use super::Store;

impl Store {
    /// Delete-then-insert scoped to `(date(created_at), title)` before each insert
    /// (§9 Open Question 2: the original has no delete here at all and duplicates
    /// insights on re-run; this is the fix). Scoped per title rather than a blanket
    /// per-date delete because Narrator only ever (re-)emits the titles for the
    /// anomalies it was just handed, not every insight ever recorded for the date.
    pub fn replace_insights_for_date(&self, date: NaiveDate, insights: &[ExecInsight]) -> Result<()> {
        self.with_transaction(|conn| {
            let mut delete_stmt = conn.prepare_cached(
                "DELETE FROM exec_insights WHERE date(created_at) = ?1 AND title = ?2",
            )?;
            let mut insert_stmt = conn.prepare_cached(
                "INSERT INTO exec_insights (created_at, title, summary, severity) \
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for insight in insights {
                delete_stmt.execute(params![date.to_string(), insight.title])?;
                insert_stmt.execute(params![
                    insight.created_at.to_string(),
                    insight.title,
                    insight.summary,
                    insight.severity.as_str(),
                ])?;
            }
            Ok(())
        })
    }

    pub fn insights_for_date(&self, date: NaiveDate) -> Result<Vec<ExecInsight>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, created_at, title, summary, severity FROM exec_insights \
             WHERE date(created_at) = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map(params![date.to_string()], |row| {
                let created_at: String = row.get(1)?;
                let severity: String = row.get(4)?;
                Ok(ExecInsight {
                    id: row.get(0)?,
                    created_at: chrono::NaiveDateTime::parse_from_str(
                        &created_at,
                        "%Y-%m-%d %H:%M:%S",
                    )
                    .unwrap_or_default(),
                    title: row.get(2)?,
                    summary: row.get(3)?,
                    severity: Severity::from_str_opt(&severity).unwrap_or(Severity::Info),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}
