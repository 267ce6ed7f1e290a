use chrono::NaiveDate;
use rusqlite::params;

use crate::error::Result;
use crate::models::resolution::{AgingSlab, DailyAging, DailyMttr, ResolutionDimension};

use super::Store;

impl Store {
    /// Delete-then-insert for both `daily_mttr` and `daily_aging` on `date`, in one
    /// transaction (§4.12 idempotency: "delete existing MTTR/aging rows for D").
    pub fn replace_resolution_for_date(
        &self,
        date: NaiveDate,
        mttr: &[DailyMttr],
        aging: &[DailyAging],
    ) -> Result<()> {
        self.with_transaction(|conn| {
            conn.execute(
                "DELETE FROM daily_mttr WHERE mttr_date = ?1",
                params![date.to_string()],
            )?;
            conn.execute(
                "DELETE FROM daily_aging WHERE aging_date = ?1",
                params![date.to_string()],
            )?;
            {
                let mut stmt = conn.prepare_cached(
                    "INSERT INTO daily_mttr (
                        mttr_date, dimension, dimension_key, avg_mttr_hours, total_resolved_count
                    ) VALUES (?1, ?2, ?3, ?4, ?5)",
                )?;
                for m in mttr {
                    stmt.execute(params![
                        m.mttr_date.to_string(),
                        m.dimension.as_str(),
                        m.dimension_key,
                        m.avg_mttr_hours,
                        m.total_resolved_count,
                    ])?;
                }
            }
            {
                let mut stmt = conn.prepare_cached(
                    "INSERT INTO daily_aging (
                        aging_date, dimension, dimension_key, slab, count
                    ) VALUES (?1, ?2, ?3, ?4, ?5)",
                )?;
                for a in aging {
                    stmt.execute(params![
                        a.aging_date.to_string(),
                        a.dimension.as_str(),
                        a.dimension_key,
                        a.slab.as_str(),
                        a.count,
                    ])?;
                }
            }
            Ok(())
        })
    }

    pub fn mttr_for_date(&self, date: NaiveDate) -> Result<Vec<DailyMttr>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, mttr_date, dimension, dimension_key, avg_mttr_hours, total_resolved_count \
             FROM daily_mttr WHERE mttr_date = ?1",
        )?;
        let rows = stmt
            .query_map(params![date.to_string()], |row| {
                let date: String = row.get(1)?;
                let dim: String = row.get(2)?;
                Ok(DailyMttr {
                    id: row.get(0)?,
                    mttr_date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").unwrap_or_default(),
                    dimension: ResolutionDimension::from_str_opt(&dim)
                        .unwrap_or(ResolutionDimension::Total),
                    dimension_key: row.get(3)?,
                    avg_mttr_hours: row.get(4)?,
                    total_resolved_count: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn aging_for_date(&self, date: NaiveDate) -> Result<Vec<DailyAging>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, aging_date, dimension, dimension_key, slab, count \
             FROM daily_aging WHERE aging_date = ?1",
        )?;
        let rows = stmt
            .query_map(params![date.to_string()], |row| {
                let date: String = row.get(1)?;
                let dim: String = row.get(2)?;
                let slab: String = row.get(4)?;
                Ok(DailyAging {
                    id: row.get(0)?,
                    aging_date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").unwrap_or_default(),
                    dimension: ResolutionDimension::from_str_opt(&dim)
                        .unwrap_or(ResolutionDimension::Total),
                    dimension_key: row.get(3)?,
                    slab: AgingSlab::from_str_opt(&slab).unwrap_or(AgingSlab::Over24h),
                    count: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}
