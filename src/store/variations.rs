use chrono::NaiveDate;
use rusqlite::params;

use crate::dimension::Dimension;
use crate::error::Result;
use crate::models::variation::{DailyVariation, VariationType};

use super::Store;

impl Store {
    /// Delete-then-insert for `variation_date = date` (§4.5 idempotency).
    pub fn replace_variations_for_date(
        &self,
        date: NaiveDate,
        variations: &[DailyVariation],
    ) -> Result<()> {
        self.with_transaction(|conn| {
            conn.execute(
                "DELETE FROM daily_variations WHERE variation_date = ?1",
                params![date.to_string()],
            )?;
            let mut stmt = conn.prepare_cached(
                "INSERT INTO daily_variations (
                    variation_date, dimension, dimension_key, variation_type,
                    current_value, previous_value, variation_percent, is_significant
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for v in variations {
                stmt.execute(params![
                    v.variation_date.to_string(),
                    v.dimension.as_str(),
                    v.dimension_key,
                    v.variation_type.as_str(),
                    v.current_value,
                    v.previous_value,
                    v.variation_percent,
                    v.is_significant as i64,
                ])?;
            }
            Ok(())
        })
    }

    pub fn variations_for_date(&self, date: NaiveDate) -> Result<Vec<DailyVariation>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, variation_date, dimension, dimension_key, variation_type, \
             current_value, previous_value, variation_percent, is_significant \
             FROM daily_variations WHERE variation_date = ?1",
        )?;
        let rows = stmt
            .query_map(params![date.to_string()], |row| {
                let date: String = row.get(1)?;
                let dim: String = row.get(2)?;
                let vtype: String = row.get(4)?;
                let sig: i64 = row.get(8)?;
                Ok(DailyVariation {
                    id: row.get(0)?,
                    variation_date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                        .unwrap_or_default(),
                    dimension: Dimension::from_str_opt(&dim).unwrap_or(Dimension::Type),
                    dimension_key: row.get(3)?,
                    variation_type: VariationType::from_str_opt(&vtype)
                        .unwrap_or(VariationType::Dod),
                    current_value: row.get(5)?,
                    previous_value: row.get(6)?,
                    variation_percent: row.get(7)?,
                    is_significant: sig != 0,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}
