use chrono::NaiveDate;
use rusqlite::params;

use crate::error::Result;

use super::Store;

/// Read-mostly count queries backing the Surge stage (§4.10). Surge highlights are
/// not a persisted table (§6 names none), so this module is query-only — no
/// delete-then-insert here.
impl Store {
    pub fn total_count_on_date(&self, date: NaiveDate) -> Result<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM complaints_raw WHERE open_date = ?1",
            params![date.to_string()],
            |row| row.get(0),
        )?)
    }

    pub fn total_count_range(&self, start: NaiveDate, end: NaiveDate) -> Result<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM complaints_raw WHERE open_date >= ?1 AND open_date <= ?2",
            params![start.to_string(), end.to_string()],
            |row| row.get(0),
        )?)
    }

    pub fn region_counts_on_date(&self, date: NaiveDate) -> Result<Vec<(String, i64)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT region, COUNT(*) FROM complaints_raw \
             WHERE open_date = ?1 AND region IS NOT NULL AND region != '' \
             GROUP BY region",
        )?;
        let rows = stmt
            .query_map(params![date.to_string()], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn region_count_range(&self, region: &str, start: NaiveDate, end: NaiveDate) -> Result<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM complaints_raw \
             WHERE region = ?1 AND open_date >= ?2 AND open_date <= ?3",
            params![region, start.to_string(), end.to_string()],
            |row| row.get(0),
        )?)
    }

    pub fn region_exchange_counts_on_date(&self, date: NaiveDate) -> Result<Vec<(String, String, i64)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT region, exc_id, COUNT(*) FROM complaints_raw \
             WHERE open_date = ?1 AND region IS NOT NULL AND region != '' \
             AND exc_id IS NOT NULL AND exc_id != '' \
             GROUP BY region, exc_id",
        )?;
        let rows = stmt
            .query_map(params![date.to_string()], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn region_exchange_count_range(
        &self,
        region: &str,
        exchange: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM complaints_raw \
             WHERE region = ?1 AND exc_id = ?2 AND open_date >= ?3 AND open_date <= ?4",
            params![region, exchange, start.to_string(), end.to_string()],
            |row| row.get(0),
        )?)
    }

    pub fn region_exchange_city_counts_on_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<(String, String, String, i64)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT region, exc_id, city, COUNT(*) FROM complaints_raw \
             WHERE open_date = ?1 AND region IS NOT NULL AND region != '' \
             AND exc_id IS NOT NULL AND exc_id != '' \
             AND city IS NOT NULL AND city != '' \
             GROUP BY region, exc_id, city",
        )?;
        let rows = stmt
            .query_map(params![date.to_string()], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn region_exchange_city_count_range(
        &self,
        region: &str,
        exchange: &str,
        city: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM complaints_raw \
             WHERE region = ?1 AND exc_id = ?2 AND city = ?3 \
             AND open_date >= ?4 AND open_date <= ?5",
            params![region, exchange, city, start.to_string(), end.to_string()],
            |row| row.get(0),
        )?)
    }
}
