use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::dimension::Dimension;
use crate::error::Result;
use crate::models::complaint::ComplaintRaw;

use super::Store;

impl Store {
    /// Upsert a batch of rows keyed on `sr_number`, one transaction for the whole
    /// file (§4.1 "atomic per file"). Canonical dialect upsert (§9 Open Question 1):
    /// `ON CONFLICT ... DO UPDATE`, not insert-ignore.
    pub fn upsert_complaints(&self, rows: &[ComplaintRaw]) -> Result<usize> {
        self.with_transaction(|conn| {
            let mut stmt = conn.prepare_cached(
                "INSERT INTO complaints_raw (
                    sr_number, sr_row_id, mdn, open_ts, close_ts, open_date,
                    sr_type, sr_sub_type, sr_status, sr_sub_status, region, city,
                    exc_id, cabinet_id, dp_id, switch_id, rca, desc_text, priority,
                    product, sub_product, cust_seg, service_type, sr_duration
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                    ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24
                )
                ON CONFLICT(sr_number) DO UPDATE SET
                    sr_row_id = excluded.sr_row_id,
                    mdn = excluded.mdn,
                    open_ts = excluded.open_ts,
                    close_ts = excluded.close_ts,
                    open_date = excluded.open_date,
                    sr_type = excluded.sr_type,
                    sr_sub_type = excluded.sr_sub_type,
                    sr_status = excluded.sr_status,
                    sr_sub_status = excluded.sr_sub_status,
                    region = excluded.region,
                    city = excluded.city,
                    exc_id = excluded.exc_id,
                    cabinet_id = excluded.cabinet_id,
                    dp_id = excluded.dp_id,
                    switch_id = excluded.switch_id,
                    rca = excluded.rca,
                    desc_text = excluded.desc_text,
                    priority = excluded.priority,
                    product = excluded.product,
                    sub_product = excluded.sub_product,
                    cust_seg = excluded.cust_seg,
                    service_type = excluded.service_type,
                    sr_duration = excluded.sr_duration",
            )?;

            for row in rows {
                stmt.execute(params![
                    row.sr_number,
                    row.sr_row_id,
                    row.mdn,
                    row.open_ts.to_string(),
                    row.close_ts.map(|t| t.to_string()),
                    row.open_date.to_string(),
                    row.sr_type,
                    row.sr_sub_type,
                    row.sr_status,
                    row.sr_sub_status,
                    row.region,
                    row.city,
                    row.exc_id,
                    row.cabinet_id,
                    row.dp_id,
                    row.switch_id,
                    row.rca,
                    row.desc_text,
                    row.priority,
                    row.product,
                    row.sub_product,
                    row.cust_seg,
                    row.service_type,
                    row.sr_duration,
                ])?;
            }
            Ok(rows.len())
        })
    }

    pub fn count_all_complaints(&self) -> Result<i64> {
        let conn = self.conn()?;
        count_all(&conn)
    }

    /// `daily_count(k, d)` per spec §4.2: rows of `dimension` grouped by key, for
    /// `open_date` in `[start, end]` inclusive.
    pub fn daily_counts_by_dimension(
        &self,
        dimension: Dimension,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(String, NaiveDate, i64)>> {
        let conn = self.conn()?;
        let col = dimension.sql_column();
        let sql = format!(
            "SELECT {col}, open_date, COUNT(*) FROM complaints_raw \
             WHERE {col} IS NOT NULL AND {col} != '' AND open_date >= ?1 AND open_date <= ?2 \
             GROUP BY {col}, open_date"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![start.to_string(), end.to_string()], |row| {
                let key: String = row.get(0)?;
                let date: String = row.get(1)?;
                let count: i64 = row.get(2)?;
                Ok((key, date, count))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows
            .into_iter()
            .filter_map(|(k, d, c)| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok().map(|d| (k, d, c)))
            .collect())
    }

    /// Top-`n` keys of `dimension` by total row count across `[start, end]`.
    pub fn top_keys_by_volume(
        &self,
        dimension: Dimension,
        start: NaiveDate,
        end: NaiveDate,
        n: usize,
    ) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let col = dimension.sql_column();
        let sql = format!(
            "SELECT {col}, COUNT(*) as total FROM complaints_raw \
             WHERE {col} IS NOT NULL AND {col} != '' AND open_date >= ?1 AND open_date <= ?2 \
             GROUP BY {col} ORDER BY total DESC, {col} ASC LIMIT ?3"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![start.to_string(), end.to_string(), n as i64], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// All rows whose `open_date == date`, used by RCA/Resolution scoped queries.
    pub fn rows_on_date(&self, date: NaiveDate) -> Result<Vec<ComplaintRaw>> {
        let conn = self.conn()?;
        rows_matching(&conn, "open_date = ?1", params![date.to_string()])
    }

    /// All rows with `open_date` in `[start, end]` inclusive, used by Repeat's
    /// 30-day window (§4.11).
    pub fn rows_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<ComplaintRaw>> {
        let conn = self.conn()?;
        rows_matching(
            &conn,
            "open_date >= ?1 AND open_date <= ?2",
            params![start.to_string(), end.to_string()],
        )
    }

    /// All rows not yet closed as of `date` (open_date <= date, status != Closed, and
    /// close_ts is null or after end-of-day(date)) — Resolution's aging population.
    pub fn open_rows_as_of(&self, date: NaiveDate) -> Result<Vec<ComplaintRaw>> {
        let conn = self.conn()?;
        let end_of_day = format!("{} 23:59:59", date);
        rows_matching(
            &conn,
            "open_date <= ?1 AND (sr_status IS NULL OR lower(sr_status) != 'closed') \
             AND (close_ts IS NULL OR close_ts > ?2)",
            params![date.to_string(), end_of_day],
        )
    }

    /// Rows whose `close_ts` falls on `date` and resolved in at least 300s — the
    /// MTTR population (§4.12).
    pub fn closed_rows_on_date(&self, date: NaiveDate) -> Result<Vec<ComplaintRaw>> {
        let conn = self.conn()?;
        rows_matching(
            &conn,
            "close_ts IS NOT NULL AND date(close_ts) = ?1",
            params![date.to_string()],
        )
    }
}

fn count_all(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM complaints_raw", [], |row| row.get(0))?)
}

fn rows_matching(
    conn: &Connection,
    where_clause: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<ComplaintRaw>> {
    let sql = format!(
        "SELECT sr_number, sr_row_id, mdn, open_ts, close_ts, open_date, sr_type, \
         sr_sub_type, sr_status, sr_sub_status, region, city, exc_id, cabinet_id, \
         dp_id, switch_id, rca, desc_text, priority, product, sub_product, cust_seg, \
         service_type, sr_duration FROM complaints_raw WHERE {where_clause}"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params, row_to_complaint)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn row_to_complaint(row: &rusqlite::Row) -> rusqlite::Result<ComplaintRaw> {
    let open_ts: String = row.get(3)?;
    let close_ts: Option<String> = row.get(4)?;
    let open_date: String = row.get(5)?;
    Ok(ComplaintRaw {
        sr_number: row.get(0)?,
        sr_row_id: row.get(1)?,
        mdn: row.get(2)?,
        open_ts: chrono::NaiveDateTime::parse_from_str(&open_ts, "%Y-%m-%d %H:%M:%S")
            .unwrap_or_default(),
        close_ts: close_ts.and_then(|s| {
            chrono::NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S").ok()
        }),
        open_date: chrono::NaiveDate::parse_from_str(&open_date, "%Y-%m-%d")
            .unwrap_or_default(),
        sr_type: row.get(6)?,
        sr_sub_type: row.get(7)?,
        sr_status: row.get(8)?,
        sr_sub_status: row.get(9)?,
        region: row.get(10)?,
        city: row.get(11)?,
        exc_id: row.get(12)?,
        cabinet_id: row.get(13)?,
        dp_id: row.get(14)?,
        switch_id: row.get(15)?,
        rca: row.get(16)?,
        desc_text: row.get(17)?,
        priority: row.get(18)?,
        product: row.get(19)?,
        sub_product: row.get(20)?,
        cust_seg: row.get(21)?,
        service_type: row.get(22)?,
        sr_duration: row.get(23)?,
    })
}
