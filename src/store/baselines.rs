use rusqlite::params;
use std::collections::HashMap;

use crate::dimension::Dimension;
use crate::error::Result;
use crate::models::baseline::BaselineStat;

use super::Store;

impl Store {
    /// Delete-then-insert for `(dimension, window_days)` (§4.2/§9: baseline is
    /// recomputed wholesale per dimension per window on each Baseline run).
    pub fn replace_baseline_stats(
        &self,
        dimension: Dimension,
        window_days: u32,
        stats: &[BaselineStat],
    ) -> Result<()> {
        self.with_transaction(|conn| {
            conn.execute(
                "DELETE FROM baseline_stats WHERE dimension = ?1 AND window_days = ?2",
                params![dimension.as_str(), window_days],
            )?;
            let mut stmt = conn.prepare_cached(
                "INSERT INTO baseline_stats (
                    dimension, window_days, dimension_key, avg, std, samples
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for s in stats {
                stmt.execute(params![
                    s.dimension.as_str(),
                    s.window_days,
                    s.dimension_key,
                    s.avg,
                    s.std,
                    s.samples,
                ])?;
            }
            Ok(())
        })
    }

    /// All baseline rows for a dimension at a given window, keyed by `dimension_key`
    /// — what Anomaly/Trend load to avoid re-deriving baselines themselves.
    pub fn baseline_stats(
        &self,
        dimension: Dimension,
        window_days: u32,
    ) -> Result<HashMap<String, BaselineStat>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT dimension_key, avg, std, samples FROM baseline_stats \
             WHERE dimension = ?1 AND window_days = ?2",
        )?;
        let rows = stmt
            .query_map(params![dimension.as_str(), window_days], |row| {
                let key: String = row.get(0)?;
                Ok((
                    key.clone(),
                    BaselineStat {
                        dimension,
                        window_days,
                        dimension_key: key,
                        avg: row.get(1)?,
                        std: row.get(2)?,
                        samples: row.get(3)?,
                    },
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows.into_iter().collect())
    }
}
