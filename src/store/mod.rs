//! The relational store. Generalizes the teacher's `ConfigDb { conn: Mutex<Connection> }`
//! (`examples/RushObservability-query-api/src/config_db.rs`) into a pooled connection
//! (`r2d2` + `r2d2_sqlite`) sized by `PulseConfig::connection_pool_size`, since this
//! pipeline's stages are not forced to share one `Mutex`-guarded connection the way the
//! teacher's single-process web server does.

pub mod anomalies;
pub mod baselines;
pub mod complaints;
pub mod insights;
pub mod resolution;
pub mod schema;
pub mod surge;
pub mod trends;
pub mod variations;

use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::error::{PipelineError, Result};

pub struct Store {
    pool: Pool<SqliteConnectionManager>,
}

impl Store {
    pub fn open(path: &str, pool_size: u32) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .idle_timeout(Some(Duration::from_secs(3600)))
            .build(manager)?;
        let store = Store { pool };
        store.migrate()?;
        Ok(store)
    }

    /// A single shared in-memory database, for tests. `max_size(1)` is required:
    /// every `:memory:` SQLite connection is its own isolated database, so a pool
    /// with more than one connection would not observe each other's writes.
    pub fn open_in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager)?;
        let store = Store { pool };
        store.migrate()?;
        Ok(store)
    }

    pub fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn()?;
        for stmt in schema::MIGRATIONS {
            conn.execute_batch(stmt)
                .map_err(|e| PipelineError::Store(e))?;
        }
        tracing::info!("store: schema migrated");
        Ok(())
    }

    /// Run `f` inside one transaction, committing on `Ok` and rolling back on `Err` —
    /// the delete-then-insert idempotency unit every stage's write path needs (§5/§9).
    pub fn with_transaction<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(PipelineError::Store)?;
        let result = f(&tx).map_err(PipelineError::Store)?;
        tx.commit().map_err(PipelineError::Store)?;
        Ok(result)
    }
}
