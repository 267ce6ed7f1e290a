//! Idempotent schema migrations, in the `const MIGRATIONS: &[&str]` + `execute_batch`
//! style the teacher uses for its ClickHouse DDL — reworked here as SQLite DDL for
//! the tables spec §6 names, plus the `baseline_stats` cache table (§9).

pub const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS complaints_raw (
        sr_number     TEXT PRIMARY KEY,
        sr_row_id     TEXT,
        mdn           TEXT,
        open_ts       TEXT NOT NULL,
        close_ts      TEXT,
        open_date     TEXT NOT NULL,
        sr_type       TEXT,
        sr_sub_type   TEXT,
        sr_status     TEXT,
        sr_sub_status TEXT,
        region        TEXT,
        city          TEXT,
        exc_id        TEXT,
        cabinet_id    TEXT,
        dp_id         TEXT,
        switch_id     TEXT,
        rca           TEXT,
        desc_text     TEXT,
        priority      TEXT,
        product       TEXT,
        sub_product   TEXT,
        cust_seg      TEXT,
        service_type  TEXT,
        sr_duration   TEXT
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_complaints_raw_open_date ON complaints_raw(open_date);",
    "CREATE INDEX IF NOT EXISTS idx_complaints_raw_mdn ON complaints_raw(mdn);",
    r#"
    CREATE TABLE IF NOT EXISTS daily_anomalies (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        anomaly_date   TEXT NOT NULL,
        dimension      TEXT NOT NULL,
        dimension_key  TEXT NOT NULL,
        metric_value   INTEGER NOT NULL,
        baseline_avg   REAL NOT NULL,
        baseline_std   REAL NOT NULL,
        z_score        REAL NOT NULL,
        severity       TEXT NOT NULL,
        rca_context    TEXT,
        UNIQUE(anomaly_date, dimension, dimension_key)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS daily_trends (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        trend_date     TEXT NOT NULL,
        dimension      TEXT NOT NULL,
        dimension_key  TEXT NOT NULL,
        window_days    INTEGER NOT NULL,
        metric_value   INTEGER NOT NULL,
        trend_direction TEXT NOT NULL,
        trend_strength REAL NOT NULL,
        significance   REAL,
        UNIQUE(trend_date, dimension, dimension_key, window_days)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS daily_variations (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        variation_date   TEXT NOT NULL,
        dimension        TEXT NOT NULL,
        dimension_key    TEXT NOT NULL,
        variation_type   TEXT NOT NULL,
        current_value    REAL NOT NULL,
        previous_value   REAL NOT NULL,
        variation_percent REAL NOT NULL,
        is_significant   INTEGER NOT NULL,
        UNIQUE(variation_date, dimension, dimension_key, variation_type)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS daily_mttr (
        id                   INTEGER PRIMARY KEY AUTOINCREMENT,
        mttr_date            TEXT NOT NULL,
        dimension            TEXT NOT NULL,
        dimension_key        TEXT NOT NULL,
        avg_mttr_hours       REAL NOT NULL,
        total_resolved_count INTEGER NOT NULL,
        UNIQUE(mttr_date, dimension, dimension_key)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS daily_aging (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        aging_date    TEXT NOT NULL,
        dimension     TEXT NOT NULL,
        dimension_key TEXT NOT NULL,
        slab          TEXT NOT NULL,
        count         INTEGER NOT NULL,
        UNIQUE(aging_date, dimension, dimension_key, slab)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS exec_insights (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        created_at TEXT NOT NULL,
        title      TEXT NOT NULL,
        summary    TEXT NOT NULL,
        severity   TEXT NOT NULL
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_exec_insights_created_at ON exec_insights(created_at);",
    r#"
    CREATE TABLE IF NOT EXISTS baseline_stats (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        dimension     TEXT NOT NULL,
        window_days   INTEGER NOT NULL,
        dimension_key TEXT NOT NULL,
        avg           REAL NOT NULL,
        std           REAL NOT NULL,
        samples       INTEGER NOT NULL,
        UNIQUE(dimension, window_days, dimension_key)
    );
    "#,
];
