use crate::dimension::Dimension;

/// One `(dimension, window, dimension_key)` row of the baseline cache table. §9
/// resolves the "filesystem parquet vs cache table" open question in favor of a
/// table, so this struct is both the in-memory computation result and the store row.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineStat {
    pub dimension: Dimension,
    pub window_days: u32,
    pub dimension_key: String,
    pub avg: f64,
    pub std: f64,
    pub samples: u32,
}
