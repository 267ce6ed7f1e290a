use thiserror::Error;

/// Fatal, stage-aborting errors. Non-fatal conditions (`EmptyWindowWarning`,
/// `MissingBaseline`, `DataQualityIssue`) are not modeled as errors — they are
/// recorded directly on a `StageResult` with `status: StageStatus::Warning`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("schema error: missing columns {missing:?} (found {found:?})")]
    Schema {
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error("date parse error: no rows had a parseable open_ts (first raw value: {raw_sample:?})")]
    DateParse { raw_sample: Option<String> },

    #[error("encoding error: no candidate encoding produced a usable frame")]
    Encoding,

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
