use std::path::PathBuf;

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::config::PulseConfig;
use crate::error::PipelineError;
use crate::ingest;
use crate::stages::{self, StageResult, StageStatus};
use crate::store::Store;

/// `Orchestrator::run(PipelineRequest) -> PipelineResult` (§4.13). Sequences stage
/// calls as plain functions over `&Store`/`&PulseConfig` — the teacher's
/// `eval_anomaly_rules`/`eval_slos` free-function style, not an object-oriented
/// per-stage "agent" struct hierarchy (a Rust idiom over the original's Python
/// agent classes). Grounded on
/// `original_source/complaints_ai/orchestrator.py::run_pipeline`.
pub struct PipelineRequest {
    pub file_path: Option<PathBuf>,
    pub target_date: Option<NaiveDate>,
    pub run_ingestion: bool,
    pub run_baseline: bool,
}

impl Default for PipelineRequest {
    fn default() -> Self {
        Self {
            file_path: None,
            target_date: None,
            run_ingestion: true,
            run_baseline: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub target_date: NaiveDate,
    pub stages: Vec<StageResult>,
    pub overall: StageStatus,
}

impl PipelineResult {
    fn new(target_date: NaiveDate) -> Self {
        Self {
            target_date,
            stages: Vec::new(),
            overall: StageStatus::Success,
        }
    }

    fn push(&mut self, result: StageResult) {
        if result.status == StageStatus::Error {
            self.overall = StageStatus::Error;
        } else if result.status == StageStatus::Warning && self.overall == StageStatus::Success {
            self.overall = StageStatus::Warning;
        }
        self.stages.push(result);
    }
}

pub struct Orchestrator<'a> {
    store: &'a Store,
    config: &'a PulseConfig,
}

impl<'a> Orchestrator<'a> {
    pub fn new(store: &'a Store, config: &'a PulseConfig) -> Self {
        Self { store, config }
    }

    /// Runs the stage sequence in §2: `Ingest -> Validate -> Baseline(optional) ->
    /// Anomaly -> Trend -> Variation -> [if anomalies>0] Correlation -> RCA ->
    /// Severity -> Narrator`. Ingest errors short-circuit everything downstream;
    /// Trend and Variation always run after Anomaly regardless of whether it found
    /// anything.
    pub fn run(&self, request: PipelineRequest) -> PipelineResult {
        let target_date = request
            .target_date
            .unwrap_or_else(|| Utc::now().date_naive() - Duration::days(1));
        let mut result = PipelineResult::new(target_date);

        if request.run_ingestion {
            if let Some(path) = &request.file_path {
                let stage = self.run_ingest(path);
                let halted = stage.status == StageStatus::Error;
                result.push(stage);
                if halted {
                    return result;
                }
            }
        }

        if request.run_baseline {
            result.push(self.run_or_error("baseline", stages::baseline::run(self.store, self.config, target_date)));
        }

        let anomaly_result = stages::anomaly::run(self.store, self.config, target_date);
        let anomaly_failed = anomaly_result.is_err();
        result.push(self.run_or_error("anomaly", anomaly_result));
        if anomaly_failed {
            return result;
        }

        result.push(self.run_or_error("trend", stages::trend::run(self.store, self.config, target_date)));
        result.push(self.run_or_error(
            "variation",
            stages::variation::run(self.store, self.config, target_date),
        ));

        let anomaly_count = stages::anomaly::anomaly_count(self.store, target_date).unwrap_or(0);
        if anomaly_count > 0 {
            result.push(self.run_or_error("correlation", stages::correlation::run(self.store, target_date)));
            result.push(self.run_or_error("rca", stages::rca::run(self.store, target_date)));
            result.push(self.run_or_error(
                "severity",
                stages::severity::run(self.store, self.config, target_date),
            ));
            result.push(self.run_or_error("narrator", stages::narrator::run(self.store, target_date)));
        }

        result
    }

    fn run_ingest(&self, path: &std::path::Path) -> StageResult {
        match ingest::ingest_file(self.store, path) {
            Ok(report) => StageResult::success("ingest")
                .with_count("rows_read", report.rows_read as i64)
                .with_count("rows_upserted", report.rows_upserted as i64)
                .with_count(
                    "rows_dropped_missing_sr_number",
                    report.rows_dropped_missing_sr_number as i64,
                )
                .with_count(
                    "rows_dropped_unparseable_date",
                    report.rows_dropped_unparseable_date as i64,
                )
                .with_diagnostic(format!(
                    "encoding={} delimiter={:?} tolerant_fallback={}",
                    report.encoding_used, report.delimiter_used, report.used_tolerant_fallback
                )),
            Err(err) => StageResult::error("ingest", describe_ingest_error(&err)),
        }
    }

    fn run_or_error(&self, stage: &'static str, result: crate::error::Result<StageResult>) -> StageResult {
        match result {
            Ok(stage_result) => stage_result,
            Err(err) => StageResult::error(stage, err.to_string()),
        }
    }
}

fn describe_ingest_error(err: &PipelineError) -> String {
    match err {
        PipelineError::Schema { missing, found } => {
            format!("schema error: missing {missing:?}, found {found:?}")
        }
        PipelineError::DateParse { raw_sample } => {
            format!("date parse error: first raw value {raw_sample:?}")
        }
        PipelineError::Encoding => "no candidate encoding/delimiter produced a usable frame".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn ingest_schema_error_short_circuits_the_pipeline() {
        let store = Store::open_in_memory().unwrap();
        let config = PulseConfig::default();
        let csv = "sr_number,region\nA,Karachi\n";
        let file = write_fixture(csv);

        let orchestrator = Orchestrator::new(&store, &config);
        let result = orchestrator.run(PipelineRequest {
            file_path: Some(file.path().to_path_buf()),
            target_date: Some(NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()),
            run_ingestion: true,
            run_baseline: false,
        });

        assert_eq!(result.overall, StageStatus::Error);
        assert_eq!(result.stages.len(), 1);
        assert_eq!(result.stages[0].stage, "ingest");
    }

    #[test]
    fn runs_full_sequence_without_a_file() {
        let store = Store::open_in_memory().unwrap();
        let config = PulseConfig::default();
        let d = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();

        let orchestrator = Orchestrator::new(&store, &config);
        let result = orchestrator.run(PipelineRequest {
            file_path: None,
            target_date: Some(d),
            run_ingestion: false,
            run_baseline: true,
        });

        let stage_names: Vec<&str> = result.stages.iter().map(|s| s.stage).collect();
        assert!(stage_names.contains(&"baseline"));
        assert!(stage_names.contains(&"anomaly"));
        assert!(stage_names.contains(&"trend"));
        assert!(stage_names.contains(&"variation"));
        // No anomalies on an empty store, so the conditional stages don't run.
        assert!(!stage_names.contains(&"correlation"));
    }
}
