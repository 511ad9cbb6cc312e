//! Batch execution: `n_tracers_per_MPI_rank` tracers, one after another.
//!
//! A failing tracer is logged and skipped; it never stops the batch.

use std::path::PathBuf;
use std::time::Instant;

use hdspin_core::engine::TransitionRule;
use hdspin_core::output::OutputPaths;
use hdspin_core::run::tracer_seed;
use hdspin_core::{Grids, RunParameters, TracerContext, TracerSummary, run_tracer};

use crate::error::{HarnessError, HarnessResult};
use crate::structured_log::{ArtifactIndex, LogEmitter, LogLevel, Outcome, events};

pub const ARTIFACT_INDEX_FILE: &str = "artifact_index.json";

/// Runs tracers `offset..offset + n_tracers` into one data directory.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    pub params: RunParameters,
    pub data_dir: PathBuf,
    pub grids_dir: PathBuf,
    pub offset: u32,
    pub rule: TransitionRule,
}

/// A tracer that did not finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracerFailure {
    pub index: u32,
    pub error: String,
}

#[derive(Debug)]
pub struct BatchReport {
    pub summaries: Vec<TracerSummary>,
    pub failures: Vec<TracerFailure>,
    pub artifact_index: PathBuf,
}

impl BatchReport {
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

impl BatchRunner {
    #[must_use]
    pub fn new(params: RunParameters, data_dir: impl Into<PathBuf>, grids_dir: impl Into<PathBuf>) -> Self {
        Self {
            params,
            data_dir: data_dir.into(),
            grids_dir: grids_dir.into(),
            offset: 0,
            rule: TransitionRule::default(),
        }
    }

    #[must_use]
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule: TransitionRule) -> Self {
        self.rule = rule;
        self
    }

    /// Tracer indices handled by this batch.
    pub fn indices(&self) -> std::ops::Range<u32> {
        self.offset..self.offset.saturating_add(self.params.n_tracers)
    }

    /// Load the grids from `grids_dir`, generating and writing them first if
    /// any file is missing. Returns the grids and whether they were generated.
    pub fn prepare_grids(&self) -> HarnessResult<(Grids, bool)> {
        if Grids::exist_in(&self.grids_dir) {
            return Ok((Grids::load_from(&self.grids_dir)?, false));
        }
        let grids = Grids::generate(&self.params);
        grids.write_to(&self.grids_dir)?;
        Ok((grids, true))
    }

    pub fn run(&self, log: &mut LogEmitter) -> HarnessResult<BatchReport> {
        let batch_started = Instant::now();
        let entry = log
            .entry(LogLevel::Info, events::PARAMETERS_RESOLVED)
            .with_landscape(self.params.landscape.as_str())
            .with_details(serde_json::to_value(&self.params)?);
        log.emit_entry(entry).map_err(HarnessError::Log)?;

        std::fs::create_dir_all(&self.data_dir).map_err(|e| HarnessError::io(&self.data_dir, e))?;
        let (grids, generated) = self.prepare_grids()?;
        let entry = log
            .entry(LogLevel::Info, events::GRIDS_READY)
            .with_artifacts(vec![self.grids_dir.display().to_string()])
            .with_details(serde_json::json!({
                "generated": generated,
                "energy_points": grids.energy.len(),
                "pi_points": grids.pi1.len(),
            }));
        log.emit_entry(entry).map_err(HarnessError::Log)?;

        let mut index_file = ArtifactIndex::new(log.run_id(), log.batch());
        let mut summaries = Vec::new();
        let mut failures = Vec::new();

        for index in self.indices() {
            // Resolved here so that a failed tracer can still be rerun.
            let seed = tracer_seed(&self.params, index);
            let entry = log
                .entry(LogLevel::Info, events::TRACER_START)
                .with_tracer(index)
                .with_seed(seed)
                .with_landscape(self.params.landscape.as_str());
            log.emit_entry(entry).map_err(HarnessError::Log)?;

            let started = Instant::now();
            let ctx = TracerContext::new(index, &self.data_dir, &grids)
                .with_rule(self.rule)
                .with_seed(seed);
            match run_tracer(&self.params, &ctx) {
                Ok(summary) => {
                    let paths = OutputPaths::for_tracer(&self.data_dir, index);
                    let mut refs = Vec::new();
                    for (kind, path) in paths.all() {
                        index_file
                            .add_file(path, kind, Some(index))
                            .map_err(|e| HarnessError::io(path, e))?;
                        refs.push(path.display().to_string());
                    }
                    let entry = log
                        .entry(LogLevel::Info, events::TRACER_DONE)
                        .with_tracer(index)
                        .with_seed(summary.seed)
                        .with_run_shape(
                            summary.dynamics.to_string(),
                            summary.landscape.as_str(),
                            summary.storage.as_str(),
                        )
                        .with_duration_ms(elapsed_ms(started))
                        .with_outcome(Outcome::Pass)
                        .with_artifacts(refs)
                        .with_details(serde_json::to_value(&summary)?);
                    log.emit_entry(entry).map_err(HarnessError::Log)?;
                    summaries.push(summary);
                }
                Err(err) => {
                    let entry = log
                        .entry(LogLevel::Error, events::TRACER_FAILED)
                        .with_tracer(index)
                        .with_seed(seed)
                        .with_landscape(self.params.landscape.as_str())
                        .with_duration_ms(elapsed_ms(started))
                        .with_outcome(Outcome::Fail)
                        .with_details(serde_json::json!({ "error": err.to_string() }));
                    log.emit_entry(entry).map_err(HarnessError::Log)?;
                    failures.push(TracerFailure {
                        index,
                        error: err.to_string(),
                    });
                }
            }
        }

        let artifact_index = self.data_dir.join(ARTIFACT_INDEX_FILE);
        index_file
            .write_to(&artifact_index)
            .map_err(|e| HarnessError::io(&artifact_index, e))?;

        let outcome = if failures.is_empty() {
            Outcome::Pass
        } else {
            Outcome::Fail
        };
        let entry = log
            .entry(LogLevel::Info, events::BATCH_DONE)
            .with_duration_ms(elapsed_ms(batch_started))
            .with_outcome(outcome)
            .with_artifacts(vec![artifact_index.display().to_string()])
            .with_details(serde_json::json!({
                "tracers": summaries.len() + failures.len(),
                "failed": failures.iter().map(|f| f.index).collect::<Vec<_>>(),
            }));
        log.emit_entry(entry).map_err(HarnessError::Log)?;
        log.flush().map_err(HarnessError::Log)?;

        Ok(BatchReport {
            summaries,
            failures,
            artifact_index,
        })
    }
}
