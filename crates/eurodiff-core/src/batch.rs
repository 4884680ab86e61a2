//! Batch runner: decode, simulate every case, encode.
//!
//! Cases share nothing, so they fan out across a `rayon` pool sized by
//! `batch.workers` (0 lets rayon pick one thread per core). Results are
//! collected through an indexed parallel iterator, which keeps them in the
//! order the cases were declared.

use std::time::Instant;

use eurodiff_types::{CaseOutcome, CaseSpec};
use rayon::prelude::*;
use tracing::{error, info, warn};

use crate::codec::{self, CodecError, INVALID_INPUT_MESSAGE};
use crate::config::SimulationConfig;
use crate::driver::{self, SimulationError};

/// Errors that can occur while running a batch.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The input text could not be decoded.
    #[error("decode error: {source}")]
    Codec {
        /// The underlying codec error.
        #[from]
        source: CodecError,
    },

    /// A case failed while simulating.
    #[error("case {case_number}: {source}")]
    Simulation {
        /// 1-based number of the failing case.
        case_number: usize,
        /// The underlying simulation error.
        source: SimulationError,
    },

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {source}")]
    ThreadPool {
        /// The underlying rayon error.
        #[from]
        source: rayon::ThreadPoolBuildError,
    },

    /// JSON rendering failed.
    #[error("failed to render JSON: {source}")]
    Json {
        /// The underlying serializer error.
        #[from]
        source: serde_json::Error,
    },
}

impl BatchError {
    /// Returns `true` when the batch was rejected because of what it
    /// contained rather than because of the environment it ran in.
    ///
    /// These are the failures reported with [`INVALID_INPUT_MESSAGE`].
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Codec { .. } | Self::Simulation { .. })
    }
}

/// Simulate every case on the worker pool.
///
/// The returned outcomes are in the same order as `cases`.
///
/// # Errors
///
/// Returns [`BatchError::ThreadPool`] if the pool cannot be built, or
/// [`BatchError::Simulation`] for a failing case. One failing case fails
/// the whole batch.
pub fn run_cases(cases: &[CaseSpec], config: &SimulationConfig) -> Result<Vec<CaseOutcome>, BatchError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.batch.workers)
        .build()?;

    let started = Instant::now();
    info!(
        cases = cases.len(),
        workers = pool.current_num_threads(),
        "batch starting"
    );

    let outcomes = pool.install(|| {
        cases
            .par_iter()
            .enumerate()
            .map(|(position, case)| {
                driver::simulate_case(case, config).map_err(|source| BatchError::Simulation {
                    case_number: position.saturating_add(1),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()
    })?;

    info!(
        cases = outcomes.len(),
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "batch finished"
    );
    Ok(outcomes)
}

/// Decode `raw` and simulate every case.
///
/// # Errors
///
/// Returns [`BatchError::Codec`] for malformed input, or any error from
/// [`run_cases`].
pub fn run_batch(raw: &str, config: &SimulationConfig) -> Result<Vec<CaseOutcome>, BatchError> {
    let cases = codec::decode(raw, &config.grid)?;
    run_cases(&cases, config)
}

/// Turn raw input text into result text.
///
/// Any failure yields [`INVALID_INPUT_MESSAGE`] instead of partial output.
/// The function is pure: the same input and configuration always give the
/// same text.
pub fn simulate(raw: &str, config: &SimulationConfig) -> String {
    match run_batch(raw, config) {
        Ok(outcomes) => codec::encode(&outcomes),
        Err(err) => {
            log_failure(&err);
            INVALID_INPUT_MESSAGE.to_owned()
        }
    }
}

/// Turn raw input text into a JSON array of case outcomes.
///
/// # Errors
///
/// Returns the [`BatchError`] that stopped the batch.
pub fn simulate_json(raw: &str, config: &SimulationConfig) -> Result<String, BatchError> {
    let outcomes = run_batch(raw, config).inspect_err(log_failure)?;
    Ok(codec::encode_json(&outcomes)?)
}

fn log_failure(err: &BatchError) {
    match err {
        BatchError::Codec { source } => {
            warn!(line = source.line(), error = %source, "input rejected");
        }
        BatchError::Simulation { case_number, source } => {
            error!(case_number, error = %source, "case simulation failed");
        }
        BatchError::ThreadPool { .. } | BatchError::Json { .. } => {
            error!(error = %err, "batch failed");
        }
    }
}
