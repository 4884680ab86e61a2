//! Error types for the engine binary.
//!
//! [`EngineError`] covers every way a run can fail after the input has been
//! read. Invalid case text is not one of them: it is answered with the fixed
//! invalid-input message and a successful exit.

use eurodiff_core::BatchError;
use eurodiff_core::config::ConfigError;

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The batch failed for a reason other than its content.
    #[error("batch error: {source}")]
    Batch {
        /// The underlying batch error.
        #[from]
        source: BatchError,
    },

    /// The batch did not finish within `batch.timeout_ms`.
    #[error("batch did not finish within {timeout_ms} ms")]
    Timeout {
        /// The configured limit.
        timeout_ms: u64,
    },

    /// The blocking simulation task panicked or was cancelled.
    #[error("simulation task failed: {source}")]
    Join {
        /// The underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },

    /// The command line could not be understood.
    #[error("usage: eurodiff-engine [INPUT]  ({reason})")]
    Usage {
        /// What was wrong with the arguments.
        reason: String,
    },
}
