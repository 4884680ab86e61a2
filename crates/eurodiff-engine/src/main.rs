//! Command-line engine for the Euro Diffusion simulation.
//!
//! Reads a batch of cases from the file named on the command line (or from
//! stdin when no file, or `-`, is given), simulates every case, and prints
//! the completion days to stdout. Logs go to stderr.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `eurodiff-config.yaml` (or the file named by
//!    `EURODIFF_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Read the input text
//! 4. Run the batch on a blocking worker, bounded by `batch.timeout_ms`
//! 5. Print the result in the configured output format
//!
//! Malformed input is not a failure: it prints the fixed invalid-input
//! message and exits with status 0.

mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use eurodiff_core::config::{LogFormat, LoggingConfig, OutputFormat, SimulationConfig};
use eurodiff_core::{BatchError, INVALID_INPUT_MESSAGE, simulate, simulate_json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "eurodiff-config.yaml";

/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "EURODIFF_CONFIG";

/// Application entry point.
///
/// The runtime is built by hand so that a timed-out batch does not keep the
/// process alive: shutdown does not wait for the abandoned blocking task.
///
/// # Errors
///
/// Returns an error for unreadable input, bad configuration, a batch
/// timeout, or an output failure.
fn main() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the tokio runtime")?;

    let result = runtime.block_on(run());
    runtime.shutdown_background();
    result
}

async fn run() -> anyhow::Result<()> {
    // 1. Load configuration.
    let (config, config_source) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(
        config = ?config_source,
        grid_size = config.grid.size,
        max_countries = config.grid.max_countries,
        max_days = config.diffusion.max_days,
        workers = config.batch.workers,
        timeout_ms = config.batch.timeout_ms,
        "eurodiff-engine starting"
    );

    // 3. Read the input.
    let input = input_path()?;
    let raw = read_input(input.as_deref()).await?;
    info!(bytes = raw.len(), "input read");

    // 4. Run the batch.
    let output = render(raw, Arc::new(config)).await?;

    // 5. Print the result.
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(output.as_bytes())
        .await
        .context("failed to write result")?;
    if !output.ends_with('\n') {
        stdout.write_all(b"\n").await.context("failed to write result")?;
    }
    stdout.flush().await.context("failed to flush stdout")?;

    info!("eurodiff-engine finished");
    Ok(())
}

/// Load configuration, returning the file it came from (if any).
///
/// A missing default file means "all defaults"; a missing file named
/// explicitly through `EURODIFF_CONFIG` is an error.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from) {
        let config = SimulationConfig::from_file(&path)?;
        return Ok((config, Some(path)));
    }

    let path = Path::new(DEFAULT_CONFIG_PATH);
    if path.exists() {
        let config = SimulationConfig::from_file(path)?;
        Ok((config, Some(path.to_path_buf())))
    } else {
        Ok((SimulationConfig::default(), None))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    match logging.format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// The optional single positional argument. `-` means stdin.
fn input_path() -> Result<Option<PathBuf>, EngineError> {
    let mut args = std::env::args_os().skip(1);
    let input = args.next();
    if args.next().is_some() {
        return Err(EngineError::Usage {
            reason: "expected at most one input file".to_owned(),
        });
    }
    Ok(input.filter(|arg| arg != "-").map(PathBuf::from))
}

async fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("failed to read stdin")?;
            Ok(raw)
        }
    }
}

/// Run the batch on the blocking pool, bounded by `batch.timeout_ms`.
async fn render(raw: String, config: Arc<SimulationConfig>) -> Result<String, EngineError> {
    let timeout_ms = config.batch.timeout_ms;
    let task = tokio::task::spawn_blocking(move || render_blocking(&raw, &config));

    let joined = if timeout_ms == 0 {
        task.await
    } else {
        tokio::time::timeout(Duration::from_millis(timeout_ms), task)
            .await
            .map_err(|_elapsed| EngineError::Timeout { timeout_ms })?
    };

    Ok(joined??)
}

fn render_blocking(raw: &str, config: &SimulationConfig) -> Result<String, BatchError> {
    match config.output.format {
        OutputFormat::Text => Ok(simulate(raw, config)),
        OutputFormat::Json => match simulate_json(raw, config) {
            Err(err) if err.is_rejection() => Ok(INVALID_INPUT_MESSAGE.to_owned()),
            other => other,
        },
    }
}
