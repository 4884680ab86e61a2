//! Configuration loading and typed config structures for the Euro Diffusion
//! simulation.
//!
//! The canonical configuration lives in `eurodiff-config.yaml`. This module
//! defines strongly-typed structs that mirror the YAML structure and a
//! loader that reads and validates the file. Every field has a default, so
//! an empty file (or no file at all) yields the classic problem constants:
//! a 10x10 grid, at most 20 countries, 1,000,000 starting coins per city,
//! one coin per 1,000 sent to each neighbor, and a 10,000-day ceiling.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds an unusable value.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `eurodiff-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Diffusion constants and the day ceiling.
    #[serde(default)]
    pub diffusion: DiffusionConfig,

    /// Grid and input limits.
    #[serde(default)]
    pub grid: GridConfig,

    /// Batch fan-out settings.
    #[serde(default)]
    pub batch: BatchConfig,

    /// Result rendering.
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document means "all defaults".
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value can drive a simulation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.diffusion.representative_portion == 0 {
            return Err(invalid("diffusion.representative_portion must be at least 1"));
        }
        if self.diffusion.max_days == 0 {
            return Err(invalid("diffusion.max_days must be at least 1"));
        }
        if self.grid.size == 0 {
            return Err(invalid("grid.size must be at least 1"));
        }
        if self.grid.max_countries == 0 {
            return Err(invalid("grid.max_countries must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

/// Diffusion constants.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiffusionConfig {
    /// Coins of its own currency each city starts with.
    #[serde(default = "default_initial_balance")]
    pub initial_balance: u64,

    /// A city sends one coin per this many coins to each neighbor per day.
    #[serde(default = "default_representative_portion")]
    pub representative_portion: u64,

    /// Day ceiling: countries not complete by this day are reported `never`.
    #[serde(default = "default_max_days")]
    pub max_days: u64,

    /// Check currency conservation after every simulated day.
    #[serde(default = "default_true")]
    pub verify_conservation: bool,
}

impl Default for DiffusionConfig {
    fn default() -> Self {
        Self {
            initial_balance: default_initial_balance(),
            representative_portion: default_representative_portion(),
            max_days: default_max_days(),
            verify_conservation: true,
        }
    }
}

/// Grid and input limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GridConfig {
    /// Grid side length; coordinates range over `1..=size`.
    #[serde(default = "default_grid_size")]
    pub size: u32,

    /// Largest country count a single case may declare.
    #[serde(default = "default_max_countries")]
    pub max_countries: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: default_grid_size(),
            max_countries: default_max_countries(),
        }
    }
}

/// Batch fan-out settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BatchConfig {
    /// Worker threads for running cases (0 = one per available core).
    #[serde(default)]
    pub workers: usize,

    /// Wall-clock limit for a whole batch in milliseconds (0 = unlimited).
    /// Enforced by the engine binary.
    #[serde(default)]
    pub timeout_ms: u64,
}

/// How results are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// `Case number <k>` blocks, one `<name> <day>` line per country.
    #[default]
    Text,
    /// Pretty-printed JSON array of case outcomes.
    Json,
}

/// Result rendering configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG`
    /// is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log line format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Pretty,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_initial_balance() -> u64 {
    1_000_000
}

const fn default_representative_portion() -> u64 {
    1_000
}

const fn default_max_days() -> u64 {
    10_000
}

const fn default_grid_size() -> u32 {
    10
}

const fn default_max_countries() -> usize {
    20
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_problem_constants() {
        let config = SimulationConfig::default();
        assert_eq!(config.diffusion.initial_balance, 1_000_000);
        assert_eq!(config.diffusion.representative_portion, 1_000);
        assert_eq!(config.diffusion.max_days, 10_000);
        assert!(config.diffusion.verify_conservation);
        assert_eq!(config.grid.size, 10);
        assert_eq!(config.grid.max_countries, 20);
        assert_eq!(config.batch.workers, 0);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
diffusion:
  initial_balance: 500000
  representative_portion: 500
  max_days: 2000
  verify_conservation: false

grid:
  size: 12
  max_countries: 8

batch:
  workers: 4
  timeout_ms: 30000

output:
  format: json

logging:
  level: debug
  format: json
";

        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.diffusion.initial_balance, 500_000);
        assert_eq!(config.diffusion.representative_portion, 500);
        assert_eq!(config.diffusion.max_days, 2_000);
        assert!(!config.diffusion.verify_conservation);
        assert_eq!(config.grid.size, 12);
        assert_eq!(config.grid.max_countries, 8);
        assert_eq!(config.batch.workers, 4);
        assert_eq!(config.batch.timeout_ms, 30_000);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("diffusion:\n  max_days: 50\n");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        // Ceiling is overridden
        assert_eq!(config.diffusion.max_days, 50);
        // Everything else uses defaults
        assert_eq!(config.diffusion.initial_balance, 1_000_000);
        assert_eq!(config.grid.size, 10);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = SimulationConfig::parse("");
        assert_eq!(config.ok(), Some(SimulationConfig::default()));
    }

    #[test]
    fn zero_portion_is_invalid() {
        let config = SimulationConfig::parse("diffusion:\n  representative_portion: 0\n");
        assert!(matches!(config, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn zero_grid_is_invalid() {
        let config = SimulationConfig::parse("grid:\n  size: 0\n");
        assert!(matches!(config, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn unknown_output_format_is_a_yaml_error() {
        let config = SimulationConfig::parse("output:\n  format: xml\n");
        assert!(matches!(config, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("eurodiff-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
