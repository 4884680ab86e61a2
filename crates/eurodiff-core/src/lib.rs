//! Day clock, diffusion step, and orchestration for the Euro Diffusion
//! simulation.
//!
//! This crate turns raw case text into completion days: it decodes the
//! batch, builds one world per case, runs the day loop until every country
//! is complete or the ceiling is hit, and encodes the results.
//!
//! # Modules
//!
//! - [`batch`] -- Parallel fan-out over cases and the [`simulate`] entry
//!   point.
//! - [`clock`] -- Day counter with a hard ceiling.
//! - [`codec`] -- Text decoding of cases and text/JSON encoding of results.
//! - [`config`] -- Configuration loading from `eurodiff-config.yaml` into
//!   strongly-typed structs.
//! - [`diffusion`] -- The simultaneous one-day currency transfer.
//! - [`driver`] -- The per-case state machine.
//!
//! # Example
//!
//! ```
//! use eurodiff_core::{SimulationConfig, simulate};
//!
//! let output = simulate("1\nLuxembourg 1 1 1 1\n0\n", &SimulationConfig::default());
//! assert_eq!(output, "Case number 1\nLuxembourg 1\n");
//! ```

pub mod batch;
pub mod clock;
pub mod codec;
pub mod config;
pub mod diffusion;
pub mod driver;

pub use batch::{BatchError, run_batch, run_cases, simulate, simulate_json};
pub use codec::{CodecError, INVALID_INPUT_MESSAGE};
pub use config::SimulationConfig;
pub use driver::{CaseSimulation, SimulationError, simulate_case};
