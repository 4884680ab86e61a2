//! Shared type definitions for the Euro Diffusion simulation.
//!
//! This crate is the single source of truth for the value types that flow
//! between the codec, the world builder, and the simulation driver. It holds
//! no behavior beyond construction, validation-free accessors, and display.
//!
//! # Modules
//!
//! - [`names`] -- The [`CountryName`] newtype (a country's name doubles as
//!   the name of the currency it issues)
//! - [`geometry`] -- Grid [`Coordinates`] and inclusive [`Rectangle`] bounds
//! - [`cases`] -- Decoded problem input: [`CountrySpec`] and [`CaseSpec`]
//! - [`outcome`] -- Per-country [`CompletionRecord`]s and the per-case
//!   [`CaseOutcome`]

pub mod cases;
pub mod geometry;
pub mod names;
pub mod outcome;

// Re-export all public types at crate root for convenience.
pub use cases::{CaseSpec, CountrySpec};
pub use geometry::{Coordinates, Rectangle};
pub use names::CountryName;
pub use outcome::{CaseOutcome, CompletionDay, CompletionRecord, SimulationPhase};
