//! Grid, cities, countries, and neighbor topology for the Euro Diffusion
//! simulation.
//!
//! This crate models the physical layout of one case: every declared
//! country rectangle is expanded into cities, cities are placed on a shared
//! square grid, and each city learns its up-to-four orthogonal neighbors.
//! Topology is fixed after construction; only ledger balances change.
//!
//! # Modules
//!
//! - [`city`] -- [`City`]: coordinates, owner, ledger, neighbor indices.
//! - [`country`] -- [`Country`]: name, declared bounds, owned city indices.
//! - [`error`] -- Error types for world construction.
//! - [`world_map`] -- [`WorldMap`]: the per-case city arena and the
//!   topology builder.
//!
//! Cities refer to each other by [`CityIndex`] into the arena rather than by
//! reference, so the cyclic neighbor graph has no ownership cycles.

pub mod city;
pub mod country;
pub mod error;
pub mod world_map;

// Re-export primary types at crate root.
pub use city::{City, CityIndex};
pub use country::{Country, CountryIndex};
pub use error::WorldError;
pub use world_map::WorldMap;
