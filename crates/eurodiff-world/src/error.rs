//! Error types for the `eurodiff-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`].

use eurodiff_types::{Coordinates, CountryName, Rectangle};

/// Errors that can occur while building a case's world.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WorldError {
    /// The case declares no countries.
    #[error("case declares no countries")]
    EmptyCase,

    /// Two countries in the same case share a name.
    #[error("duplicate country name: {0}")]
    DuplicateCountry(CountryName),

    /// A rectangle has `min > max` on some axis.
    #[error("country {country} has inverted bounds {bounds:?}")]
    MalformedBounds {
        /// The offending country.
        country: CountryName,
        /// Its declared bounds.
        bounds: Rectangle,
    },

    /// A rectangle extends outside the grid.
    #[error("country {country} bounds {bounds:?} exceed the {grid_size}x{grid_size} grid")]
    OutOfGrid {
        /// The offending country.
        country: CountryName,
        /// Its declared bounds.
        bounds: Rectangle,
        /// Grid side length.
        grid_size: u32,
    },

    /// Two rectangles overlap.
    #[error("cell {coordinates} claimed by {claimant} is already owned by {owner}")]
    CellOccupied {
        /// The contested cell.
        coordinates: Coordinates,
        /// Country that placed its city first.
        owner: CountryName,
        /// Country that tried to place a second city there.
        claimant: CountryName,
    },

    /// The grid is too large to address.
    #[error("grid size {0} is too large")]
    GridTooLarge(u32),

    /// Ledger initialisation failed.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: eurodiff_ledger::LedgerError,
    },
}
