//! City node: a single grid cell owned by a country.
//!
//! A [`City`] holds its immutable placement (coordinates, owner, neighbors)
//! alongside the mutable [`CityLedger`]. Only the ledger changes once the
//! world is built.

use eurodiff_ledger::CityLedger;
use eurodiff_types::Coordinates;

use crate::country::CountryIndex;

/// Index of a city in its case's city arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CityIndex(usize);

impl CityIndex {
    /// Wrap an arena position.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the arena position.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A city on the grid.
#[derive(Debug, Clone)]
pub struct City {
    /// Grid position (1-indexed).
    coordinates: Coordinates,
    /// The owning country.
    country: CountryIndex,
    /// Per-currency balances.
    ledger: CityLedger,
    /// Orthogonal neighbors (0 to 4), filled in by the topology builder.
    neighbours: Vec<CityIndex>,
}

impl City {
    /// Create a city with no neighbors yet.
    pub const fn new(coordinates: Coordinates, country: CountryIndex, ledger: CityLedger) -> Self {
        Self {
            coordinates,
            country,
            ledger,
            neighbours: Vec::new(),
        }
    }

    /// Grid position.
    pub const fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    /// Owning country.
    pub const fn country(&self) -> CountryIndex {
        self.country
    }

    /// Read access to the balances.
    pub const fn ledger(&self) -> &CityLedger {
        &self.ledger
    }

    /// Write access to the balances.
    pub const fn ledger_mut(&mut self) -> &mut CityLedger {
        &mut self.ledger
    }

    /// Orthogonal neighbors.
    pub fn neighbours(&self) -> &[CityIndex] {
        &self.neighbours
    }

    /// Number of orthogonal neighbors.
    pub const fn neighbour_count(&self) -> usize {
        self.neighbours.len()
    }

    /// Returns `true` when every currency balance is strictly positive.
    pub fn is_complete(&self) -> bool {
        self.ledger.is_complete()
    }

    /// Replace the neighbor list. Only the topology builder calls this.
    pub(crate) fn set_neighbours(&mut self, neighbours: Vec<CityIndex>) {
        self.neighbours = neighbours;
    }
}
