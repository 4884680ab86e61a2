//! Grid coordinates and axis-aligned rectangles.
//!
//! Coordinates are 1-indexed on both axes, matching the problem input. The
//! grid size itself is a configuration value and is enforced by the codec
//! and the world builder, not by these types.

use serde::{Deserialize, Serialize};

/// Position of a city on the grid (1-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinates {
    /// Column, 1-indexed.
    pub x: u32,
    /// Row, 1-indexed.
    pub y: u32,
}

impl Coordinates {
    /// Create coordinates from a column and a row.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl core::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Inclusive rectangle of grid cells owned by one country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    /// Smallest column, inclusive.
    pub min_x: u32,
    /// Smallest row, inclusive.
    pub min_y: u32,
    /// Largest column, inclusive.
    pub max_x: u32,
    /// Largest row, inclusive.
    pub max_y: u32,
}

impl Rectangle {
    /// Create a rectangle from its inclusive bounds.
    ///
    /// Bounds are stored as given. Callers that accept untrusted input must
    /// check [`is_well_formed`](Self::is_well_formed) and grid bounds first.
    pub const fn new(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Returns `true` when both axes satisfy `min <= max`.
    pub const fn is_well_formed(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }

    /// Returns `true` when the rectangle lies entirely inside a
    /// `grid_size x grid_size` grid (1-indexed).
    pub const fn fits_grid(&self, grid_size: u32) -> bool {
        self.min_x >= 1 && self.min_y >= 1 && self.max_x <= grid_size && self.max_y <= grid_size
    }

    /// Iterate over every cell of the rectangle, row by row.
    ///
    /// Yields nothing for a rectangle that is not well-formed.
    pub fn cells(&self) -> impl Iterator<Item = Coordinates> + '_ {
        (self.min_y..=self.max_y)
            .flat_map(move |y| (self.min_x..=self.max_x).map(move |x| Coordinates::new(x, y)))
    }

    /// Number of cells covered, or 0 for a rectangle that is not well-formed.
    pub fn area(&self) -> u64 {
        if !self.is_well_formed() {
            return 0;
        }
        let width = u64::from(self.max_x.saturating_sub(self.min_x)).saturating_add(1);
        let height = u64::from(self.max_y.saturating_sub(self.min_y)).saturating_add(1);
        width.saturating_mul(height)
    }
}
