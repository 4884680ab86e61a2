//! Decoded problem input.
//!
//! A [`CaseSpec`] is one independent simulation unit: an ordered list of
//! countries sharing a grid. Declaration order is significant because the
//! output reports countries in the same order.

use serde::{Deserialize, Serialize};

use crate::geometry::Rectangle;
use crate::names::CountryName;

/// One country as declared in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySpec {
    /// Country (and currency) name.
    pub name: CountryName,
    /// Cells owned by the country.
    pub bounds: Rectangle,
}

impl CountrySpec {
    /// Create a country specification.
    pub fn new(name: impl Into<CountryName>, bounds: Rectangle) -> Self {
        Self {
            name: name.into(),
            bounds,
        }
    }
}

/// One independent case: the countries sharing a single grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSpec {
    /// Countries in declaration order.
    pub countries: Vec<CountrySpec>,
}

impl CaseSpec {
    /// Create a case from countries in declaration order.
    pub const fn new(countries: Vec<CountrySpec>) -> Self {
        Self { countries }
    }

    /// Number of countries in the case.
    pub const fn country_count(&self) -> usize {
        self.countries.len()
    }

    /// Total number of cities over every country.
    pub fn city_count(&self) -> u64 {
        self.countries
            .iter()
            .fold(0_u64, |acc, c| acc.saturating_add(c.bounds.area()))
    }
}
