//! Country: a named rectangle of cities issuing one currency.

use eurodiff_ledger::CurrencyId;
use eurodiff_types::CountryName;

use crate::city::CityIndex;

/// Index of a country in declaration order.
///
/// The country with index `i` issues the currency [`CurrencyId`] `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CountryIndex(usize);

impl CountryIndex {
    /// Wrap a declaration position.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the declaration position.
    pub const fn index(self) -> usize {
        self.0
    }

    /// The currency issued by this country.
    pub const fn currency(self) -> CurrencyId {
        CurrencyId::new(self.0)
    }
}

/// A country of one case.
#[derive(Debug, Clone)]
pub struct Country {
    name: CountryName,
    cities: Vec<CityIndex>,
}

impl Country {
    /// Create a country owning `cities`.
    pub const fn new(name: CountryName, cities: Vec<CityIndex>) -> Self {
        Self { name, cities }
    }

    /// Country (and currency) name.
    pub const fn name(&self) -> &CountryName {
        &self.name
    }

    /// Owned cities, row-major inside the rectangle.
    pub fn cities(&self) -> &[CityIndex] {
        &self.cities
    }
}
