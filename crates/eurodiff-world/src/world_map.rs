//! The per-case city arena and topology builder.
//!
//! [`WorldMap::build`] expands each declared rectangle into cities, places
//! them on a square grid (1-indexed on both axes), and assigns each city the
//! occupied cells directly above, left, below, and right of it. Lookups that
//! leave the grid or land on an empty cell are skipped, so adjacency is
//! symmetric by construction.
//!
//! Internally the grid is a row-major `Vec<Option<CityIndex>>` of
//! `grid_size * grid_size` cells. Cities are stored in declaration order:
//! all cities of the first country (row-major in its rectangle), then the
//! second, and so on. Iteration order is therefore deterministic.

use std::collections::BTreeSet;

use eurodiff_ledger::{CityLedger, CurrencyTotals, LedgerError};
use eurodiff_types::{CaseSpec, Coordinates};
use tracing::debug;

use crate::city::{City, CityIndex};
use crate::country::{Country, CountryIndex};
use crate::error::WorldError;

/// All cities and countries of one case.
#[derive(Debug, Clone)]
pub struct WorldMap {
    /// Grid side length.
    grid_size: u32,
    /// Row-major grid cells: `cells[(y - 1) * grid_size + (x - 1)]`.
    cells: Vec<Option<CityIndex>>,
    /// City arena.
    cities: Vec<City>,
    /// Countries in declaration order.
    countries: Vec<Country>,
}

impl WorldMap {
    /// Build the world for one case.
    ///
    /// Every city starts with `initial_balance` of its own country's
    /// currency and 0 of every other currency.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError`] for an empty case, duplicate names, bounds
    /// that are inverted or leave the grid, overlapping rectangles, or a
    /// grid too large to address.
    pub fn build(case: &CaseSpec, grid_size: u32, initial_balance: u64) -> Result<Self, WorldError> {
        if case.countries.is_empty() {
            return Err(WorldError::EmptyCase);
        }

        let side = usize::try_from(grid_size).map_err(|_err| WorldError::GridTooLarge(grid_size))?;
        let cell_count = side
            .checked_mul(side)
            .ok_or(WorldError::GridTooLarge(grid_size))?;

        let currency_count = case.country_count();
        let mut seen_names = BTreeSet::new();
        let mut cells: Vec<Option<CityIndex>> = vec![None; cell_count];
        // Overlapping cases declare more cities than the grid holds.
        let declared_cities = usize::try_from(case.city_count()).unwrap_or(cell_count);
        let mut cities: Vec<City> = Vec::with_capacity(declared_cities.min(cell_count));
        let mut countries: Vec<Country> = Vec::with_capacity(currency_count);

        for (position, spec) in case.countries.iter().enumerate() {
            if !seen_names.insert(spec.name.clone()) {
                return Err(WorldError::DuplicateCountry(spec.name.clone()));
            }
            if !spec.bounds.is_well_formed() {
                return Err(WorldError::MalformedBounds {
                    country: spec.name.clone(),
                    bounds: spec.bounds,
                });
            }
            if !spec.bounds.fits_grid(grid_size) {
                return Err(WorldError::OutOfGrid {
                    country: spec.name.clone(),
                    bounds: spec.bounds,
                    grid_size,
                });
            }

            let country_index = CountryIndex::new(position);
            let mut owned = Vec::new();

            for coordinates in spec.bounds.cells() {
                let slot = cell_offset(grid_size, coordinates)
                    .and_then(|offset| cells.get_mut(offset))
                    .ok_or_else(|| WorldError::OutOfGrid {
                        country: spec.name.clone(),
                        bounds: spec.bounds,
                        grid_size,
                    })?;

                if let Some(existing) = *slot {
                    let owner = cities
                        .get(existing.index())
                        .and_then(|city| countries.get(city.country().index()))
                        .map_or_else(|| spec.name.clone(), |c| c.name().clone());
                    return Err(WorldError::CellOccupied {
                        coordinates,
                        owner,
                        claimant: spec.name.clone(),
                    });
                }

                let ledger = CityLedger::new(currency_count, country_index.currency(), initial_balance)?;
                let city_index = CityIndex::new(cities.len());
                cities.push(City::new(coordinates, country_index, ledger));
                *slot = Some(city_index);
                owned.push(city_index);
            }

            countries.push(Country::new(spec.name.clone(), owned));
        }

        let mut world = Self {
            grid_size,
            cells,
            cities,
            countries,
        };
        world.assign_neighbours();

        debug!(
            grid_size,
            countries = world.countries.len(),
            cities = world.cities.len(),
            "world topology built"
        );

        Ok(world)
    }

    /// Compute every city's orthogonal neighbors from the shared grid.
    fn assign_neighbours(&mut self) {
        let neighbour_lists: Vec<Vec<CityIndex>> = self
            .cities
            .iter()
            .map(|city| self.adjacent_cities(city.coordinates()))
            .collect();

        for (city, neighbours) in self.cities.iter_mut().zip(neighbour_lists) {
            city.set_neighbours(neighbours);
        }
    }

    /// Occupied cells above, left, below, and right of `at`.
    fn adjacent_cities(&self, at: Coordinates) -> Vec<CityIndex> {
        let candidates = [
            at.y.checked_sub(1).map(|y| Coordinates::new(at.x, y)),
            at.x.checked_sub(1).map(|x| Coordinates::new(x, at.y)),
            at.y.checked_add(1).map(|y| Coordinates::new(at.x, y)),
            at.x.checked_add(1).map(|x| Coordinates::new(x, at.y)),
        ];

        candidates
            .into_iter()
            .flatten()
            .filter_map(|coordinates| self.city_index_at(coordinates))
            .collect()
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Grid side length.
    pub const fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Number of cities in the case.
    pub const fn city_count(&self) -> usize {
        self.cities.len()
    }

    /// Number of countries (and currencies) in the case.
    pub const fn country_count(&self) -> usize {
        self.countries.len()
    }

    /// Index of the city at `coordinates`, if the cell is occupied.
    pub fn city_index_at(&self, coordinates: Coordinates) -> Option<CityIndex> {
        cell_offset(self.grid_size, coordinates)
            .and_then(|offset| self.cells.get(offset))
            .copied()
            .flatten()
    }

    /// The city at `coordinates`, if the cell is occupied.
    pub fn city_at(&self, coordinates: Coordinates) -> Option<&City> {
        self.city_index_at(coordinates).and_then(|index| self.city(index))
    }

    /// A city by arena index.
    pub fn city(&self, index: CityIndex) -> Option<&City> {
        self.cities.get(index.index())
    }

    /// A city by arena index, mutably.
    pub fn city_mut(&mut self, index: CityIndex) -> Option<&mut City> {
        self.cities.get_mut(index.index())
    }

    /// Iterate over all cities in arena order.
    pub fn cities(&self) -> impl Iterator<Item = (CityIndex, &City)> {
        self.cities
            .iter()
            .enumerate()
            .map(|(index, city)| (CityIndex::new(index), city))
    }

    /// Iterate over all cities mutably in arena order.
    pub fn cities_mut(&mut self) -> impl Iterator<Item = &mut City> {
        self.cities.iter_mut()
    }

    /// A country by declaration index.
    pub fn country(&self, index: CountryIndex) -> Option<&Country> {
        self.countries.get(index.index())
    }

    /// Iterate over all countries in declaration order.
    pub fn countries(&self) -> impl Iterator<Item = (CountryIndex, &Country)> {
        self.countries
            .iter()
            .enumerate()
            .map(|(index, country)| (CountryIndex::new(index), country))
    }

    /// Returns `true` when every city of the country is complete.
    ///
    /// Returns `false` for an unknown country.
    pub fn country_is_complete(&self, index: CountryIndex) -> bool {
        self.country(index).is_some_and(|country| {
            country
                .cities()
                .iter()
                .all(|city| self.city(*city).is_some_and(City::is_complete))
        })
    }

    /// Sum of every visible balance, per currency.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] on overflow or inconsistent ledgers.
    pub fn currency_totals(&self) -> Result<CurrencyTotals, LedgerError> {
        CurrencyTotals::collect(
            self.countries.len(),
            self.cities.iter().map(City::ledger),
        )
    }
}

/// Row-major offset of `coordinates` in a `grid_size` grid, or `None` when
/// the cell lies outside it.
fn cell_offset(grid_size: u32, coordinates: Coordinates) -> Option<usize> {
    if coordinates.x == 0
        || coordinates.y == 0
        || coordinates.x > grid_size
        || coordinates.y > grid_size
    {
        return None;
    }
    let side = usize::try_from(grid_size).ok()?;
    let x = usize::try_from(coordinates.x.checked_sub(1)?).ok()?;
    let y = usize::try_from(coordinates.y.checked_sub(1)?).ok()?;
    y.checked_mul(side)?.checked_add(x)
}

#[cfg(test)]
mod tests {
    use eurodiff_ledger::CurrencyId;
    use eurodiff_types::{CountryName, CountrySpec, Rectangle};

    use super::*;

    fn case(countries: &[(&str, u32, u32, u32, u32)]) -> CaseSpec {
        CaseSpec::new(
            countries
                .iter()
                .map(|&(name, min_x, min_y, max_x, max_y)| {
                    CountrySpec::new(name, Rectangle::new(min_x, min_y, max_x, max_y))
                })
                .collect(),
        )
    }

    fn europe() -> CaseSpec {
        case(&[
            ("France", 1, 4, 4, 6),
            ("Spain", 3, 1, 6, 3),
            ("Portugal", 1, 1, 2, 2),
        ])
    }

    fn neighbour_coords(world: &WorldMap, at: Coordinates) -> BTreeSet<Coordinates> {
        world
            .city_at(at)
            .map(|city| {
                city.neighbours()
                    .iter()
                    .filter_map(|index| world.city(*index))
                    .map(City::coordinates)
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn builds_every_city_of_every_country() {
        let world = WorldMap::build(&europe(), 10, 1_000_000);
        assert!(world.is_ok());
        let Ok(world) = world else { return };

        assert_eq!(world.country_count(), 3);
        assert_eq!(world.city_count(), 12 + 12 + 4);
        assert_eq!(world.grid_size(), 10);

        let france = world.country(CountryIndex::new(0));
        assert_eq!(france.map(|c| c.cities().len()), Some(12));
        assert_eq!(
            france.map(|c| c.name().clone()),
            Some(CountryName::from("France"))
        );
    }

    #[test]
    fn ledgers_start_with_own_currency() {
        let Ok(world) = WorldMap::build(&europe(), 10, 1_000_000) else {
            panic!("europe should build");
        };
        let spain_city = world.city_at(Coordinates::new(4, 2));
        assert!(spain_city.is_some());
        if let Some(city) = spain_city {
            assert_eq!(city.country(), CountryIndex::new(1));
            assert_eq!(city.ledger().balance(CurrencyId::new(1)), Some(1_000_000));
            assert_eq!(city.ledger().balance(CurrencyId::new(0)), Some(0));
            assert_eq!(city.ledger().balance(CurrencyId::new(2)), Some(0));
        }
    }

    #[test]
    fn corner_city_has_two_neighbours() {
        let Ok(world) = WorldMap::build(&europe(), 10, 1_000_000) else {
            panic!("europe should build");
        };
        let expected: BTreeSet<Coordinates> =
            [Coordinates::new(2, 1), Coordinates::new(1, 2)].into_iter().collect();
        assert_eq!(neighbour_coords(&world, Coordinates::new(1, 1)), expected);
    }

    #[test]
    fn border_city_links_across_countries() {
        let Ok(world) = WorldMap::build(&europe(), 10, 1_000_000) else {
            panic!("europe should build");
        };
        // Portugal (2, 2) touches Spain (3, 2) and Portugal (1, 2), (2, 1).
        let expected: BTreeSet<Coordinates> = [
            Coordinates::new(2, 1),
            Coordinates::new(1, 2),
            Coordinates::new(3, 2),
        ]
        .into_iter()
        .collect();
        assert_eq!(neighbour_coords(&world, Coordinates::new(2, 2)), expected);
    }

    #[test]
    fn empty_cells_are_not_neighbours() {
        let Ok(world) = WorldMap::build(&europe(), 10, 1_000_000) else {
            panic!("europe should build");
        };
        // Spain (6, 3) has no city at (7, 3) or (6, 4).
        let expected: BTreeSet<Coordinates> =
            [Coordinates::new(6, 2), Coordinates::new(5, 3)].into_iter().collect();
        assert_eq!(neighbour_coords(&world, Coordinates::new(6, 3)), expected);
        assert!(world.city_at(Coordinates::new(7, 3)).is_none());
    }

    #[test]
    fn adjacency_is_symmetric() {
        let Ok(world) = WorldMap::build(&europe(), 10, 1_000_000) else {
            panic!("europe should build");
        };
        for (index, city) in world.cities() {
            for neighbour in city.neighbours() {
                let back = world.city(*neighbour).map(|n| n.neighbours().contains(&index));
                assert_eq!(back, Some(true), "asymmetric link at {}", city.coordinates());
            }
        }
    }

    #[test]
    fn single_cell_country_has_no_neighbours() {
        let Ok(world) = WorldMap::build(&case(&[("Luxembourg", 1, 1, 1, 1)]), 10, 1_000_000) else {
            panic!("luxembourg should build");
        };
        assert_eq!(world.city_count(), 1);
        assert_eq!(world.city_at(Coordinates::new(1, 1)).map(City::neighbour_count), Some(0));
        assert!(world.country_is_complete(CountryIndex::new(0)));
    }

    #[test]
    fn whole_grid_country_has_internal_neighbours() {
        let Ok(world) = WorldMap::build(&case(&[("Pangaea", 1, 1, 10, 10)]), 10, 1_000_000) else {
            panic!("pangaea should build");
        };
        assert_eq!(world.city_count(), 100);
        assert_eq!(world.city_at(Coordinates::new(5, 5)).map(City::neighbour_count), Some(4));
        assert_eq!(world.city_at(Coordinates::new(10, 10)).map(City::neighbour_count), Some(2));
    }

    #[test]
    fn overlapping_rectangles_are_rejected() {
        let result = WorldMap::build(
            &case(&[("A", 1, 1, 3, 3), ("B", 3, 3, 4, 4)]),
            10,
            1_000_000,
        );
        assert_eq!(
            result.err(),
            Some(WorldError::CellOccupied {
                coordinates: Coordinates::new(3, 3),
                owner: CountryName::from("A"),
                claimant: CountryName::from("B"),
            })
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = WorldMap::build(&case(&[("A", 1, 1, 1, 1), ("A", 3, 3, 3, 3)]), 10, 1);
        assert_eq!(
            result.err(),
            Some(WorldError::DuplicateCountry(CountryName::from("A")))
        );
    }

    #[test]
    fn out_of_grid_and_inverted_bounds_are_rejected() {
        let outside = WorldMap::build(&case(&[("A", 1, 1, 11, 1)]), 10, 1);
        assert!(matches!(outside, Err(WorldError::OutOfGrid { grid_size: 10, .. })));

        let inverted = WorldMap::build(&case(&[("A", 4, 1, 2, 1)]), 10, 1);
        assert!(matches!(inverted, Err(WorldError::MalformedBounds { .. })));

        let empty = WorldMap::build(&CaseSpec::default(), 10, 1);
        assert_eq!(empty.err(), Some(WorldError::EmptyCase));
    }

    #[test]
    fn totals_match_initial_supply() {
        let Ok(world) = WorldMap::build(&europe(), 10, 1_000_000) else {
            panic!("europe should build");
        };
        let totals = world.currency_totals().ok();
        assert_eq!(totals.as_ref().and_then(|t| t.get(CurrencyId::new(0))), Some(12_000_000));
        assert_eq!(totals.as_ref().and_then(|t| t.get(CurrencyId::new(2))), Some(4_000_000));
    }

    #[test]
    fn cell_offset_is_row_major() {
        assert_eq!(cell_offset(10, Coordinates::new(1, 1)), Some(0));
        assert_eq!(cell_offset(10, Coordinates::new(10, 1)), Some(9));
        assert_eq!(cell_offset(10, Coordinates::new(1, 2)), Some(10));
        assert_eq!(cell_offset(10, Coordinates::new(0, 2)), None);
        assert_eq!(cell_offset(10, Coordinates::new(3, 11)), None);
    }
}
