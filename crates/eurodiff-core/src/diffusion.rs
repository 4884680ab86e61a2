//! One simulated day of currency diffusion.
//!
//! For every city and every currency it holds, the city sends
//! `floor(balance / representative_portion)` coins to each neighbor. The
//! update is simultaneous across the whole grid and runs in three passes:
//!
//! 1. **Plan** -- read each city's visible (previous-day) balances, debit
//!    the outgoing amount from the sender, and record one transfer per
//!    neighbor.
//! 2. **Stage** -- deliver every planned transfer into the receiver's
//!    staging area.
//! 3. **Commit** -- fold staged amounts into visible balances for every
//!    city.
//!
//! Incoming coins are staged, never visible, until pass 3, so a city's
//! outgoing amount for currency X never depends on X received the same day.
//! The floor-rounding remainder stays with the sender. A currency whose
//! total outgoing amount would exceed the sender's balance (possible only
//! with a representative portion below the neighbor count) is not sent
//! that day.

use eurodiff_ledger::{CurrencyId, LedgerError};
use eurodiff_types::Coordinates;
use eurodiff_world::{CityIndex, WorldMap};
use tracing::trace;

/// Errors that can occur while diffusing one day.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DiffusionError {
    /// A ledger operation failed for a city.
    #[error("ledger error at city {city}: {source}")]
    Ledger {
        /// The city whose ledger failed.
        city: Coordinates,
        /// The underlying ledger error.
        source: LedgerError,
    },

    /// A neighbor index points outside the city arena.
    #[error("unknown city index {0:?}")]
    UnknownCity(CityIndex),

    /// The representative portion is zero.
    #[error("representative portion must be at least 1")]
    ZeroPortion,

    /// A transfer amount overflowed.
    #[error("arithmetic overflow while planning transfers")]
    ArithmeticOverflow,
}

/// Summary of one diffused day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayReport {
    /// The day that was simulated.
    pub day: u64,
    /// Number of (sender, neighbor, currency) transfers.
    pub transfers: u64,
    /// Total units moved, summed over all currencies.
    pub units_moved: u64,
}

/// A planned delivery of coins to one neighbor.
#[derive(Debug, Clone, Copy)]
struct Transfer {
    to: CityIndex,
    currency: CurrencyId,
    amount: u64,
}

/// The coins a city with `balance` sends to each neighbor.
///
/// Returns `None` only for a zero `portion`.
pub const fn unit_transfer(balance: u64, portion: u64) -> Option<u64> {
    balance.checked_div(portion)
}

/// Diffuse one day across every city of `world`.
///
/// # Errors
///
/// Returns [`DiffusionError`] if a ledger guard trips (overdraw, overflow),
/// the topology is inconsistent, or `portion` is zero. The world should be
/// discarded after an error: some cities may have been debited already.
pub fn diffuse_day(world: &mut WorldMap, day: u64, portion: u64) -> Result<DayReport, DiffusionError> {
    if portion == 0 {
        return Err(DiffusionError::ZeroPortion);
    }

    let transfers = plan_transfers(world, portion)?;

    let mut report = DayReport {
        day,
        ..DayReport::default()
    };

    // Pass 2: stage.
    for transfer in &transfers {
        let city = world
            .city_mut(transfer.to)
            .ok_or(DiffusionError::UnknownCity(transfer.to))?;
        let coordinates = city.coordinates();
        city.ledger_mut()
            .stage_incoming(transfer.currency, transfer.amount)
            .map_err(|source| DiffusionError::Ledger {
                city: coordinates,
                source,
            })?;

        report.transfers = report.transfers.saturating_add(1);
        report.units_moved = report.units_moved.saturating_add(transfer.amount);
    }

    // Pass 3: commit.
    for city in world.cities_mut() {
        let coordinates = city.coordinates();
        city.ledger_mut()
            .commit()
            .map_err(|source| DiffusionError::Ledger {
                city: coordinates,
                source,
            })?;
    }

    trace!(
        day,
        transfers = report.transfers,
        units_moved = report.units_moved,
        "day diffused"
    );

    Ok(report)
}

/// Pass 1: debit every sender and record what each neighbor receives.
fn plan_transfers(world: &mut WorldMap, portion: u64) -> Result<Vec<Transfer>, DiffusionError> {
    let mut transfers = Vec::new();

    for position in 0..world.city_count() {
        let index = CityIndex::new(position);
        let city = world
            .city_mut(index)
            .ok_or(DiffusionError::UnknownCity(index))?;

        let coordinates = city.coordinates();
        let neighbours = city.neighbours().to_vec();
        if neighbours.is_empty() {
            continue;
        }
        let fan_out =
            u64::try_from(neighbours.len()).map_err(|_err| DiffusionError::ArithmeticOverflow)?;

        let balances: Vec<(CurrencyId, u64)> = city.ledger().balances().collect();
        for (currency, balance) in balances {
            let unit = unit_transfer(balance, portion).ok_or(DiffusionError::ZeroPortion)?;
            if unit == 0 {
                continue;
            }

            // A small portion can ask for more than the city holds; that
            // currency stays put for the day.
            let Some(outgoing) = unit.checked_mul(fan_out).filter(|o| *o <= balance) else {
                continue;
            };
            city.ledger_mut()
                .debit(currency, outgoing)
                .map_err(|source| DiffusionError::Ledger {
                    city: coordinates,
                    source,
                })?;

            transfers.extend(neighbours.iter().map(|to| Transfer {
                to: *to,
                currency,
                amount: unit,
            }));
        }
    }

    Ok(transfers)
}
