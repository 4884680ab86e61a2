//! Conservation law verification across a case's ledgers.
//!
//! Diffusion only moves currency between cities. Snapshotting the
//! per-currency totals before and after a day and comparing them detects any
//! step that created or destroyed currency, including the floor-rounding
//! remainder, which must stay with the sender.
//!
//! A violation produces a [`LedgerAnomaly`].

use std::collections::BTreeMap;

use tracing::warn;

use crate::ledger::CityLedger;
use crate::{CurrencyId, LedgerAnomaly, LedgerError};

/// The result of a conservation check for a single day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationResult {
    /// Every currency total is unchanged.
    Balanced,
    /// One or more currency totals changed.
    Anomaly(LedgerAnomaly),
}

/// Sum of visible balances per currency over a set of ledgers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyTotals {
    /// Total per currency, indexed by [`CurrencyId`].
    totals: Vec<u64>,
}

impl CurrencyTotals {
    /// Sum the visible balances of every ledger.
    ///
    /// Staged amounts are not included, so totals are only meaningful
    /// outside the stage/commit window.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CurrencyCountMismatch`] if the ledgers track a
    /// different number of currencies, or [`LedgerError::ArithmeticOverflow`].
    pub fn collect<'a>(
        currency_count: usize,
        ledgers: impl IntoIterator<Item = &'a CityLedger>,
    ) -> Result<Self, LedgerError> {
        let mut totals = vec![0_u64; currency_count];
        for ledger in ledgers {
            if ledger.currency_count() != currency_count {
                return Err(LedgerError::CurrencyCountMismatch {
                    left: currency_count,
                    right: ledger.currency_count(),
                });
            }
            for (total, (currency, amount)) in totals.iter_mut().zip(ledger.balances()) {
                *total = total
                    .checked_add(amount)
                    .ok_or(LedgerError::ArithmeticOverflow { currency })?;
            }
        }
        Ok(Self { totals })
    }

    /// Total for `currency`, or `None` if the currency is unknown.
    pub fn get(&self, currency: CurrencyId) -> Option<u64> {
        self.totals.get(currency.index()).copied()
    }

    /// Number of currencies tracked.
    pub const fn currency_count(&self) -> usize {
        self.totals.len()
    }

    /// Iterate over totals in currency order.
    pub fn iter(&self) -> impl Iterator<Item = (CurrencyId, u64)> + '_ {
        self.totals
            .iter()
            .enumerate()
            .map(|(index, total)| (CurrencyId::new(index), *total))
    }
}

/// Verify that no currency total changed across `day`.
///
/// Totals with a different currency count are reported as an anomaly on
/// every currency of the longer snapshot.
pub fn verify_conservation(
    day: u64,
    before: &CurrencyTotals,
    after: &CurrencyTotals,
) -> ConservationResult {
    let mut imbalances: BTreeMap<CurrencyId, (u64, u64)> = BTreeMap::new();

    let count = before.currency_count().max(after.currency_count());
    for index in 0..count {
        let currency = CurrencyId::new(index);
        let total_before = before.get(currency);
        let total_after = after.get(currency);
        if total_before != total_after {
            imbalances.insert(
                currency,
                (total_before.unwrap_or(0), total_after.unwrap_or(0)),
            );
        }
    }

    if imbalances.is_empty() {
        return ConservationResult::Balanced;
    }

    let count = imbalances.len();
    warn!(day, currencies = count, "conservation law violated");
    ConservationResult::Anomaly(LedgerAnomaly {
        day,
        imbalances,
        message: format!(
            "LEDGER_ANOMALY after day {day}: conservation law violated for {count} currency(ies)",
        ),
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn ledgers(count: usize) -> Vec<CityLedger> {
        (0..count)
            .filter_map(|i| CityLedger::new(count, CurrencyId::new(i), 1_000_000).ok())
            .collect()
    }

    #[test]
    fn totals_sum_every_city() {
        let cities = ledgers(3);
        let totals = CurrencyTotals::collect(3, &cities);
        assert!(totals.is_ok());
        let totals = totals.unwrap_or(CurrencyTotals { totals: Vec::new() });
        assert_eq!(totals.get(CurrencyId::new(0)), Some(1_000_000));
        assert_eq!(totals.get(CurrencyId::new(2)), Some(1_000_000));
        assert_eq!(totals.iter().count(), 3);
    }

    #[test]
    fn mismatched_ledger_is_rejected() {
        let cities = ledgers(2);
        let result = CurrencyTotals::collect(3, &cities);
        assert_eq!(
            result,
            Err(LedgerError::CurrencyCountMismatch { left: 3, right: 2 })
        );
    }

    #[test]
    fn moving_currency_is_balanced() {
        let mut cities = ledgers(2);
        let before = CurrencyTotals::collect(2, &cities).ok();

        let own = CurrencyId::new(0);
        if let [sender, receiver] = cities.as_mut_slice() {
            assert!(sender.debit(own, 1_000).is_ok());
            assert!(receiver.stage_incoming(own, 1_000).is_ok());
            assert!(receiver.commit().is_ok());
        }

        let after = CurrencyTotals::collect(2, &cities).ok();
        if let (Some(before), Some(after)) = (before, after) {
            assert_eq!(verify_conservation(1, &before, &after), ConservationResult::Balanced);
        } else {
            panic!("totals should be collectable");
        }
    }

    #[test]
    fn destroyed_currency_is_an_anomaly() {
        let mut cities = ledgers(2);
        let before = CurrencyTotals::collect(2, &cities).ok();

        let own = CurrencyId::new(0);
        if let Some(sender) = cities.first_mut() {
            assert!(sender.debit(own, 1_000).is_ok());
        }

        let after = CurrencyTotals::collect(2, &cities).ok();
        let (Some(before), Some(after)) = (before, after) else {
            panic!("totals should be collectable");
        };
        match verify_conservation(7, &before, &after) {
            ConservationResult::Anomaly(anomaly) => {
                assert_eq!(anomaly.day, 7);
                assert_eq!(anomaly.imbalances.get(&own), Some(&(1_000_000, 999_000)));
                assert!(anomaly.to_string().contains("day 7"));
            }
            ConservationResult::Balanced => panic!("expected an anomaly"),
        }
    }

    proptest! {
        #[test]
        fn transfers_between_two_ledgers_conserve(
            debits in proptest::collection::vec(0_u64..5_000, 1..50)
        ) {
            let mut cities = ledgers(2);
            let before = CurrencyTotals::collect(2, &cities).ok();
            let own = CurrencyId::new(0);

            for amount in debits {
                if let [sender, receiver] = cities.as_mut_slice()
                    && sender.debit(own, amount).is_ok()
                {
                    prop_assert!(receiver.stage_incoming(own, amount).is_ok());
                    prop_assert!(receiver.commit().is_ok());
                }
            }

            let after = CurrencyTotals::collect(2, &cities).ok();
            prop_assert!(before.is_some() && after.is_some());
            if let (Some(before), Some(after)) = (before, after) {
                prop_assert_eq!(verify_conservation(1, &before, &after), ConservationResult::Balanced);
            }
        }
    }
}
