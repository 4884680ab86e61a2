//! The per-city ledger: visible balances plus a staging area.
//!
//! # Design
//!
//! - **Dense balances**: one visible entry per currency in the case, so the
//!   "every currency present, defaulting to 0" invariant holds by
//!   construction.
//! - **Sparse staging**: amounts received during a day accumulate in a
//!   [`BTreeMap`] that is empty outside the stage/commit window.
//! - **Checked arithmetic**: debits never underflow, credits never overflow.

use std::collections::BTreeMap;

use crate::{CurrencyId, LedgerError};

/// Balances of a single city.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityLedger {
    /// Visible balance per currency, indexed by [`CurrencyId`].
    balances: Vec<u64>,
    /// Amounts received this day and not yet visible.
    staged: BTreeMap<CurrencyId, u64>,
}

impl CityLedger {
    /// Initialise a ledger for a case with `currency_count` currencies.
    ///
    /// The city's own currency starts at `initial_balance`; every other
    /// currency starts at 0.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownCurrency`] if `own_currency` is not one
    /// of the case's currencies.
    pub fn new(
        currency_count: usize,
        own_currency: CurrencyId,
        initial_balance: u64,
    ) -> Result<Self, LedgerError> {
        let mut balances = vec![0_u64; currency_count];
        let slot = balances
            .get_mut(own_currency.index())
            .ok_or(LedgerError::UnknownCurrency {
                currency: own_currency,
                currency_count,
            })?;
        *slot = initial_balance;

        Ok(Self {
            balances,
            staged: BTreeMap::new(),
        })
    }

    /// Number of currencies tracked.
    pub const fn currency_count(&self) -> usize {
        self.balances.len()
    }

    /// Visible balance of `currency`, or `None` if the currency is unknown.
    pub fn balance(&self, currency: CurrencyId) -> Option<u64> {
        self.balances.get(currency.index()).copied()
    }

    /// Iterate over visible balances in currency order.
    pub fn balances(&self) -> impl Iterator<Item = (CurrencyId, u64)> + '_ {
        self.balances
            .iter()
            .enumerate()
            .map(|(index, amount)| (CurrencyId::new(index), *amount))
    }

    /// Amount staged for `currency` and not yet committed.
    pub fn staged(&self, currency: CurrencyId) -> u64 {
        self.staged.get(&currency).copied().unwrap_or(0)
    }

    /// Returns `true` while incoming amounts are waiting to be committed.
    pub fn has_staged(&self) -> bool {
        !self.staged.is_empty()
    }

    /// Returns `true` when every visible balance is strictly positive.
    pub fn is_complete(&self) -> bool {
        self.balances.iter().all(|amount| *amount > 0)
    }

    /// Remove an outgoing amount from the visible balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientBalance`] when `amount` exceeds
    /// the visible balance, or [`LedgerError::UnknownCurrency`].
    pub fn debit(&mut self, currency: CurrencyId, amount: u64) -> Result<(), LedgerError> {
        let currency_count = self.balances.len();
        let slot = self
            .balances
            .get_mut(currency.index())
            .ok_or(LedgerError::UnknownCurrency {
                currency,
                currency_count,
            })?;
        *slot = slot
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                currency,
                requested: amount,
                available: *slot,
            })?;
        Ok(())
    }

    /// Stage an incoming amount. Staged amounts for the same currency add up.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownCurrency`] or
    /// [`LedgerError::ArithmeticOverflow`].
    pub fn stage_incoming(&mut self, currency: CurrencyId, amount: u64) -> Result<(), LedgerError> {
        if currency.index() >= self.balances.len() {
            return Err(LedgerError::UnknownCurrency {
                currency,
                currency_count: self.balances.len(),
            });
        }
        if amount == 0 {
            return Ok(());
        }
        let slot = self.staged.entry(currency).or_insert(0);
        *slot = slot
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow { currency })?;
        Ok(())
    }

    /// Fold every staged amount into the visible balances and clear the
    /// staging area. No-op when nothing is staged.
    ///
    /// On error the visible balances are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ArithmeticOverflow`] if a balance would exceed
    /// `u64::MAX`.
    pub fn commit(&mut self) -> Result<(), LedgerError> {
        if self.staged.is_empty() {
            return Ok(());
        }

        let mut updated = self.balances.clone();
        for (currency, amount) in &self.staged {
            let slot = updated
                .get_mut(currency.index())
                .ok_or(LedgerError::UnknownCurrency {
                    currency: *currency,
                    currency_count: self.balances.len(),
                })?;
            *slot = slot
                .checked_add(*amount)
                .ok_or(LedgerError::ArithmeticOverflow {
                    currency: *currency,
                })?;
        }

        self.balances = updated;
        self.staged.clear();
        Ok(())
    }
}
