//! Per-city balance ledger and conservation checks for the Euro Diffusion
//! simulation.
//!
//! Every city owns one [`CityLedger`]: a visible balance per currency plus a
//! staging area for amounts received during the current day. Diffusion is
//! simultaneous across the whole grid, so incoming amounts are only folded
//! into visible balances when the day commits.
//!
//! # Modules
//!
//! - [`ledger`] -- The [`CityLedger`] struct: initialise, debit, stage, commit.
//! - [`conservation`] -- Per-currency totals and the conservation check.
//!
//! # Conservation Law
//!
//! Diffusion moves currency between cities and never creates or destroys
//! it. For every day D and every currency C:
//!
//! ```text
//! sum(balance of C over all cities after D) == sum(balance of C before D)
//! ```
//!
//! A violation produces a [`LedgerAnomaly`]. The ledger never panics; it
//! returns errors.
//!
//! # Usage
//!
//! ```
//! use eurodiff_ledger::{CityLedger, CurrencyId};
//!
//! let own = CurrencyId::new(0);
//! let foreign = CurrencyId::new(1);
//!
//! let mut ledger = CityLedger::new(2, own, 1_000_000).ok();
//! if let Some(ledger) = ledger.as_mut() {
//!     ledger.debit(own, 2_000).ok();
//!     ledger.stage_incoming(foreign, 1_000).ok();
//!     assert_eq!(ledger.balance(foreign), Some(0));
//!     ledger.commit().ok();
//!     assert_eq!(ledger.balance(foreign), Some(1_000));
//!     assert!(ledger.is_complete());
//! }
//! ```

pub mod conservation;
pub mod ledger;

// Re-export primary types at crate root.
pub use conservation::{ConservationResult, CurrencyTotals};
pub use ledger::CityLedger;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Currency identifier
// ---------------------------------------------------------------------------

/// Index of a currency within one case.
///
/// Currencies are numbered by the declaration order of the countries that
/// issue them, so `CurrencyId(i)` belongs to the `i`-th declared country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CurrencyId(usize);

impl CurrencyId {
    /// Create a currency identifier from a country declaration index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the country declaration index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl core::fmt::Display for CurrencyId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "currency#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when operating on a ledger.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The currency does not exist in this case.
    #[error("unknown currency {currency} (case has {currency_count} currencies)")]
    UnknownCurrency {
        /// The requested currency.
        currency: CurrencyId,
        /// Number of currencies the ledger tracks.
        currency_count: usize,
    },

    /// An outgoing amount exceeds the visible balance.
    #[error("insufficient balance for {currency}: requested {requested}, available {available}")]
    InsufficientBalance {
        /// The currency being debited.
        currency: CurrencyId,
        /// Amount requested.
        requested: u64,
        /// Visible balance at the time of the request.
        available: u64,
    },

    /// A balance or staged amount would exceed `u64::MAX`.
    #[error("arithmetic overflow in ledger for {currency}")]
    ArithmeticOverflow {
        /// The currency whose balance overflowed.
        currency: CurrencyId,
    },

    /// Two totals being compared track a different number of currencies.
    #[error("currency count mismatch: {left} vs {right}")]
    CurrencyCountMismatch {
        /// Currency count of the first operand.
        left: usize,
        /// Currency count of the second operand.
        right: usize,
    },
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A conservation law violation detected after a simulated day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAnomaly {
    /// The day after which the anomaly was detected.
    pub day: u64,
    /// Per-currency imbalance: (`total_before`, `total_after`) for each
    /// currency whose total changed.
    pub imbalances: BTreeMap<CurrencyId, (u64, u64)>,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
