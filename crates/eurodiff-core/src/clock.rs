//! Day counter with a hard ceiling.
//!
//! The clock starts at day 0 (nothing simulated yet). Each advance moves to
//! the next day; the first simulated day is day 1. Advancing past the
//! configured ceiling fails, which is how the driver bounds runaway cases.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClockError {
    /// The ceiling has been reached; no further day may be simulated.
    #[error("day ceiling {max_days} reached")]
    CeilingReached {
        /// The configured ceiling.
        max_days: u64,
    },

    /// Invalid clock configuration.
    #[error("invalid clock configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Simulation day counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayClock {
    /// Current day (0 before the first step).
    day: u64,
    /// Last day that may be simulated.
    max_days: u64,
}

impl DayClock {
    /// Create a clock at day 0 with the given ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `max_days` is 0.
    pub fn new(max_days: u64) -> Result<Self, ClockError> {
        if max_days == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "max_days must be at least 1".to_owned(),
            });
        }
        Ok(Self { day: 0, max_days })
    }

    /// Move to the next day and return it.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::CeilingReached`] when the current day is
    /// already the ceiling. The clock does not move in that case.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        if self.ceiling_reached() {
            return Err(ClockError::CeilingReached {
                max_days: self.max_days,
            });
        }
        self.day = self.day.checked_add(1).ok_or(ClockError::CeilingReached {
            max_days: self.max_days,
        })?;
        Ok(self.day)
    }

    /// Current day (0 before the first step).
    pub const fn day(&self) -> u64 {
        self.day
    }

    /// The configured ceiling.
    pub const fn max_days(&self) -> u64 {
        self.max_days
    }

    /// Returns `true` once the last permitted day has been simulated.
    pub const fn ceiling_reached(&self) -> bool {
        self.day >= self.max_days
    }
}
