//! Per-case simulation driver.
//!
//! A [`CaseSimulation`] owns one case's world and day clock and walks the
//! state machine `Running -> Complete | CeilingReached`:
//!
//! - A case with a single country is complete on construction, with
//!   completion day 1 and no diffusion.
//! - Otherwise each [`CaseSimulation::step`] advances the clock, diffuses
//!   one day, optionally checks currency conservation, and records the
//!   current day for every country that has just become complete.
//! - The machine stops once every country is recorded, or once the last
//!   permitted day has been simulated. Countries still unrecorded at that
//!   point are reported as [`CompletionDay::Never`].

use eurodiff_ledger::conservation::verify_conservation;
use eurodiff_ledger::{ConservationResult, CurrencyTotals, LedgerAnomaly, LedgerError};
use eurodiff_types::{CaseOutcome, CaseSpec, CompletionDay, CompletionRecord, SimulationPhase};
use eurodiff_world::{CountryIndex, WorldError, WorldMap};
use tracing::{error, info, trace, warn};

use crate::clock::{ClockError, DayClock};
use crate::config::SimulationConfig;
use crate::diffusion::{self, DayReport, DiffusionError};

/// Errors that can occur while simulating a case.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The case could not be turned into a world.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// A ledger query failed.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },

    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A diffusion step failed.
    #[error("diffusion error: {source}")]
    Diffusion {
        /// The underlying diffusion error.
        #[from]
        source: DiffusionError,
    },

    /// Currency totals changed across a day.
    #[error("conservation violated: {anomaly}")]
    Conservation {
        /// What changed and by how much.
        anomaly: LedgerAnomaly,
    },
}

/// The simulation of a single case.
#[derive(Debug)]
pub struct CaseSimulation {
    /// Cities, countries, and balances.
    world: WorldMap,
    /// Day counter with the ceiling.
    clock: DayClock,
    /// Coins per transferred unit.
    representative_portion: u64,
    /// Check per-currency totals after every day.
    verify_conservation: bool,
    /// Completion day per country, indexed like `world.countries()`.
    completion: Vec<Option<u64>>,
    /// Current state machine phase.
    phase: SimulationPhase,
}

impl CaseSimulation {
    /// Build the world for `case` and position the clock at day 0.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::World`] if the case is not a valid layout
    /// on the configured grid, or [`SimulationError::Clock`] for a zero
    /// day ceiling.
    pub fn new(case: &CaseSpec, config: &SimulationConfig) -> Result<Self, SimulationError> {
        let world = WorldMap::build(case, config.grid.size, config.diffusion.initial_balance)?;
        let clock = DayClock::new(config.diffusion.max_days)?;

        let mut completion = vec![None; world.country_count()];
        let mut phase = SimulationPhase::Running;

        // A lone country already holds every currency there is.
        if let [only] = completion.as_mut_slice() {
            *only = Some(1);
            phase = SimulationPhase::Complete;
        }

        Ok(Self {
            world,
            clock,
            representative_portion: config.diffusion.representative_portion,
            verify_conservation: config.diffusion.verify_conservation,
            completion,
            phase,
        })
    }

    /// Current phase of the state machine.
    pub const fn phase(&self) -> SimulationPhase {
        self.phase
    }

    /// Last simulated day (0 before the first step).
    pub const fn day(&self) -> u64 {
        self.clock.day()
    }

    /// Read-only access to the case's world.
    pub const fn world(&self) -> &WorldMap {
        &self.world
    }

    /// Simulate one day and return the resulting phase.
    ///
    /// Calling `step` on a terminal simulation is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError`] if the diffusion step fails or, with
    /// conservation checking on, if any currency total changed.
    pub fn step(&mut self) -> Result<SimulationPhase, SimulationError> {
        if self.phase.is_terminal() {
            return Ok(self.phase);
        }

        let day = self.clock.advance()?;
        let before = self.totals_if_verifying()?;

        let report = diffusion::diffuse_day(&mut self.world, day, self.representative_portion)?;

        if let Some(before) = before {
            let after = self.world.currency_totals()?;
            if let ConservationResult::Anomaly(anomaly) = verify_conservation(day, &before, &after)
            {
                error!(day, anomaly = %anomaly, "currency conservation violated");
                return Err(SimulationError::Conservation { anomaly });
            }
        }

        let newly_complete = self.record_completions(day);
        trace!(
            day,
            transfers = report.transfers,
            units_moved = report.units_moved,
            newly_complete,
            "day simulated"
        );

        self.phase = self.next_phase(&report);
        Ok(self.phase)
    }

    /// Step until the simulation reaches a terminal phase.
    ///
    /// # Errors
    ///
    /// Returns the first [`SimulationError`] raised by [`Self::step`].
    pub fn run(mut self) -> Result<CaseOutcome, SimulationError> {
        info!(
            countries = self.world.country_count(),
            cities = self.world.city_count(),
            max_days = self.clock.max_days(),
            "case simulation starting"
        );

        while !self.step()?.is_terminal() {}

        let outcome = self.outcome();
        info!(
            phase = ?outcome.phase,
            days_simulated = outcome.days_simulated,
            "case simulation finished"
        );
        Ok(outcome)
    }

    /// Completion records in declaration order, as of the current day.
    ///
    /// Countries that have not completed are reported as `never`; this is
    /// only final once the phase is terminal.
    pub fn outcome(&self) -> CaseOutcome {
        let records = self
            .world
            .countries()
            .zip(&self.completion)
            .map(|((_, country), day)| CompletionRecord {
                country: country.name().clone(),
                day: day.map_or(CompletionDay::Never, CompletionDay::Day),
            })
            .collect();

        CaseOutcome {
            records,
            days_simulated: self.clock.day(),
            phase: self.phase,
        }
    }

    fn totals_if_verifying(&self) -> Result<Option<CurrencyTotals>, SimulationError> {
        if self.verify_conservation {
            Ok(Some(self.world.currency_totals()?))
        } else {
            Ok(None)
        }
    }

    /// Record `day` for each country that just became complete and return
    /// how many did.
    fn record_completions(&mut self, day: u64) -> usize {
        let mut newly_complete: usize = 0;
        for (position, slot) in self.completion.iter_mut().enumerate() {
            if slot.is_none() && self.world.country_is_complete(CountryIndex::new(position)) {
                *slot = Some(day);
                newly_complete = newly_complete.saturating_add(1);
            }
        }
        newly_complete
    }

    fn next_phase(&self, report: &DayReport) -> SimulationPhase {
        if self.completion.iter().all(Option::is_some) {
            info!(day = report.day, "all countries complete");
            return SimulationPhase::Complete;
        }
        if self.clock.ceiling_reached() {
            let unfinished = self.completion.iter().filter(|slot| slot.is_none()).count();
            warn!(
                day = report.day,
                unfinished, "day ceiling reached with countries incomplete"
            );
            return SimulationPhase::CeilingReached;
        }
        SimulationPhase::Running
    }
}

/// Build and run a single case to its terminal phase.
///
/// # Errors
///
/// Returns [`SimulationError`] if the case is invalid or an invariant
/// breaks during the run.
pub fn simulate_case(
    case: &CaseSpec,
    config: &SimulationConfig,
) -> Result<CaseOutcome, SimulationError> {
    CaseSimulation::new(case, config)?.run()
}
