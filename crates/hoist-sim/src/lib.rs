//! `hoist-sim` – seeded random collaborators for headless runs.
//!
//! Everything here implements the collaborator traits of `hoist-core` with a
//! seeded [`StdRng`][rand::rngs::StdRng], so a simulation is fully
//! reproducible from its seed.  Useful for CI, soak tests and the CLI's
//! `simulate` mode.
//!
//! # Example
//!
//! ```rust
//! use hoist_core::SessionState;
//! use hoist_sim::SimBuilder;
//! use hoist_types::BuildingConfig;
//!
//! let mut elevator = SimBuilder::new(BuildingConfig::default(), 42)
//!     .with_rounds(3)
//!     .build()
//!     .expect("default config is valid");
//! elevator.run();
//! assert_eq!(elevator.state(), SessionState::Parked);
//! ```

pub mod buttons;
pub mod passengers;

pub use buttons::{RandomCalls, RandomPanel};
pub use passengers::{AgeBand, RandomPassengers};

use hoist_core::{Clock, Collaborators, Elevator, TripObserver};
use hoist_types::{BuildingConfig, HoistError};

/// Number of call rounds when none is configured.
pub const DEFAULT_ROUNDS: usize = 5;

/// Upper bound on calls generated per round.
pub const DEFAULT_CALLS_PER_ROUND: usize = 4;

/// Wires the random collaborators into an [`Elevator`].
///
/// Each collaborator gets its own stream derived from the seed, so changing
/// one knob (say, the number of rounds) does not reshuffle the riders.
pub struct SimBuilder {
    config: BuildingConfig,
    seed: u64,
    rounds: usize,
    calls_per_round: usize,
    panel_budget: Option<usize>,
    exit_chance: Option<f64>,
    clock: Option<Box<dyn Clock>>,
    observers: Vec<Box<dyn TripObserver>>,
}

impl SimBuilder {
    pub fn new(config: BuildingConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            rounds: DEFAULT_ROUNDS,
            calls_per_round: DEFAULT_CALLS_PER_ROUND,
            panel_budget: None,
            exit_chance: None,
            clock: None,
            observers: Vec::new(),
        }
    }

    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_calls_per_round(mut self, max: usize) -> Self {
        self.calls_per_round = max;
        self
    }

    /// Total destination presses allowed.  Defaults to three per round.
    pub fn with_panel_budget(mut self, budget: usize) -> Self {
        self.panel_budget = Some(budget);
        self
    }

    pub fn with_exit_chance(mut self, chance: f64) -> Self {
        self.exit_chance = Some(chance);
        self
    }

    /// Pace the run with `clock` instead of returning instantly.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn TripObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Build the collaborator bundle only.
    pub fn collaborators(self) -> Collaborators {
        self.split().1
    }

    /// Build a ready-to-run elevator.
    ///
    /// # Errors
    ///
    /// [`HoistError::InvalidConfig`] when the building configuration is
    /// invalid.
    pub fn build(self) -> Result<Elevator, HoistError> {
        let (config, collab) = self.split();
        Elevator::new(config, collab)
    }

    fn split(self) -> (BuildingConfig, Collaborators) {
        let config = self.config;
        let seed = self.seed;
        let budget = self.panel_budget.unwrap_or(self.rounds.saturating_mul(3));

        let calls = RandomCalls::new(&config, seed, self.rounds).with_max_per_round(self.calls_per_round);
        let panel = RandomPanel::new(&config, seed.wrapping_add(1), budget);
        let mut passengers = RandomPassengers::new(seed.wrapping_add(2));
        if let Some(chance) = self.exit_chance {
            passengers = passengers.with_exit_chance(chance);
        }

        let mut collab = Collaborators::new(Box::new(calls), Box::new(panel), Box::new(passengers));
        if let Some(clock) = self.clock {
            collab = collab.with_clock(clock);
        }
        for observer in self.observers {
            collab = collab.with_observer(observer);
        }
        (config, collab)
    }
}
