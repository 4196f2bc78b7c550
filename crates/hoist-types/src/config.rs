//! [`BuildingConfig`] – the tunable constants of one building and its car.
//!
//! The dispatcher receives a `BuildingConfig` at construction; nothing in the
//! workspace reads these values from globals, so tests can build any number
//! of differently shaped buildings side by side.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Direction, Floor, HoistError};

/// Most floors a single car may serve.  The registry keeps one panel light
/// per floor, so the span has to stay small.
pub const MAX_FLOORS: usize = 1_000;

/// Floor bounds, weight limit and pacing constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingConfig {
    /// Lowest served floor; also the base floor the car parks at.
    #[serde(default = "default_min_floor")]
    pub min_floor: Floor,

    /// Highest served floor.
    #[serde(default = "default_max_floor")]
    pub max_floor: Floor,

    /// Load (pounds) at which the car counts as over capacity.
    #[serde(default = "default_max_weight")]
    pub max_weight: u32,

    /// Travel speed.
    #[serde(default = "default_floors_per_second")]
    pub floors_per_second: f64,

    /// Time for the doors to open or close.
    #[serde(default = "default_door_cycle_secs")]
    pub door_cycle_secs: f64,

    /// How long the doors wait for destination buttons before closing.
    #[serde(default = "default_selection_timeout_secs")]
    pub selection_timeout_secs: f64,
}

fn default_min_floor() -> Floor {
    1
}
fn default_max_floor() -> Floor {
    10
}
fn default_max_weight() -> u32 {
    2000
}
fn default_floors_per_second() -> f64 {
    2.0
}
fn default_door_cycle_secs() -> f64 {
    4.0
}
fn default_selection_timeout_secs() -> f64 {
    default_door_cycle_secs() * 3.0
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            min_floor: default_min_floor(),
            max_floor: default_max_floor(),
            max_weight: default_max_weight(),
            floors_per_second: default_floors_per_second(),
            door_cycle_secs: default_door_cycle_secs(),
            selection_timeout_secs: default_selection_timeout_secs(),
        }
    }
}

impl BuildingConfig {
    /// A building with the default pacing and the given floor range.
    pub fn with_floors(min_floor: Floor, max_floor: Floor) -> Self {
        Self {
            min_floor,
            max_floor,
            ..Self::default()
        }
    }

    /// Check the invariants the dispatcher relies on.
    ///
    /// # Errors
    ///
    /// Returns [`HoistError::InvalidConfig`] describing the first violation.
    pub fn validate(&self) -> Result<(), HoistError> {
        if self.min_floor >= self.max_floor {
            return Err(HoistError::InvalidConfig(format!(
                "min_floor ({}) must be below max_floor ({})",
                self.min_floor, self.max_floor
            )));
        }
        if self.floor_count() > MAX_FLOORS {
            return Err(HoistError::InvalidConfig(format!(
                "{} floors from {} to {} exceed the limit of {MAX_FLOORS}",
                self.floor_count(),
                self.min_floor,
                self.max_floor
            )));
        }
        if self.max_weight == 0 {
            return Err(HoistError::InvalidConfig(
                "max_weight must be greater than zero".to_string(),
            ));
        }
        if !(self.floors_per_second.is_finite() && self.floors_per_second > 0.0) {
            return Err(HoistError::InvalidConfig(format!(
                "floors_per_second must be positive, got {}",
                self.floors_per_second
            )));
        }
        for (name, secs) in [
            ("door_cycle_secs", self.door_cycle_secs),
            ("selection_timeout_secs", self.selection_timeout_secs),
        ] {
            if !(secs.is_finite() && secs >= 0.0) {
                return Err(HoistError::InvalidConfig(format!(
                    "{name} must be a non-negative number of seconds, got {secs}"
                )));
            }
        }
        Ok(())
    }

    /// The floor the car starts on and returns to when the session ends.
    pub fn base_floor(&self) -> Floor {
        self.min_floor
    }

    pub fn contains(&self, floor: Floor) -> bool {
        (self.min_floor..=self.max_floor).contains(&floor)
    }

    /// `Ok(floor)` when it is served, [`HoistError::InvalidFloor`] otherwise.
    pub fn check_floor(&self, floor: Floor) -> Result<Floor, HoistError> {
        if self.contains(floor) {
            Ok(floor)
        } else {
            Err(HoistError::InvalidFloor {
                floor,
                min: self.min_floor,
                max: self.max_floor,
            })
        }
    }

    /// Number of served floors; zero for an inverted range.
    pub fn floor_count(&self) -> usize {
        let span = i64::from(self.max_floor) - i64::from(self.min_floor) + 1;
        usize::try_from(span).unwrap_or(0)
    }

    /// Every floor from `from` (inclusive) to the extreme floor in
    /// `direction`, in travel order.
    pub fn sweep(&self, from: Floor, direction: Direction) -> Vec<Floor> {
        match direction {
            Direction::Up => (from.max(self.min_floor)..=self.max_floor).collect(),
            Direction::Down => (self.min_floor..=from.min(self.max_floor)).rev().collect(),
        }
    }

    /// Time needed to travel `floors` floors.
    pub fn travel_time(&self, floors: u32) -> Duration {
        Duration::from_secs_f64(f64::from(floors) / self.floors_per_second)
    }

    pub fn door_cycle(&self) -> Duration {
        Duration::from_secs_f64(self.door_cycle_secs)
    }

    pub fn selection_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.selection_timeout_secs)
    }

    /// Largest number of hallway calls that can be outstanding at once: two
    /// per floor except the terminals, which only have one button each.
    pub fn max_simultaneous_calls(&self) -> usize {
        (self.floor_count() * 2).saturating_sub(2)
    }
}
