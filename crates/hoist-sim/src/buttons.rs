//! Random button presses: hallway calls in rounds and in-cab destinations.

use std::time::Duration;

use hoist_core::{CallSource, DestinationPanel, Work};
use hoist_types::{BuildingConfig, Direction, Floor, HallCall};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Hallway calls arriving in a fixed number of rounds.
///
/// Each time the dispatcher runs dry one round of 1..=`max_per_round` calls
/// is returned; once every round is used up the source answers
/// [`Work::NoMoreWork`].
#[derive(Debug, Clone)]
pub struct RandomCalls {
    rng: StdRng,
    min_floor: Floor,
    max_floor: Floor,
    rounds_left: usize,
    max_per_round: usize,
}

impl RandomCalls {
    pub fn new(config: &BuildingConfig, seed: u64, rounds: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            min_floor: config.min_floor,
            max_floor: config.max_floor,
            rounds_left: rounds,
            max_per_round: config.max_simultaneous_calls(),
        }
    }

    /// Cap the number of calls per round.  Never below one.
    pub fn with_max_per_round(mut self, max: usize) -> Self {
        self.max_per_round = max.max(1);
        self
    }

    pub fn rounds_left(&self) -> usize {
        self.rounds_left
    }

    fn call(&mut self) -> HallCall {
        let floor = self.rng.gen_range(self.min_floor..=self.max_floor);
        let direction = if self.rng.gen_bool(0.5) {
            Direction::Up
        } else {
            Direction::Down
        };
        HallCall::new(floor, direction)
    }
}

impl CallSource for RandomCalls {
    fn request_more_work(&mut self) -> Work {
        if self.rounds_left == 0 {
            return Work::NoMoreWork;
        }
        self.rounds_left -= 1;
        let count = self.rng.gen_range(1..=self.max_per_round);
        let calls: Vec<HallCall> = (0..count).map(|_| self.call()).collect();
        debug!(count, rounds_left = self.rounds_left, "generated hallway calls");
        Work::Calls(calls)
    }
}

/// Destination buttons pressed at random.
///
/// At each stop up to `max_per_stop` floors are pressed, each with
/// probability `press_chance`.  A session-wide budget bounds the total number
/// of presses so a simulation always winds down.
#[derive(Debug, Clone)]
pub struct RandomPanel {
    rng: StdRng,
    min_floor: Floor,
    max_floor: Floor,
    press_chance: f64,
    max_per_stop: usize,
    budget: usize,
}

impl RandomPanel {
    pub fn new(config: &BuildingConfig, seed: u64, budget: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            min_floor: config.min_floor,
            max_floor: config.max_floor,
            press_chance: 0.5,
            max_per_stop: 2,
            budget,
        }
    }

    pub fn with_press_chance(mut self, chance: f64) -> Self {
        self.press_chance = if chance.is_nan() { 0.0 } else { chance.clamp(0.0, 1.0) };
        self
    }

    pub fn with_max_per_stop(mut self, max: usize) -> Self {
        self.max_per_stop = max;
        self
    }

    /// Presses left before the panel goes quiet.
    pub fn budget(&self) -> usize {
        self.budget
    }
}

impl DestinationPanel for RandomPanel {
    fn collect_selections(&mut self, floor: Floor, _timeout: Duration) -> Vec<Floor> {
        let mut pressed = Vec::new();
        for _ in 0..self.max_per_stop {
            if self.budget == 0 {
                break;
            }
            if self.rng.gen_bool(self.press_chance) {
                let target = self.rng.gen_range(self.min_floor..=self.max_floor);
                if target != floor {
                    pressed.push(target);
                    self.budget -= 1;
                }
            }
        }
        pressed
    }
}
