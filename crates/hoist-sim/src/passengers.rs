//! Random riders.
//!
//! People are drawn from four age bands, each with its own weight and height
//! range.  At every stop each rider independently decides whether to get off.

use std::ops::RangeInclusive;

use hoist_core::PassengerSource;
use hoist_types::{Floor, Occupant};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Largest group that boards at a floor without recorded callers.
pub const MAX_GROUP_SIZE: usize = 5;

/// Chance that a rider leaves the car at any given stop.
pub const EXIT_CHANCE: f64 = 0.25;

/// Oldest age a generated rider can have.
pub const MAX_AGE: u32 = 99;

/// Age bands with their body measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBand {
    Infant,
    Toddler,
    Child,
    Adult,
}

impl AgeBand {
    pub fn for_age(age: u32) -> Self {
        match age {
            0 => AgeBand::Infant,
            1..=6 => AgeBand::Toddler,
            7..=14 => AgeBand::Child,
            _ => AgeBand::Adult,
        }
    }

    /// Pounds.
    pub fn weight_range(self) -> RangeInclusive<u32> {
        match self {
            AgeBand::Infant => 0..=15,
            AgeBand::Toddler => 15..=50,
            AgeBand::Child => 50..=120,
            AgeBand::Adult => 100..=350,
        }
    }

    /// Inches.
    pub fn height_range(self) -> RangeInclusive<u32> {
        match self {
            AgeBand::Infant => 12..=24,
            AgeBand::Toddler => 20..=50,
            AgeBand::Child => 40..=60,
            AgeBand::Adult => 40..=90,
        }
    }
}

/// A [`PassengerSource`] backed by a seeded RNG.
///
/// # Example
///
/// ```rust
/// use hoist_core::PassengerSource;
/// use hoist_sim::RandomPassengers;
///
/// let mut a = RandomPassengers::new(7);
/// let mut b = RandomPassengers::new(7);
/// assert_eq!(a.generate_group(), b.generate_group());
/// ```
#[derive(Debug, Clone)]
pub struct RandomPassengers {
    rng: StdRng,
    exit_chance: f64,
}

impl RandomPassengers {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            exit_chance: EXIT_CHANCE,
        }
    }

    /// Override the per-stop exit probability (clamped to `0.0..=1.0`).
    pub fn with_exit_chance(mut self, chance: f64) -> Self {
        self.exit_chance = if chance.is_nan() { EXIT_CHANCE } else { chance.clamp(0.0, 1.0) };
        self
    }

    /// One random person.
    pub fn occupant(&mut self) -> Occupant {
        let age = self.rng.gen_range(0..=MAX_AGE);
        let band = AgeBand::for_age(age);
        Occupant {
            age,
            height: self.rng.gen_range(band.height_range()),
            weight: self.rng.gen_range(band.weight_range()),
        }
    }
}

impl PassengerSource for RandomPassengers {
    fn generate_group(&mut self) -> Vec<Occupant> {
        let size = self.rng.gen_range(1..=MAX_GROUP_SIZE);
        (0..size).map(|_| self.occupant()).collect()
    }

    fn decide_offboarders(&mut self, _floor: Floor, occupants: &[Occupant]) -> Vec<usize> {
        let chance = self.exit_chance;
        (0..occupants.len())
            .filter(|_| self.rng.gen_bool(chance))
            .collect()
    }
}
