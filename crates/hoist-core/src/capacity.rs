//! [`CapacityGuard`] – the car's weight interlock.
//!
//! The guard answers one question before every move: is the car at or above
//! its weight limit?  If so, [`CapacityGuard::offload_until_under_capacity`]
//! picks who has to step out: the most recently boarded occupants first,
//! since they are standing nearest the door.

use std::collections::VecDeque;

use hoist_types::Occupant;

/// Weight limit check and overload policy.
#[derive(Debug, Clone, Copy)]
pub struct CapacityGuard {
    max_weight: u32,
}

impl CapacityGuard {
    pub fn new(max_weight: u32) -> Self {
        Self { max_weight }
    }

    pub fn max_weight(&self) -> u32 {
        self.max_weight
    }

    /// Total weight of `occupants`.
    pub fn load<'a>(&self, occupants: impl IntoIterator<Item = &'a Occupant>) -> u32 {
        occupants
            .into_iter()
            .fold(0u32, |acc, o| acc.saturating_add(o.weight))
    }

    /// `true` when the load is at or above the limit.
    pub fn is_over_capacity<'a>(&self, occupants: impl IntoIterator<Item = &'a Occupant>) -> bool {
        self.load(occupants) >= self.max_weight
    }

    /// `false` for an occupant who alone reaches the limit and so can never
    /// ride without tripping the guard.
    pub fn can_ever_ride(&self, occupant: &Occupant) -> bool {
        occupant.weight < self.max_weight
    }

    /// Remove occupants from the back of the car (last boarded first) until
    /// it is no longer over capacity or nobody is left.
    ///
    /// Returns the removed occupants in removal order.  An empty car is left
    /// untouched.
    pub fn offload_until_under_capacity(&self, occupants: &mut VecDeque<Occupant>) -> Vec<Occupant> {
        let mut removed = Vec::new();
        while self.is_over_capacity(occupants.iter()) {
            match occupants.pop_back() {
                Some(o) => removed.push(o),
                None => break,
            }
        }
        removed
    }
}
