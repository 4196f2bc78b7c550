//! Sweep ("look") scheduling.
//!
//! The car keeps moving in one direction and serves every request ahead of
//! it before it reverses.  A trip is described by a [`VisitPlan`]: the
//! direction that drives it plus the stops still to visit, ordered in travel
//! order.
//!
//! # Algorithm
//!
//! 1. **Dispatch** – a pending hallway call fixes the trip direction.  Every
//!    call between the car and the extreme floor in that direction that asks
//!    for the same direction joins the plan and leaves the pending queue
//!    ([`collect_same_direction_calls`]).
//! 2. **Fold in** – after each stop, lit panel buttons ahead of the car are
//!    merged into the plan ([`fold_in_on_the_way_stops`]).
//! 3. **Reverse** – when the plan runs dry the direction flips and panel
//!    buttons are folded in once more for the new direction.  If that finds
//!    nothing the trip is over.

use std::collections::{BTreeSet, VecDeque};

use hoist_types::{BuildingConfig, Direction, Floor};
use tracing::debug;

use crate::registry::RequestRegistry;

/// Order `candidates` in travel order for `direction`: ascending going up,
/// descending going down.  Duplicates collapse.
pub fn build_visit_sequence(
    candidates: impl IntoIterator<Item = Floor>,
    direction: Direction,
) -> VecDeque<Floor> {
    let sorted: BTreeSet<Floor> = candidates.into_iter().collect();
    match direction {
        Direction::Up => sorted.into_iter().collect(),
        Direction::Down => sorted.into_iter().rev().collect(),
    }
}

/// Hallway calls from `current_floor` (inclusive) toward the extreme floor in
/// `direction` that ask for `direction`.  Held floors are left alone.
///
/// The matching floors are removed from the registry's pending queue once the
/// scan is complete; their calls stay recorded until the car arrives.
pub fn collect_same_direction_calls(
    config: &BuildingConfig,
    registry: &mut RequestRegistry,
    current_floor: Floor,
    direction: Direction,
) -> Vec<Floor> {
    let found: Vec<Floor> = config
        .sweep(current_floor, direction)
        .into_iter()
        .filter(|&f| registry.active_call(f).is_some_and(|c| c.matches(direction)))
        .collect();
    registry.remove_all_from_pending(&found);
    debug!(current_floor, %direction, ?found, "collected same-direction calls");
    found
}

/// Floors with a lit panel button from `current_floor` (inclusive) toward the
/// extreme floor in `direction`.
pub fn fold_in_on_the_way_stops(
    config: &BuildingConfig,
    registry: &RequestRegistry,
    current_floor: Floor,
    direction: Direction,
) -> Vec<Floor> {
    config
        .sweep(current_floor, direction)
        .into_iter()
        .filter(|&f| registry.is_panel_lit(f))
        .collect()
}

/// The live visiting sequence of one trip.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitPlan {
    direction: Direction,
    stops: VecDeque<Floor>,
}

impl VisitPlan {
    pub fn new(direction: Direction, candidates: impl IntoIterator<Item = Floor>) -> Self {
        Self {
            direction,
            stops: build_visit_sequence(candidates, direction),
        }
    }

    /// Build the opening plan for a dispatched call at `seed_floor`.
    ///
    /// The plan contains the seed floor plus every same-direction call on the
    /// way; those floors are removed from the pending queue.  Returns `None`
    /// when the registry has no call recorded for `seed_floor`.
    pub fn dispatch(
        config: &BuildingConfig,
        registry: &mut RequestRegistry,
        current_floor: Floor,
        seed_floor: Floor,
    ) -> Option<Self> {
        let direction = registry.call(seed_floor)?.direction;
        let mut candidates = collect_same_direction_calls(config, registry, current_floor, direction);
        candidates.push(seed_floor);
        Some(Self::new(direction, candidates))
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn stops(&self) -> &VecDeque<Floor> {
        &self.stops
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn next_stop(&mut self) -> Option<Floor> {
        self.stops.pop_front()
    }

    /// Merge `extra` stops into the plan and restore travel order.  Returns
    /// `true` when at least one new floor was added.
    pub fn merge(&mut self, extra: impl IntoIterator<Item = Floor>) -> bool {
        let before = self.stops.len();
        for floor in extra {
            if !self.stops.contains(&floor) {
                self.stops.push_back(floor);
            }
        }
        if self.stops.len() == before {
            return false;
        }
        self.stops = build_visit_sequence(std::mem::take(&mut self.stops), self.direction);
        true
    }

    /// Flip the trip direction.  Remaining stops, if any, are re-sorted.
    pub fn reverse(&mut self) {
        self.direction = self.direction.flip();
        self.stops = build_visit_sequence(std::mem::take(&mut self.stops), self.direction);
    }
}
