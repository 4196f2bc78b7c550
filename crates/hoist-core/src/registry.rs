//! [`RequestRegistry`] – pending hallway calls and in-cab panel lights.
//!
//! The registry is pure data plus mutators that keep two invariants:
//!
//! - every floor in the pending queue or the held set has a [`Call`] in
//!   `floors_waiting`;
//! - a floor appears in the pending queue at most once, and never while it
//!   is held.
//!
//! Held floors carry riders the capacity guard put off the car.  They are
//! invisible to dispatch until [`RequestRegistry::release_held`] moves them
//! back to the pending queue.
//!
//! Floors outside the configured range are rejected with
//! [`HoistError::InvalidFloor`] and leave the registry untouched.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use hoist_types::{BuildingConfig, Call, Direction, Floor, HoistError, Occupant, PanelLight};

/// Pending hallway calls (FIFO) plus one panel light per served floor.
#[derive(Debug, Clone)]
pub struct RequestRegistry {
    min_floor: Floor,
    max_floor: Floor,
    floors_waiting: BTreeMap<Floor, Call>,
    pending: VecDeque<Floor>,
    held: BTreeSet<Floor>,
    panel: BTreeMap<Floor, PanelLight>,
}

impl RequestRegistry {
    /// Create an empty registry for the floors of `config`.  Every panel
    /// light starts off.
    pub fn new(config: &BuildingConfig) -> Self {
        Self {
            min_floor: config.min_floor,
            max_floor: config.max_floor,
            floors_waiting: BTreeMap::new(),
            pending: VecDeque::new(),
            held: BTreeSet::new(),
            panel: (config.min_floor..=config.max_floor)
                .map(|f| (f, PanelLight::Off))
                .collect(),
        }
    }

    fn check(&self, floor: Floor) -> Result<(), HoistError> {
        if (self.min_floor..=self.max_floor).contains(&floor) {
            Ok(())
        } else {
            Err(HoistError::InvalidFloor {
                floor,
                min: self.min_floor,
                max: self.max_floor,
            })
        }
    }

    // -------------------------------------------------------------------------
    // Hallway calls
    // -------------------------------------------------------------------------

    /// Record a hallway button press at `floor`.
    ///
    /// An existing call for the floor takes the new direction; anyone already
    /// waiting there stays queued ahead of `occupants`.  The bottom floor only
    /// has an up button and the top floor only a down button, so calls there
    /// are recorded with that direction whatever was requested.
    ///
    /// # Errors
    ///
    /// [`HoistError::InvalidFloor`] when `floor` is not served.
    pub fn submit_call(
        &mut self,
        floor: Floor,
        direction: Direction,
        occupants: Vec<Occupant>,
    ) -> Result<(), HoistError> {
        self.check(floor)?;
        let direction = if floor == self.min_floor {
            Direction::Up
        } else if floor == self.max_floor {
            Direction::Down
        } else {
            direction
        };
        self.insert_call(floor, direction, occupants);
        Ok(())
    }

    /// Queue occupants at `floor` again right away.
    ///
    /// Unlike [`submit_call`][Self::submit_call] the direction is kept as
    /// given, typically the direction the occupants were travelling.
    ///
    /// # Errors
    ///
    /// [`HoistError::InvalidFloor`] when `floor` is not served.
    pub fn requeue(
        &mut self,
        floor: Floor,
        direction: Direction,
        occupants: Vec<Occupant>,
    ) -> Result<(), HoistError> {
        self.check(floor)?;
        self.insert_call(floor, direction, occupants);
        Ok(())
    }

    fn insert_call(&mut self, floor: Floor, direction: Direction, occupants: Vec<Occupant>) {
        let call = self
            .floors_waiting
            .entry(floor)
            .or_insert_with(|| Call::new(direction, Vec::new()));
        call.direction = direction;
        call.waiting.extend(occupants);
        self.held.remove(&floor);
        if !self.pending.contains(&floor) {
            self.pending.push_back(floor);
        }
    }

    /// Park stranded occupants at `floor` without making the floor pending.
    ///
    /// The direction is kept verbatim as with [`requeue`][Self::requeue].
    /// When `floor` is already pending the occupants simply join that call.
    /// Otherwise the floor is held until [`release_held`][Self::release_held].
    ///
    /// # Errors
    ///
    /// [`HoistError::InvalidFloor`] when `floor` is not served.
    pub fn hold(
        &mut self,
        floor: Floor,
        direction: Direction,
        occupants: Vec<Occupant>,
    ) -> Result<(), HoistError> {
        self.check(floor)?;
        let call = self
            .floors_waiting
            .entry(floor)
            .or_insert_with(|| Call::new(direction, Vec::new()));
        call.direction = direction;
        call.waiting.extend(occupants);
        if !self.pending.contains(&floor) {
            self.held.insert(floor);
        }
        Ok(())
    }

    /// Move every held floor to the back of the pending queue, ascending.
    /// Returns the released floors.
    pub fn release_held(&mut self) -> Vec<Floor> {
        let released: Vec<Floor> = std::mem::take(&mut self.held).into_iter().collect();
        for &floor in &released {
            if !self.pending.contains(&floor) {
                self.pending.push_back(floor);
            }
        }
        released
    }

    pub fn held_floors(&self) -> Vec<Floor> {
        self.held.iter().copied().collect()
    }

    pub fn has_held(&self) -> bool {
        !self.held.is_empty()
    }

    /// Pop the oldest pending floor.
    ///
    /// # Errors
    ///
    /// [`HoistError::EmptyQueue`] when nothing is pending; callers treat it as
    /// "no work", not as a fault.
    pub fn take_next_pending(&mut self) -> Result<Floor, HoistError> {
        self.pending.pop_front().ok_or(HoistError::EmptyQueue)
    }

    /// Drop `floor` from the pending queue.  No-op when absent.
    pub fn remove_from_pending(&mut self, floor: Floor) {
        self.pending.retain(|&f| f != floor);
    }

    /// Drop every floor in `floors` from the pending queue in one pass.
    pub fn remove_all_from_pending(&mut self, floors: &[Floor]) {
        self.pending.retain(|f| !floors.contains(f));
    }

    pub fn call(&self, floor: Floor) -> Option<&Call> {
        self.floors_waiting.get(&floor)
    }

    /// The call at `floor` unless the floor is held.
    pub fn active_call(&self, floor: Floor) -> Option<&Call> {
        if self.held.contains(&floor) {
            None
        } else {
            self.call(floor)
        }
    }

    /// Remove and return the call for `floor`; the floor also leaves the
    /// pending queue since it has now been serviced.
    pub fn take_call(&mut self, floor: Floor) -> Option<Call> {
        self.remove_from_pending(floor);
        self.held.remove(&floor);
        self.floors_waiting.remove(&floor)
    }

    /// Floors whose call asks for `direction`, in ascending order.  Held
    /// floors are skipped.
    pub fn calls_matching(&self, direction: Direction) -> impl Iterator<Item = Floor> + '_ {
        self.floors_waiting
            .iter()
            .filter(move |(floor, call)| !self.held.contains(floor) && call.matches(direction))
            .map(|(&floor, _)| floor)
    }

    pub fn pending_floors(&self) -> Vec<Floor> {
        self.pending.iter().copied().collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn has_any_waiting_call(&self) -> bool {
        !self.floors_waiting.is_empty()
    }

    /// Occupants waiting in the hall across every recorded call.
    pub fn waiting_riders(&self) -> usize {
        self.floors_waiting.values().map(|call| call.waiting.len()).sum()
    }

    // -------------------------------------------------------------------------
    // Panel lights
    // -------------------------------------------------------------------------

    /// Light the destination button for `floor`.  Idempotent.
    ///
    /// # Errors
    ///
    /// [`HoistError::InvalidFloor`] when `floor` is not served.
    pub fn set_panel_light(&mut self, floor: Floor) -> Result<(), HoistError> {
        self.check(floor)?;
        self.panel.insert(floor, PanelLight::On);
        Ok(())
    }

    /// Turn off the destination button for `floor`.  No-op when it is already
    /// off or the floor is not served.
    pub fn clear_panel_light(&mut self, floor: Floor) {
        if let Some(light) = self.panel.get_mut(&floor) {
            *light = PanelLight::Off;
        }
    }

    pub fn panel_light(&self, floor: Floor) -> PanelLight {
        self.panel.get(&floor).copied().unwrap_or_default()
    }

    pub fn is_panel_lit(&self, floor: Floor) -> bool {
        self.panel_light(floor) == PanelLight::On
    }

    /// Every floor whose light is on, ascending.
    pub fn lit_floors(&self) -> Vec<Floor> {
        self.panel
            .iter()
            .filter(|(_, light)| **light == PanelLight::On)
            .map(|(&floor, _)| floor)
            .collect()
    }

    pub fn has_any_active_panel_light(&self) -> bool {
        self.panel.values().any(|light| *light == PanelLight::On)
    }
}
