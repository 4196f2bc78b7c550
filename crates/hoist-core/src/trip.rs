//! Trip controller – one floor-to-floor move and the stop that follows it.
//!
//! Every move runs the same sequence:
//!
//! 1. **Capacity** – if the car is at or above its limit, the last riders to
//!    board step out and wait as a held call at the floor they left,
//!    travelling the way the trip was going.  Held calls go back to the
//!    pending queue as soon as somebody leaves the car.
//! 2. **Heading** – derived from the destination, except at the terminal
//!    floors where the car can only go one way.
//! 3. **Travel** – the clock collaborator is told how long the ride takes.
//! 4. **Stop** – doors open, riders leave (releasing held calls), destination
//!    buttons are read,
//!    waiting callers (or a generated group) board, the floor's call is
//!    cleared, doors close and the floor's panel light goes out.

use hoist_types::{BuildingConfig, Direction, Floor, HoistError, Occupant, TripEvent};
use tracing::{debug, info, warn};

use crate::collaborator::Phase;
use crate::elevator::Elevator;

/// What [`Elevator::execute_move`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved {
        from: Floor,
        to: Floor,
        heading: Direction,
    },
    /// The destination was the current floor; the car did not move.
    Stayed,
}

/// Heading for a move from `current` to `dest`.
///
/// The top floor always heads down and the bottom floor always heads up;
/// elsewhere the heading follows the destination.
pub fn heading_for(config: &BuildingConfig, current: Floor, dest: Floor) -> Direction {
    if current == config.max_floor {
        Direction::Down
    } else if current == config.min_floor || dest > current {
        Direction::Up
    } else {
        Direction::Down
    }
}

impl Elevator {
    /// Move the car to `dest` and serve the stop there.
    ///
    /// The capacity guard runs before anything else, even when `dest` turns
    /// out to be the current floor.
    ///
    /// # Errors
    ///
    /// [`HoistError::InvalidFloor`] when `dest` is not served.  Nothing is
    /// changed in that case.
    pub fn execute_move(&mut self, dest: Floor) -> Result<MoveOutcome, HoistError> {
        self.config.check_floor(dest)?;
        self.enforce_capacity();

        let from = self.car.current_floor;
        if dest == from {
            debug!(floor = dest, "already at destination");
            return Ok(MoveOutcome::Stayed);
        }

        let heading = heading_for(&self.config, from, dest);
        self.travel(from, dest, heading);
        self.serve_stop();
        Ok(MoveOutcome::Moved {
            from,
            to: dest,
            heading,
        })
    }

    /// Run a full stop at the floor the car is already on.
    ///
    /// Used when a visit plan names the car's own floor: the callers there
    /// still need the doors to open.
    pub fn serve_current_floor(&mut self) {
        debug!(floor = self.car.current_floor, "serving current floor in place");
        self.serve_stop();
    }

    /// Return to the base floor and let everyone out.
    ///
    /// Nobody boards and no destinations are read.  Riders still waiting in
    /// the hall are counted in [`SessionReport::abandoned`][crate::SessionReport::abandoned].
    /// Returns the number of riders who left the car.
    pub fn park(&mut self) -> usize {
        let base = self.config.base_floor();
        let offboarded = self.unload_at_base();
        self.car.request_direction = None;

        self.report.parked_at = Some(base);
        self.report.abandoned = self.registry.waiting_riders();
        if self.report.abandoned > 0 {
            warn!(abandoned = self.report.abandoned, "parking with riders still waiting");
        }
        info!(floor = base, offboarded, "car parked");
        self.emit(TripEvent::Parked {
            floor: base,
            offboarded,
        });
        offboarded
    }

    // -------------------------------------------------------------------------
    // Internal steps
    // -------------------------------------------------------------------------

    /// Ride to the base floor without the capacity guard and empty the car.
    pub(crate) fn unload_at_base(&mut self) -> usize {
        let base = self.config.base_floor();
        let from = self.car.current_floor;
        if from != base {
            let heading = heading_for(&self.config, from, base);
            self.travel(from, base, heading);
        }

        self.open_doors();
        let offboarded = self.car.occupants.len();
        self.car.occupants.clear();
        self.close_doors();
        self.registry.clear_panel_light(base);
        self.report.offboarded += offboarded;
        offboarded
    }

    /// Strand the last-boarded riders until the car is under its limit and
    /// hold them where they stepped out.
    fn enforce_capacity(&mut self) {
        if !self.guard.is_over_capacity(self.car.occupants.iter()) {
            return;
        }
        let load = self.load();
        let floor = self.car.current_floor;
        let direction = self.car.travel_direction();
        let stranded = self.guard.offload_until_under_capacity(&mut self.car.occupants);
        let count = stranded.len();
        warn!(floor, load, stranded = count, "car over weight limit, riders must exit");

        if !stranded.is_empty()
            && let Err(e) = self.registry.hold(floor, direction, stranded)
        {
            // The car's own floor is always served, so this cannot happen
            // unless the registry and config disagree.
            warn!(error = %e, "failed to hold stranded riders");
        }
        self.report.stranded += count;
        self.emit(TripEvent::Overloaded {
            floor,
            load,
            stranded: count,
        });
    }

    fn travel(&mut self, from: Floor, to: Floor, heading: Direction) {
        let duration = self.config.travel_time(from.abs_diff(to));
        self.car.direction = heading;
        info!(from, to, %heading, "car moving");
        self.emit(TripEvent::Departed {
            from,
            to,
            heading,
            travel_secs: duration.as_secs_f64(),
        });
        self.collab.clock.wait(Phase::Travel { from, to }, duration);
        self.car.current_floor = to;
        self.report.moves += 1;
        self.emit(TripEvent::Arrived { floor: to });
    }

    fn serve_stop(&mut self) {
        let floor = self.car.current_floor;
        self.open_doors();
        self.offboard(floor);

        let selections = self
            .collab
            .panel
            .collect_selections(floor, self.config.selection_timeout());
        let pressed = self.accept_selections(selections);
        let lit = self.registry.lit_floors();
        self.emit(TripEvent::Selections { floor, pressed, lit });

        self.board(floor);
        self.close_doors();
        self.registry.clear_panel_light(floor);
        self.report.visits.push(floor);
    }

    fn open_doors(&mut self) {
        self.collab
            .clock
            .wait(Phase::DoorsOpening, self.config.door_cycle());
        self.car.doors_open = true;
    }

    fn close_doors(&mut self) {
        self.collab
            .clock
            .wait(Phase::DoorsClosing, self.config.door_cycle());
        self.car.doors_open = false;
    }

    fn offboard(&mut self, floor: Floor) {
        if self.car.occupants.is_empty() {
            return;
        }
        let riders = self.car.occupants.make_contiguous();
        let mut leaving = self.collab.passengers.decide_offboarders(floor, riders);
        leaving.sort_unstable();
        leaving.dedup();
        leaving.retain(|&i| i < self.car.occupants.len());
        for &i in leaving.iter().rev() {
            self.car.occupants.remove(i);
        }

        let count = leaving.len();
        self.report.offboarded += count;
        debug!(floor, count, remaining = self.car.occupants.len(), "riders exited");
        self.emit(TripEvent::Offboarded { floor, count });

        if count > 0 && self.registry.has_held() {
            let released = self.registry.release_held();
            debug!(?released, "room freed, held calls back in the queue");
        }
    }

    fn board(&mut self, floor: Floor) {
        let (group, synthetic) = match self.registry.take_call(floor) {
            Some(call) if !call.waiting.is_empty() => (call.waiting, false),
            _ => (self.collab.passengers.generate_group(), true),
        };
        let guard = self.guard;
        let (riders, refused): (Vec<Occupant>, Vec<Occupant>) =
            group.into_iter().partition(|o| guard.can_ever_ride(o));

        let count = riders.len();
        self.car.occupants.extend(riders);
        self.report.boarded += count;
        debug!(floor, count, synthetic, load = self.load(), "riders boarded");
        self.emit(TripEvent::Boarded {
            floor,
            count,
            synthetic,
        });

        if !refused.is_empty() {
            warn!(floor, count = refused.len(), "riders heavier than the car limit were refused");
            self.emit(TripEvent::Refused {
                floor,
                count: refused.len(),
            });
            self.report.refused.extend(refused);
        }
    }
}
