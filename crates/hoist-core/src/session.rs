//! Session loop – the top-level dispatcher state machine.
//!
//! ```text
//!   Dispatching ──plan built──▶ Traveling ──plan concluded──▶ Dispatching
//!        │
//!        └──queue empty──▶ AwaitingWork ──calls──▶ Dispatching
//!                               │
//!                               └──no more work──▶ Parked (terminal)
//! ```
//!
//! Once the call source has no more work, riders still held back by the
//! weight limit are delivered first: the car empties at the base floor, the
//! held calls return to the queue and dispatch resumes without asking the
//! call source again.
//!
//! Each [`Elevator::step`] performs exactly one transition, so front ends can
//! interleave their own work between steps; [`Elevator::run`] simply loops
//! until the car is parked.

use hoist_types::{Floor, HoistError, Occupant, TripEvent};
use tracing::{debug, info, info_span, warn};

use crate::collaborator::Work;
use crate::elevator::Elevator;
use crate::scheduler::{VisitPlan, fold_in_on_the_way_stops};

/// Where the session loop is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Take the next pending call and build a visit plan.
    Dispatching,
    /// A visit plan is in progress.
    Traveling,
    /// Nothing is pending; ask the call source for more.
    AwaitingWork,
    /// The car has been emptied at the base floor.  Terminal.
    Parked,
}

/// Running totals of a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionReport {
    /// Every floor the doors opened at, in order (parking excluded).
    pub visits: Vec<Floor>,
    /// Floor-to-floor moves, parking included.
    pub moves: usize,
    pub boarded: usize,
    pub offboarded: usize,
    /// Riders removed by the capacity guard.  They wait in the hall and are
    /// picked up again later, so each one also counts again in `boarded`.
    pub stranded: usize,
    /// Riders whose own weight reaches the car limit.
    ///
    /// They are turned away at boarding and leave the system: they are not
    /// re-queued and no later trip carries them.  Every other rider is either
    /// delivered or counted in `abandoned`.
    pub refused: Vec<Occupant>,
    /// Riders still waiting in the hall when the car parked, which only
    /// happens after [`Elevator::stop`].
    pub abandoned: usize,
    /// Visit plans dispatched.
    pub trips: usize,
    pub parked_at: Option<Floor>,
}

impl Elevator {
    /// Advance the session by one transition and return the new state.
    ///
    /// Once [`SessionState::Parked`] is reached further calls do nothing.
    pub fn step(&mut self) -> SessionState {
        let next = match self.state {
            SessionState::Dispatching => self.dispatch_next(),
            SessionState::Traveling => self.advance_trip(),
            SessionState::AwaitingWork => self.await_work(),
            SessionState::Parked => SessionState::Parked,
        };
        if next != self.state {
            debug!(from = ?self.state, to = ?next, "session transition");
        }
        self.state = next;
        next
    }

    /// Drive the session until the car parks.
    pub fn run(&mut self) -> &SessionReport {
        let span = info_span!("session", min_floor = self.config.min_floor, max_floor = self.config.max_floor);
        let _enter = span.enter();
        info!("session started");
        while self.step() != SessionState::Parked {}
        info!(
            trips = self.report.trips,
            moves = self.report.moves,
            boarded = self.report.boarded,
            stranded = self.report.stranded,
            "session finished"
        );
        &self.report
    }

    /// End the session now: drop the trip in progress, park and enter
    /// [`SessionState::Parked`].  Calls still pending are abandoned.
    pub fn stop(&mut self) -> &SessionReport {
        if self.state != SessionState::Parked {
            self.plan = None;
            let abandoned = self.registry.pending_floors().len();
            if abandoned > 0 {
                warn!(abandoned, "stopping with hallway calls still pending");
            }
            self.park();
            self.state = SessionState::Parked;
        }
        &self.report
    }

    fn dispatch_next(&mut self) -> SessionState {
        let seed = match self.registry.take_next_pending() {
            Ok(floor) => floor,
            Err(HoistError::EmptyQueue) => return SessionState::AwaitingWork,
            Err(e) => {
                warn!(error = %e, "unexpected registry error");
                return SessionState::AwaitingWork;
            }
        };

        let current = self.car.current_floor;
        let Some(plan) = VisitPlan::dispatch(&self.config, &mut self.registry, current, seed) else {
            warn!(floor = seed, "pending floor has no recorded call, skipping");
            return SessionState::Dispatching;
        };

        let direction = plan.direction();
        self.car.request_direction = Some(direction);
        self.report.trips += 1;
        let stops: Vec<Floor> = plan.stops().iter().copied().collect();
        info!(floor = seed, %direction, ?stops, "trip dispatched");
        self.emit(TripEvent::Dispatched {
            floor: seed,
            direction,
            plan: stops,
        });
        self.plan = Some(plan);
        SessionState::Traveling
    }

    fn advance_trip(&mut self) -> SessionState {
        let Some(mut plan) = self.plan.take() else {
            return SessionState::Dispatching;
        };

        if let Some(stop) = plan.next_stop() {
            if stop == self.car.current_floor {
                self.serve_current_floor();
            } else if let Err(e) = self.execute_move(stop) {
                warn!(floor = stop, error = %e, "skipping unreachable stop");
            }
            let ahead = fold_in_on_the_way_stops(
                &self.config,
                &self.registry,
                self.car.current_floor,
                plan.direction(),
            );
            if plan.merge(ahead) {
                debug!(stops = ?plan.stops(), "panel stops folded into trip");
            }
        }

        if plan.is_empty() {
            plan.reverse();
            let direction = plan.direction();
            self.car.request_direction = Some(direction);
            let ahead =
                fold_in_on_the_way_stops(&self.config, &self.registry, self.car.current_floor, direction);
            if plan.merge(ahead) {
                info!(%direction, stops = ?plan.stops(), "trip reversed");
                self.emit(TripEvent::Reversed { direction });
            }
        }

        if plan.is_empty() {
            debug!(floor = self.car.current_floor, "trip concluded");
            SessionState::Dispatching
        } else {
            self.plan = Some(plan);
            SessionState::Traveling
        }
    }

    fn await_work(&mut self) -> SessionState {
        let work = if self.calls_exhausted {
            Work::NoMoreWork
        } else {
            self.collab.calls.request_more_work()
        };
        match work {
            Work::NoMoreWork => {
                self.calls_exhausted = true;
                if self.registry.has_held() {
                    let offboarded = self.unload_at_base();
                    let floor = self.car.current_floor;
                    self.emit(TripEvent::Offboarded {
                        floor,
                        count: offboarded,
                    });
                    let released = self.registry.release_held();
                    info!(?released, offboarded, "car emptied to collect held riders");
                    return SessionState::Dispatching;
                }
                self.park();
                SessionState::Parked
            }
            Work::Calls(calls) => {
                for call in calls {
                    if let Err(e) = self.submit_call(call.floor, call.direction, call.waiting) {
                        warn!(error = %e, "dropping hallway call");
                    }
                }
                if self.registry.has_pending() {
                    SessionState::Dispatching
                } else {
                    SessionState::AwaitingWork
                }
            }
        }
    }
}
