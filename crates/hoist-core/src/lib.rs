//! `hoist-core` – single-car sweep dispatcher.
//!
//! Decides where one elevator car goes next.  Hallway calls and in-cab
//! destination buttons go in; floor-to-floor moves, door cycles and
//! [`TripEvent`][hoist_types::TripEvent]s come out.
//!
//! # Modules
//!
//! - [`registry`] – [`RequestRegistry`]: pending hallway calls in arrival
//!   order plus one panel light per floor.
//! - [`capacity`] – [`CapacityGuard`]: the weight interlock and the
//!   "last in, first out" overload policy.
//! - [`scheduler`] – [`VisitPlan`] and the sweep helpers that build, extend
//!   and reverse it.
//! - [`trip`] – [`Elevator::execute_move`], in-place service and parking.
//! - [`session`] – [`Elevator::step`] / [`Elevator::run`]: the
//!   [`SessionState`] machine that ties everything together.
//! - [`collaborator`] – the traits the core talks to instead of a terminal,
//!   a random number generator or a real clock.
//!
//! # Example
//!
//! ```no_run
//! use hoist_core::{Collaborators, Elevator};
//! # fn collaborators() -> Collaborators { unimplemented!() }
//! # fn main() -> Result<(), hoist_types::HoistError> {
//! let mut elevator = Elevator::new(hoist_types::BuildingConfig::default(), collaborators())?;
//! let report = elevator.run();
//! println!("served {} stops", report.visits.len());
//! # Ok(())
//! # }
//! ```

pub mod capacity;
pub mod collaborator;
pub mod elevator;
pub mod registry;
pub mod scheduler;
pub mod session;
pub mod trip;

pub use capacity::CapacityGuard;
pub use collaborator::{
    CallSource, Clock, Collaborators, DestinationPanel, InstantClock, NullObserver, PassengerSource,
    Phase, TripObserver, Work,
};
pub use elevator::{CarState, Elevator};
pub use registry::RequestRegistry;
pub use scheduler::{VisitPlan, build_visit_sequence, collect_same_direction_calls, fold_in_on_the_way_stops};
pub use session::{SessionReport, SessionState};
pub use trip::{MoveOutcome, heading_for};
