//! [`Elevator`] – the car, its registry and its collaborators.
//!
//! The struct is split across modules by concern: this file holds
//! construction, state and request intake; [`crate::trip`] adds the
//! floor-to-floor moves and [`crate::session`] the dispatch loop.

use std::collections::VecDeque;

use hoist_types::{BuildingConfig, Direction, Floor, HoistError, Occupant, TripEvent};
use tracing::{debug, warn};

use crate::capacity::CapacityGuard;
use crate::collaborator::Collaborators;
use crate::registry::RequestRegistry;
use crate::scheduler::VisitPlan;
use crate::session::{SessionReport, SessionState};

/// Mutable state of the car itself.
#[derive(Debug, Clone, PartialEq)]
pub struct CarState {
    pub current_floor: Floor,
    /// Heading of the last physical move.
    pub direction: Direction,
    /// Direction driving the current trip, if one is in progress or was.
    pub request_direction: Option<Direction>,
    pub doors_open: bool,
    /// Riders, front = first boarded.
    pub occupants: VecDeque<Occupant>,
}

impl CarState {
    /// A car parked at the base floor with its doors shut.
    ///
    /// The initial heading points up when the car sits in the lower half of
    /// the building and down otherwise.
    pub fn parked(config: &BuildingConfig) -> Self {
        let floor = config.base_floor();
        let direction = if f64::from(floor) <= f64::from(config.max_floor) / 2.0 - 1.0 {
            Direction::Up
        } else {
            Direction::Down
        };
        Self {
            current_floor: floor,
            direction,
            request_direction: None,
            doors_open: false,
            occupants: VecDeque::new(),
        }
    }

    /// The direction stranded riders are recorded with.
    pub fn travel_direction(&self) -> Direction {
        self.request_direction.unwrap_or(self.direction)
    }
}

/// A single elevator car with its dispatcher.
pub struct Elevator {
    pub(crate) config: BuildingConfig,
    pub(crate) registry: RequestRegistry,
    pub(crate) car: CarState,
    pub(crate) guard: CapacityGuard,
    pub(crate) collab: Collaborators,
    pub(crate) state: SessionState,
    pub(crate) plan: Option<VisitPlan>,
    pub(crate) report: SessionReport,
    /// Set once the call source has answered [`crate::Work::NoMoreWork`].
    pub(crate) calls_exhausted: bool,
}

impl Elevator {
    /// Build an elevator parked at the base floor.
    ///
    /// # Errors
    ///
    /// [`HoistError::InvalidConfig`] when `config` fails validation.
    pub fn new(config: BuildingConfig, collab: Collaborators) -> Result<Self, HoistError> {
        config.validate()?;
        let registry = RequestRegistry::new(&config);
        let car = CarState::parked(&config);
        let guard = CapacityGuard::new(config.max_weight);
        Ok(Self {
            config,
            registry,
            car,
            guard,
            collab,
            state: SessionState::Dispatching,
            plan: None,
            report: SessionReport::default(),
            calls_exhausted: false,
        })
    }

    /// Start the car somewhere other than the base floor.
    ///
    /// # Errors
    ///
    /// [`HoistError::InvalidFloor`] when `floor` is not served.
    pub fn with_start_floor(mut self, floor: Floor, direction: Direction) -> Result<Self, HoistError> {
        self.car.current_floor = self.config.check_floor(floor)?;
        self.car.direction = direction;
        Ok(self)
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn config(&self) -> &BuildingConfig {
        &self.config
    }

    pub fn car(&self) -> &CarState {
        &self.car
    }

    pub fn registry(&self) -> &RequestRegistry {
        &self.registry
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The live plan of the trip in progress, if any.
    pub fn plan(&self) -> Option<&VisitPlan> {
        self.plan.as_ref()
    }

    pub fn report(&self) -> &SessionReport {
        &self.report
    }

    /// Current load in pounds.
    pub fn load(&self) -> u32 {
        self.guard.load(self.car.occupants.iter())
    }

    // -------------------------------------------------------------------------
    // Request intake
    // -------------------------------------------------------------------------

    /// A hallway button was pressed at `floor`.
    ///
    /// `occupants` are the people known to be waiting there; pass an empty
    /// list for a plain press.
    ///
    /// # Errors
    ///
    /// [`HoistError::InvalidFloor`] when `floor` is not served; the registry
    /// is left unchanged.
    pub fn submit_call(
        &mut self,
        floor: Floor,
        direction: Direction,
        occupants: Vec<Occupant>,
    ) -> Result<(), HoistError> {
        self.registry.submit_call(floor, direction, occupants)?;
        debug!(floor, %direction, "hallway call registered");
        Ok(())
    }

    /// A destination button was pressed inside the car.
    ///
    /// # Errors
    ///
    /// [`HoistError::InvalidFloor`] when `floor` is not served.
    pub fn press_destination(&mut self, floor: Floor) -> Result<(), HoistError> {
        self.registry.set_panel_light(floor)
    }

    /// Light every valid floor in `selections`, dropping the rest with a
    /// warning.  Returns the floors that were accepted.
    pub(crate) fn accept_selections(&mut self, selections: Vec<Floor>) -> Vec<Floor> {
        let mut accepted = Vec::new();
        for floor in selections {
            match self.registry.set_panel_light(floor) {
                Ok(()) => {
                    if !accepted.contains(&floor) {
                        accepted.push(floor);
                    }
                }
                Err(e) => warn!(error = %e, "ignoring destination selection"),
            }
        }
        accepted
    }

    pub(crate) fn emit(&mut self, event: TripEvent) {
        self.collab.emit(event);
    }
}
