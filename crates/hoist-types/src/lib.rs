//! `hoist-types` – value types shared by every Hoist crate.
//!
//! Nothing in here schedules anything; it only defines the vocabulary the
//! dispatcher, the simulators and the console front end speak.

pub mod config;

pub use config::{BuildingConfig, MAX_FLOORS};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A floor number.  Signed so buildings with basement levels can be modeled.
pub type Floor = i32;

/// Direction of travel or of a hallway request.
///
/// "No direction" is expressed as `Option<Direction>::None` wherever a
/// direction may be unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// The opposite direction.
    pub fn flip(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = HoistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(HoistError::InvalidDirection(other.to_string())),
        }
    }
}

/// A person riding or waiting for the car.  Only `weight` affects load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub age: u32,
    /// Inches.
    pub height: u32,
    /// Pounds.
    pub weight: u32,
}

/// An active hallway call for one floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    /// The direction the callers want to travel.
    pub direction: Direction,
    /// People already known to be waiting at the floor, in arrival order.
    /// Empty for a plain button press.
    pub waiting: Vec<Occupant>,
}

impl Call {
    pub fn new(direction: Direction, waiting: Vec<Occupant>) -> Self {
        Self { direction, waiting }
    }

    pub fn wants_up(&self) -> bool {
        self.direction == Direction::Up
    }

    pub fn wants_down(&self) -> bool {
        self.direction == Direction::Down
    }

    /// `true` when the call asks for `direction`.
    pub fn matches(&self, direction: Direction) -> bool {
        self.direction == direction
    }
}

/// State of one in-cab destination button light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelLight {
    On,
    #[default]
    Off,
}

/// A hallway button press as reported by a call source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HallCall {
    pub floor: Floor,
    pub direction: Direction,
    /// Occupants to attach to the call; usually empty.
    #[serde(default)]
    pub waiting: Vec<Occupant>,
}

impl HallCall {
    pub fn new(floor: Floor, direction: Direction) -> Self {
        Self {
            floor,
            direction,
            waiting: Vec::new(),
        }
    }
}

/// Observable record of what the dispatcher did.
///
/// Front ends render these; tests assert on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum TripEvent {
    /// A pending call was taken from the queue and a visit plan was built.
    Dispatched {
        floor: Floor,
        direction: Direction,
        plan: Vec<Floor>,
    },
    /// The car was over its weight limit and left people behind.
    Overloaded {
        floor: Floor,
        load: u32,
        stranded: usize,
    },
    /// The car started moving.
    Departed {
        from: Floor,
        to: Floor,
        heading: Direction,
        travel_secs: f64,
    },
    Arrived { floor: Floor },
    Offboarded { floor: Floor, count: usize },
    /// Destination buttons read during a stop at `floor`; `lit` is every
    /// floor whose light is on afterwards.
    Selections {
        floor: Floor,
        pressed: Vec<Floor>,
        lit: Vec<Floor>,
    },
    Boarded {
        floor: Floor,
        count: usize,
        synthetic: bool,
    },
    /// Occupants too heavy to ever ride were left at the floor.
    Refused { floor: Floor, count: usize },
    /// The live plan ran dry and the trip direction flipped.
    Reversed { direction: Direction },
    /// The session ended with the car emptied at the base floor.
    Parked { floor: Floor, offboarded: usize },
}

/// Error type shared across the workspace.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HoistError {
    #[error("no pending hallway calls")]
    EmptyQueue,

    #[error("floor {floor} is outside the served range {min}..={max}")]
    InvalidFloor { floor: Floor, min: Floor, max: Floor },

    #[error("invalid direction '{0}', expected 'up' or 'down'")]
    InvalidDirection(String),

    #[error("invalid building configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_flip_is_involutive() {
        assert_eq!(Direction::Up.flip(), Direction::Down);
        assert_eq!(Direction::Down.flip(), Direction::Up);
        assert_eq!(Direction::Up.flip().flip(), Direction::Up);
    }

    #[test]
    fn direction_parses_case_insensitively() {
        assert_eq!("UP".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!(" down ".parse::<Direction>().unwrap(), Direction::Down);
        assert!(matches!(
            "sideways".parse::<Direction>(),
            Err(HoistError::InvalidDirection(_))
        ));
    }

    #[test]
    fn call_exposes_boolean_view() {
        let call = Call::new(Direction::Down, vec![]);
        assert!(call.wants_down());
        assert!(!call.wants_up());
        assert!(call.matches(Direction::Down));
    }

    #[test]
    fn trip_event_is_tagged_json() {
        let event = TripEvent::Departed {
            from: 1,
            to: 3,
            heading: Direction::Up,
            travel_secs: 1.0,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "departed");
        assert_eq!(json["data"]["heading"], "up");

        let back: TripEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn hall_call_waiting_defaults_to_empty() {
        let call: HallCall = serde_json::from_str(r#"{"floor":4,"direction":"down"}"#).unwrap();
        assert_eq!(call, HallCall::new(4, Direction::Down));
    }

    #[test]
    fn hoist_error_display() {
        let err = HoistError::InvalidFloor {
            floor: 12,
            min: 1,
            max: 10,
        };
        assert!(err.to_string().contains("floor 12"));
        assert!(err.to_string().contains("1..=10"));
        assert!(HoistError::EmptyQueue.to_string().contains("no pending"));
    }
}
