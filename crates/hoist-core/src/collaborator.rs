//! Collaborator traits – everything the dispatcher needs from the outside.
//!
//! The scheduling core never reads a terminal, rolls a die or sleeps.  It
//! talks to these traits instead, so the same session can be driven by the
//! console front end, by the seeded simulator in `hoist-sim`, or by scripted
//! test doubles.
//!
//! Implementations are bundled into a [`Collaborators`] value that the
//! [`Elevator`][crate::Elevator] owns for the whole session.

use std::time::Duration;

use hoist_types::{Floor, HallCall, Occupant, TripEvent};

/// Answer of a [`CallSource`] when the pending queue has run dry.
#[derive(Debug, Clone, PartialEq)]
pub enum Work {
    /// New hallway calls to submit.  An empty list means "ask again".
    Calls(Vec<HallCall>),
    /// The session should park the car and end.
    NoMoreWork,
}

/// Source of hallway calls once the dispatcher has nothing left to do.
pub trait CallSource {
    fn request_more_work(&mut self) -> Work;
}

/// The in-cab destination buttons.
pub trait DestinationPanel {
    /// Collect the floors selected while the doors are open at `floor`.
    ///
    /// Implementations must return within `timeout`; a wait that runs out is
    /// the same as no buttons being pressed.  Out-of-range floors may be
    /// returned; the dispatcher drops them.
    fn collect_selections(&mut self, floor: Floor, timeout: Duration) -> Vec<Floor>;
}

/// Who gets on and who gets off.
pub trait PassengerSource {
    /// Riders boarding at a stop where no waiting occupants were recorded.
    fn generate_group(&mut self) -> Vec<Occupant>;

    /// Positions (indices into `occupants`, front = first boarded) of the
    /// riders leaving at `floor`.  Never called with an empty car.
    fn decide_offboarders(&mut self, floor: Floor, occupants: &[Occupant]) -> Vec<usize>;
}

/// What the car is doing while the clock runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Travel { from: Floor, to: Floor },
    DoorsOpening,
    DoorsClosing,
}

/// Pacing hook.  Real front ends sleep; tests and simulations return at once.
pub trait Clock {
    fn wait(&mut self, phase: Phase, duration: Duration);
}

/// Receives every [`TripEvent`] the session emits.
pub trait TripObserver {
    fn on_event(&mut self, event: &TripEvent);
}

/// A [`Clock`] that never blocks.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstantClock;

impl Clock for InstantClock {
    fn wait(&mut self, _phase: Phase, _duration: Duration) {}
}

/// A [`TripObserver`] that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl TripObserver for NullObserver {
    fn on_event(&mut self, _event: &TripEvent) {}
}

/// The full set of collaborators a session runs against.
pub struct Collaborators {
    pub calls: Box<dyn CallSource>,
    pub panel: Box<dyn DestinationPanel>,
    pub passengers: Box<dyn PassengerSource>,
    pub clock: Box<dyn Clock>,
    pub observers: Vec<Box<dyn TripObserver>>,
}

impl Collaborators {
    /// Bundle the three required collaborators with an [`InstantClock`] and
    /// no observers.
    pub fn new(
        calls: Box<dyn CallSource>,
        panel: Box<dyn DestinationPanel>,
        passengers: Box<dyn PassengerSource>,
    ) -> Self {
        Self {
            calls,
            panel,
            passengers,
            clock: Box::new(InstantClock),
            observers: Vec::new(),
        }
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Add an observer.  Observers are notified in registration order.
    pub fn with_observer(mut self, observer: Box<dyn TripObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub(crate) fn emit(&mut self, event: TripEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
    }
}
