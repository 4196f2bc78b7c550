//! End-to-end dispatch scenarios driven by scripted collaborators.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use hoist_core::{
    CallSource, Clock, Collaborators, DestinationPanel, Elevator, MoveOutcome, PassengerSource,
    Phase, SessionState, TripObserver, Work,
};
use hoist_types::{BuildingConfig, Direction, Floor, HallCall, HoistError, Occupant, TripEvent};

// ────────────────────────────────────────────────────────────────────────────
// Scripted collaborators
// ────────────────────────────────────────────────────────────────────────────

struct ScriptedCalls(VecDeque<Vec<HallCall>>);

impl CallSource for ScriptedCalls {
    fn request_more_work(&mut self) -> Work {
        self.0.pop_front().map_or(Work::NoMoreWork, Work::Calls)
    }
}

/// Presses per floor, one entry consumed per visit.
struct ScriptedPanel {
    presses: BTreeMap<Floor, VecDeque<Vec<Floor>>>,
    timeouts: Rc<RefCell<Vec<Duration>>>,
}

impl DestinationPanel for ScriptedPanel {
    fn collect_selections(&mut self, floor: Floor, timeout: Duration) -> Vec<Floor> {
        self.timeouts.borrow_mut().push(timeout);
        self.presses
            .get_mut(&floor)
            .and_then(VecDeque::pop_front)
            .unwrap_or_default()
    }
}

struct ScriptedPassengers {
    groups: VecDeque<Vec<Occupant>>,
    exits: BTreeMap<Floor, VecDeque<Vec<usize>>>,
}

impl PassengerSource for ScriptedPassengers {
    fn generate_group(&mut self) -> Vec<Occupant> {
        self.groups.pop_front().unwrap_or_default()
    }

    fn decide_offboarders(&mut self, floor: Floor, occupants: &[Occupant]) -> Vec<usize> {
        assert!(!occupants.is_empty(), "asked for offboarders of an empty car");
        self.exits
            .get_mut(&floor)
            .and_then(VecDeque::pop_front)
            .unwrap_or_default()
    }
}

struct RecordingClock(Rc<RefCell<Vec<(Phase, Duration)>>>);

impl Clock for RecordingClock {
    fn wait(&mut self, phase: Phase, duration: Duration) {
        self.0.borrow_mut().push((phase, duration));
    }
}

struct Recorder(Rc<RefCell<Vec<TripEvent>>>);

impl TripObserver for Recorder {
    fn on_event(&mut self, event: &TripEvent) {
        self.0.borrow_mut().push(event.clone());
    }
}

#[derive(Default)]
struct Script {
    rounds: Vec<Vec<HallCall>>,
    presses: Vec<(Floor, Vec<Floor>)>,
    groups: Vec<Vec<Occupant>>,
    exits: Vec<(Floor, Vec<usize>)>,
}

struct Harness {
    elevator: Elevator,
    events: Rc<RefCell<Vec<TripEvent>>>,
    waits: Rc<RefCell<Vec<(Phase, Duration)>>>,
    timeouts: Rc<RefCell<Vec<Duration>>>,
}

impl Harness {
    fn events(&self) -> Vec<TripEvent> {
        self.events.borrow().clone()
    }

    fn departures(&self) -> Vec<(Floor, Floor, Direction)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                TripEvent::Departed { from, to, heading, .. } => Some((*from, *to, *heading)),
                _ => None,
            })
            .collect()
    }
}

fn per_floor<T>(entries: Vec<(Floor, T)>) -> BTreeMap<Floor, VecDeque<T>> {
    let mut map: BTreeMap<Floor, VecDeque<T>> = BTreeMap::new();
    for (floor, value) in entries {
        map.entry(floor).or_default().push_back(value);
    }
    map
}

fn harness(config: BuildingConfig, script: Script) -> Harness {
    let events = Rc::new(RefCell::new(Vec::new()));
    let waits = Rc::new(RefCell::new(Vec::new()));
    let timeouts = Rc::new(RefCell::new(Vec::new()));

    let collab = Collaborators::new(
        Box::new(ScriptedCalls(script.rounds.into())),
        Box::new(ScriptedPanel {
            presses: per_floor(script.presses),
            timeouts: timeouts.clone(),
        }),
        Box::new(ScriptedPassengers {
            groups: script.groups.into(),
            exits: per_floor(script.exits),
        }),
    )
    .with_clock(Box::new(RecordingClock(waits.clone())))
    .with_observer(Box::new(Recorder(events.clone())));

    Harness {
        elevator: Elevator::new(config, collab).unwrap(),
        events,
        waits,
        timeouts,
    }
}

fn person(weight: u32) -> Occupant {
    Occupant {
        age: 35,
        height: 68,
        weight,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scenarios
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn round_trip_serves_call_and_clears_light() {
    let mut h = harness(BuildingConfig::default(), Script::default());
    h.elevator.submit_call(3, Direction::Up, vec![]).unwrap();
    h.elevator.press_destination(3).unwrap();

    assert_eq!(h.elevator.step(), SessionState::Traveling);
    let stops: Vec<Floor> = h.elevator.plan().unwrap().stops().iter().copied().collect();
    assert_eq!(stops, vec![3]);

    h.elevator.step();
    assert_eq!(h.elevator.car().current_floor, 3);
    assert!(h.elevator.registry().call(3).is_none());
    assert!(!h.elevator.registry().is_panel_lit(3));
    assert!(!h.elevator.registry().has_pending());
    assert!(!h.elevator.car().doors_open);
}

#[test]
fn sweep_finishes_upward_before_reversing() {
    let mut h = harness(BuildingConfig::default(), Script::default());
    h.elevator = h.elevator.with_start_floor(5, Direction::Up).unwrap();
    h.elevator.submit_call(8, Direction::Up, vec![]).unwrap();
    h.elevator.submit_call(2, Direction::Down, vec![]).unwrap();

    let report = h.elevator.run().clone();
    assert_eq!(report.visits, vec![8, 2]);
    assert_eq!(
        &h.departures()[..2],
        &[(5, 8, Direction::Up), (8, 2, Direction::Down)]
    );
}

#[test]
fn top_floor_forces_downward_heading() {
    let mut h = harness(BuildingConfig::default(), Script::default());
    h.elevator = h.elevator.with_start_floor(10, Direction::Up).unwrap();

    let outcome = h.elevator.execute_move(9).unwrap();
    assert_eq!(
        outcome,
        MoveOutcome::Moved {
            from: 10,
            to: 9,
            heading: Direction::Down
        }
    );
    assert_eq!(h.elevator.car().direction, Direction::Down);
}

#[test]
fn out_of_range_move_changes_nothing() {
    let mut h = harness(BuildingConfig::default(), Script::default());
    let err = h.elevator.execute_move(0).unwrap_err();
    assert!(matches!(err, HoistError::InvalidFloor { floor: 0, .. }));
    assert_eq!(h.elevator.car().current_floor, 1);
    assert!(h.events().is_empty());
}

#[test]
fn moving_to_current_floor_is_a_no_op() {
    let mut h = harness(BuildingConfig::default(), Script::default());
    assert_eq!(h.elevator.execute_move(1), Ok(MoveOutcome::Stayed));
    assert!(h.events().is_empty());
    assert!(h.waits.borrow().is_empty());
}

#[test]
fn overload_holds_stranded_riders_until_someone_exits() {
    let config = BuildingConfig {
        max_weight: 500,
        ..BuildingConfig::default()
    };
    let script = Script {
        exits: vec![(4, vec![0])],
        ..Script::default()
    };
    let mut h = harness(config, script);
    let (a, b) = (person(300), person(250));
    h.elevator.submit_call(1, Direction::Up, vec![a, b]).unwrap();
    h.elevator.submit_call(4, Direction::Up, vec![]).unwrap();

    h.elevator.step(); // dispatch [1, 4]
    h.elevator.step(); // board both at 1
    assert_eq!(h.elevator.load(), 550);
    h.elevator.step(); // overload, move to 4, rider a exits

    assert_eq!(h.elevator.car().current_floor, 4);
    assert!(h.elevator.car().occupants.is_empty());
    let requeued = h.elevator.registry().call(1).unwrap();
    assert_eq!(requeued.waiting, vec![b]);
    assert!(requeued.wants_up());
    // The exit at 4 made room, so the stranded call is pending again.
    assert!(!h.elevator.registry().has_held());
    assert_eq!(h.elevator.registry().pending_floors(), vec![1]);
    assert_eq!(h.elevator.report().stranded, 1);
    assert!(h.events().contains(&TripEvent::Overloaded {
        floor: 1,
        load: 550,
        stranded: 1
    }));

    let report = h.elevator.run().clone();
    assert_eq!(report.boarded, 3);
    assert_eq!(report.offboarded, 2);
    assert_eq!(report.abandoned, 0);
    assert_eq!(report.parked_at, Some(1));
}

#[test]
fn riders_who_never_exit_cannot_keep_the_car_busy() {
    let config = BuildingConfig {
        max_weight: 2000,
        ..BuildingConfig::default()
    };
    let mut h = harness(config, Script::default());
    let (a, b, c) = (person(1000), person(1000), person(1000));
    h.elevator.submit_call(1, Direction::Up, vec![a]).unwrap();
    h.elevator.submit_call(4, Direction::Up, vec![b]).unwrap();
    h.elevator.submit_call(7, Direction::Up, vec![c]).unwrap();

    let mut steps = 0;
    while h.elevator.state() != SessionState::Parked {
        h.elevator.step();
        steps += 1;
        assert!(steps < 1_000, "session did not park");
        if h.elevator.car().current_floor == 7 && h.elevator.state() == SessionState::Dispatching {
            // b was put off at 4 and nobody has left since.
            assert_eq!(h.elevator.registry().held_floors(), vec![4]);
            assert!(!h.elevator.registry().has_pending());
        }
    }

    let report = h.elevator.report().clone();
    assert_eq!(report.stranded, 1);
    assert_eq!(report.boarded, 4);
    assert_eq!(report.offboarded, 3);
    assert_eq!(report.abandoned, 0);
    assert_eq!(report.visits, vec![1, 4, 7, 4]);
    assert!(!h.elevator.registry().has_any_waiting_call());
    assert!(h.events().contains(&TripEvent::Offboarded { floor: 1, count: 2 }));
}

#[test]
fn stranded_riders_take_the_car_heading_when_no_trip_is_active() {
    let config = BuildingConfig {
        max_weight: 500,
        ..BuildingConfig::default()
    };
    let mut h = harness(config, Script::default());
    h.elevator = h.elevator.with_start_floor(6, Direction::Down).unwrap();
    let (a, b) = (person(300), person(250));
    h.elevator.submit_call(6, Direction::Up, vec![a, b]).unwrap();
    h.elevator.serve_current_floor();
    assert_eq!(h.elevator.car().request_direction, None);
    assert_eq!(h.elevator.load(), 550);

    h.elevator.execute_move(3).unwrap();

    assert_eq!(h.elevator.car().occupants, VecDeque::from(vec![a]));
    let stranded = h.elevator.registry().call(6).unwrap();
    assert!(stranded.wants_down());
    assert_eq!(stranded.waiting, vec![b]);
    assert_eq!(h.elevator.registry().held_floors(), vec![6]);
}

#[test]
fn lit_buttons_ahead_are_folded_into_the_trip() {
    let script = Script {
        presses: vec![(2, vec![6, 4])],
        ..Script::default()
    };
    let mut h = harness(BuildingConfig::default(), script);
    h.elevator.submit_call(2, Direction::Up, vec![]).unwrap();

    let report = h.elevator.run().clone();
    assert_eq!(report.visits, vec![2, 4, 6]);
    assert_eq!(report.trips, 1);
    assert!(!h.elevator.registry().has_any_active_panel_light());
}

#[test]
fn trip_reverses_toward_lit_buttons_behind() {
    let script = Script {
        presses: vec![(2, vec![6]), (6, vec![3])],
        ..Script::default()
    };
    let mut h = harness(BuildingConfig::default(), script);
    h.elevator.submit_call(2, Direction::Up, vec![]).unwrap();

    let report = h.elevator.run().clone();
    assert_eq!(report.visits, vec![2, 6, 3]);
    assert!(h.events().contains(&TripEvent::Reversed {
        direction: Direction::Down
    }));
    assert_eq!(report.trips, 1);
}

#[test]
fn call_at_the_cars_floor_is_served_in_place() {
    let mut h = harness(BuildingConfig::default(), Script::default());
    let rider = person(180);
    h.elevator.submit_call(1, Direction::Up, vec![rider]).unwrap();

    let report = h.elevator.run().clone();
    assert_eq!(report.visits, vec![1]);
    assert_eq!(report.moves, 0);
    let events = h.events();
    assert!(events.contains(&TripEvent::Boarded {
        floor: 1,
        count: 1,
        synthetic: false
    }));
    assert!(events.contains(&TripEvent::Parked {
        floor: 1,
        offboarded: 1
    }));
}

#[test]
fn session_drains_and_parks_at_base_floor() {
    let script = Script {
        rounds: vec![vec![HallCall::new(5, Direction::Down)], vec![]],
        groups: vec![vec![person(150), person(90)]],
        ..Script::default()
    };
    let mut h = harness(BuildingConfig::default(), script);
    h.elevator = h.elevator.with_start_floor(7, Direction::Down).unwrap();

    let report = h.elevator.run().clone();
    assert_eq!(h.elevator.state(), SessionState::Parked);
    assert_eq!(report.visits, vec![5]);
    assert_eq!(report.moves, 2);
    assert_eq!(report.parked_at, Some(1));

    let car = h.elevator.car();
    assert_eq!(car.current_floor, 1);
    assert!(!car.doors_open);
    assert!(car.occupants.is_empty());
    assert_eq!(car.request_direction, None);

    assert_eq!(
        h.events().last(),
        Some(&TripEvent::Parked {
            floor: 1,
            offboarded: 2
        })
    );
}

#[test]
fn riders_too_heavy_for_the_car_are_refused() {
    let config = BuildingConfig {
        max_weight: 300,
        ..BuildingConfig::default()
    };
    let mut h = harness(config, Script::default());
    let (heavy, light) = (person(400), person(150));
    h.elevator.submit_call(3, Direction::Up, vec![heavy, light]).unwrap();

    let report = h.elevator.run().clone();
    assert_eq!(report.boarded, 1);
    assert_eq!(report.refused, vec![heavy]);
    assert!(h.events().contains(&TripEvent::Refused { floor: 3, count: 1 }));
}

#[test]
fn invalid_selections_are_dropped() {
    let script = Script {
        presses: vec![(3, vec![0, 11, 5, 5])],
        ..Script::default()
    };
    let mut h = harness(BuildingConfig::default(), script);
    h.elevator.submit_call(3, Direction::Up, vec![]).unwrap();

    let report = h.elevator.run().clone();
    assert_eq!(report.visits, vec![3, 5]);
    assert!(h.events().contains(&TripEvent::Selections {
        floor: 3,
        pressed: vec![5],
        lit: vec![5]
    }));
}

#[test]
fn offboard_indices_are_deduplicated_and_bounded() {
    let (a, b, c) = (person(120), person(140), person(160));
    let script = Script {
        presses: vec![(2, vec![5])],
        exits: vec![(5, vec![2, 2, 9, 0])],
        ..Script::default()
    };
    let mut h = harness(BuildingConfig::default(), script);
    h.elevator.submit_call(2, Direction::Up, vec![a, b, c]).unwrap();

    while h.elevator.car().current_floor != 5 {
        h.elevator.step();
    }
    assert_eq!(h.elevator.car().occupants, VecDeque::from(vec![b]));
    assert!(h.events().contains(&TripEvent::Offboarded { floor: 5, count: 2 }));
}

#[test]
fn clock_receives_travel_and_door_durations() {
    let mut h = harness(BuildingConfig::default(), Script::default());
    h.elevator.submit_call(5, Direction::Up, vec![]).unwrap();
    h.elevator.step();
    h.elevator.step();

    let waits = h.waits.borrow().clone();
    assert_eq!(
        waits,
        vec![
            (Phase::Travel { from: 1, to: 5 }, Duration::from_secs(2)),
            (Phase::DoorsOpening, Duration::from_secs(4)),
            (Phase::DoorsClosing, Duration::from_secs(4)),
        ]
    );
    assert_eq!(h.timeouts.borrow().as_slice(), &[Duration::from_secs(12)]);
}
