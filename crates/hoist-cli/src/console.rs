//! Console front end – collaborators backed by stdin and a text renderer.
//!
//! A single reader thread owns stdin and forwards every line over a
//! `crossbeam-channel`.  The call prompt and the destination panel both read
//! from that channel, which is what lets the panel give up after its timeout
//! instead of blocking on `read_line` forever.
//!
//! Ctrl-C closes a separate stop channel.  A closed channel is always ready,
//! so an open door stops waiting for buttons at once.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use colored::Colorize;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, select, unbounded};
use hoist_core::{CallSource, Clock, DestinationPanel, Phase, TripObserver, Work};
use hoist_types::{BuildingConfig, Direction, Floor, HallCall, HoistError, TripEvent};
use thiserror::Error;
use tracing::{debug, warn};

/// Width of the dashed rules around banners.
const HEADER_WIDTH: usize = 72;

/// How often a blocked prompt re-checks the shutdown flag.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Time between loading dots.
const DOT_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Error, Debug, PartialEq)]
pub enum InputError {
    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("enter a number between 1 and {max}, or 0 to exit")]
    CountOutOfRange { max: usize },

    #[error("expected '<floor> <up|down>', got '{0}'")]
    Malformed(String),

    #[error(transparent)]
    Hoist(#[from] HoistError),
}

// ────────────────────────────────────────────────────────────────────────────
// Parsing
// ────────────────────────────────────────────────────────────────────────────

/// Parse the "how many new calls" answer.  `0` means "exit".
pub fn parse_call_count(line: &str, max: usize) -> Result<usize, InputError> {
    let trimmed = line.trim();
    let count: usize = trimmed
        .parse()
        .map_err(|_| InputError::NotANumber(trimmed.to_string()))?;
    if count > max {
        return Err(InputError::CountOutOfRange { max });
    }
    Ok(count)
}

/// Parse `"<floor> <up|down>"`.
pub fn parse_hall_call(line: &str, config: &BuildingConfig) -> Result<HallCall, InputError> {
    let mut parts = line.split_whitespace();
    let (Some(floor), Some(direction), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(InputError::Malformed(line.trim().to_string()));
    };
    let floor: Floor = floor
        .parse()
        .map_err(|_| InputError::NotANumber(floor.to_string()))?;
    let direction: Direction = direction.parse()?;
    config.check_floor(floor)?;
    Ok(HallCall::new(floor, direction))
}

/// Parse space-separated destination floors.  Anything that is not a number
/// is skipped; range checks happen in the dispatcher.
pub fn parse_selections(line: &str) -> Vec<Floor> {
    line.split_whitespace()
        .filter_map(|token| match token.parse() {
            Ok(floor) => Some(floor),
            Err(_) => {
                debug!(token, "ignoring non-numeric destination");
                None
            }
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Input
// ────────────────────────────────────────────────────────────────────────────

/// Start the thread that owns stdin.  The channel disconnects at EOF.
pub fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = unbounded::<String>();
    let spawned = thread::Builder::new()
        .name("stdin_reader".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "stdin read failed");
                        break;
                    }
                }
            }
        });
    if let Err(e) = spawned {
        warn!(error = %e, "failed to start stdin reader; console input disabled");
    }
    rx
}

/// The stop channel: drop the sender to signal every receiver.
pub fn stop_channel() -> (Sender<()>, Receiver<()>) {
    bounded(0)
}

fn prompt(message: &str) {
    print!("{message}");
    io::stdout().flush().ok();
}

/// Hallway calls typed at the console.
pub struct ConsoleCallSource {
    lines: Receiver<String>,
    shutdown: Arc<AtomicBool>,
    config: BuildingConfig,
}

impl ConsoleCallSource {
    pub fn new(lines: Receiver<String>, shutdown: Arc<AtomicBool>, config: &BuildingConfig) -> Self {
        Self {
            lines,
            shutdown,
            config: config.clone(),
        }
    }

    /// Next input line, or `None` once shutdown was requested or stdin closed.
    fn next_line(&self, message: &str) -> Option<String> {
        prompt(message);
        loop {
            if self.shutdown.load(Ordering::SeqCst) {
                println!();
                return None;
            }
            match self.lines.recv_timeout(POLL_INTERVAL) {
                Ok(line) => return Some(line),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    println!();
                    return None;
                }
            }
        }
    }

    fn read_call(&self, index: usize, total: usize) -> Option<HallCall> {
        let message = format!(
            "  Call {index} of {total} – floor ({} - {}) and direction, e.g. '4 up': ",
            self.config.min_floor, self.config.max_floor
        );
        loop {
            let line = self.next_line(&message)?;
            match parse_hall_call(&line, &self.config) {
                Ok(call) => return Some(call),
                Err(e) => println!("  {}", e.to_string().red()),
            }
        }
    }
}

impl CallSource for ConsoleCallSource {
    fn request_more_work(&mut self) -> Work {
        let max = self.config.max_simultaneous_calls();
        let message = format!("\nNo waiting calls in queue. Enter desired number of new calls (1 - {max}) 0 to exit: ");
        loop {
            let Some(line) = self.next_line(&message) else {
                return Work::NoMoreWork;
            };
            match parse_call_count(&line, max) {
                Ok(0) => return Work::NoMoreWork,
                Ok(count) => {
                    let mut calls = Vec::with_capacity(count);
                    for index in 1..=count {
                        match self.read_call(index, count) {
                            Some(call) => calls.push(call),
                            None => return Work::NoMoreWork,
                        }
                    }
                    return Work::Calls(calls);
                }
                Err(e) => println!("  {}", e.to_string().red()),
            }
        }
    }
}

/// In-cab destination buttons typed at the console.
pub struct ConsolePanel {
    lines: Receiver<String>,
    stop: Receiver<()>,
    min_floor: Floor,
    max_floor: Floor,
}

impl ConsolePanel {
    pub fn new(lines: Receiver<String>, stop: Receiver<()>, config: &BuildingConfig) -> Self {
        Self {
            lines,
            stop,
            min_floor: config.min_floor,
            max_floor: config.max_floor,
        }
    }
}

impl DestinationPanel for ConsolePanel {
    fn collect_selections(&mut self, _floor: Floor, timeout: Duration) -> Vec<Floor> {
        prompt(&format!(
            "\nEnter your destination floor(s) ({} - {}) multiple floors separated by space: ",
            self.min_floor, self.max_floor
        ));
        select! {
            recv(self.lines) -> line => match line {
                Ok(line) => parse_selections(&line),
                Err(_) => Vec::new(),
            },
            recv(self.stop) -> _ => {
                println!("\n{}", "Stopping... closing doors".dimmed());
                Vec::new()
            },
            default(timeout) => {
                println!("\n{}", "No button pressed... closing doors".dimmed());
                Vec::new()
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pacing
// ────────────────────────────────────────────────────────────────────────────

/// Number of loading dots printed for a wait of `duration`.
pub fn dot_count(duration: Duration, interval: Duration) -> usize {
    if interval.is_zero() {
        return 0;
    }
    duration.as_nanos().div_ceil(interval.as_nanos()) as usize
}

/// Prints loading dots for every wait and, when `realtime`, actually sleeps.
pub struct ConsoleClock {
    realtime: bool,
}

impl ConsoleClock {
    pub fn new(realtime: bool) -> Self {
        Self { realtime }
    }
}

impl Clock for ConsoleClock {
    fn wait(&mut self, phase: Phase, duration: Duration) {
        let label = match phase {
            Phase::Travel { from, to } => {
                let heading = if to > from { "Up" } else { "Down" };
                format!("\t- Elevator going {heading}")
            }
            Phase::DoorsOpening => "\t- Doors opening".to_string(),
            Phase::DoorsClosing => "\t- Closing doors".to_string(),
        };
        prompt(&label);
        for _ in 0..dot_count(duration, DOT_INTERVAL) {
            prompt(".");
            if self.realtime {
                thread::sleep(DOT_INTERVAL);
            }
        }
        println!();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rendering
// ────────────────────────────────────────────────────────────────────────────

/// `1st`, `2nd`, `3rd`, `4th`, `11th`, `21st`, …
pub fn ordinal(floor: Floor) -> String {
    let n = floor.unsigned_abs();
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{floor}{suffix}")
}

/// The panel strip: `| 1: - | 2: * | … |`.
pub fn render_panel(min_floor: Floor, max_floor: Floor, lit: &[Floor]) -> String {
    let cells: Vec<String> = (min_floor..=max_floor)
        .map(|floor| {
            let mark = if lit.contains(&floor) { '*' } else { '-' };
            format!("{floor}: {mark}")
        })
        .collect();
    format!("| {} |", cells.join(" | "))
}

fn rule() -> String {
    "-".repeat(HEADER_WIDTH)
}

/// Human-readable narration of a session.
pub struct ConsoleObserver {
    min_floor: Floor,
    max_floor: Floor,
    floor_count: usize,
}

impl ConsoleObserver {
    pub fn new(config: &BuildingConfig) -> Self {
        Self {
            min_floor: config.min_floor,
            max_floor: config.max_floor,
            floor_count: config.floor_count(),
        }
    }

    fn print_panel(&self, lit: &[Floor]) {
        println!("{}", rule());
        println!("{}", render_panel(self.min_floor, self.max_floor, lit));
        println!("{}", rule());
        if lit.len() == self.floor_count {
            let text = format!("{stars} IT LOOKS LIKE A CHRISTMAS TREE! {stars}", stars = "*".repeat(5));
            let width = HEADER_WIDTH - 2;
            println!("|{}|", format!("{text:^width$}").green().bold());
            println!("{}", rule());
        }
    }
}

impl TripObserver for ConsoleObserver {
    fn on_event(&mut self, event: &TripEvent) {
        match event {
            TripEvent::Dispatched { floor, direction, plan } => {
                println!(
                    "\n  Dispatching to floor {} ({direction}), stops {:?}",
                    floor.to_string().bold(),
                    plan
                );
            }
            TripEvent::Overloaded { load, stranded, .. } => {
                println!(
                    "{}",
                    format!("\t - Elevator above weight limit ({load} lb). {stranded} passenger(s) must exit")
                        .yellow()
                        .bold()
                );
            }
            TripEvent::Departed { to, .. } => {
                println!("\n{}\n| Next Floor: {to}\n{}", rule(), rule());
            }
            TripEvent::Arrived { floor } => {
                let banner = format!("|{stars} DING! {} Floor {stars}", ordinal(*floor), stars = "*".repeat(5));
                println!("{}\n{}\n{}", rule(), banner.bold().green(), rule());
            }
            TripEvent::Offboarded { count, .. } => {
                println!("\t - {count} passenger(s) exited on floor");
            }
            TripEvent::Selections { lit, .. } => self.print_panel(lit),
            TripEvent::Boarded { count, .. } => {
                println!("\t - {count} passenger(s) boarded the elevator");
            }
            TripEvent::Refused { count, .. } => {
                println!(
                    "{}",
                    format!("\t - {count} passenger(s) too heavy for this car stayed behind").red()
                );
            }
            TripEvent::Reversed { direction } => {
                println!("  Changing direction, now heading {direction}");
            }
            TripEvent::Parked { floor, offboarded } => {
                println!(
                    "\n  {} at floor {floor}; {offboarded} passenger(s) exited",
                    "Elevator parked".bold().cyan()
                );
            }
        }
    }
}

/// Mirrors every event as one JSON line.
pub struct EventMirror<W: Write> {
    out: W,
}

impl EventMirror<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> EventMirror<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TripObserver for EventMirror<W> {
    fn on_event(&mut self, event: &TripEvent) {
        let written = serde_json::to_string(event)
            .map_err(io::Error::other)
            .and_then(|line| writeln!(self.out, "{line}"));
        if let Err(e) = written {
            warn!(error = %e, "failed to mirror trip event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel_with(lines: &[&str]) -> Receiver<String> {
        let (tx, rx) = unbounded();
        for line in lines {
            tx.send(line.to_string()).unwrap();
        }
        rx
    }

    #[test]
    fn call_count_accepts_range_and_zero() {
        assert_eq!(parse_call_count(" 3 ", 18), Ok(3));
        assert_eq!(parse_call_count("0", 18), Ok(0));
        assert_eq!(parse_call_count("19", 18), Err(InputError::CountOutOfRange { max: 18 }));
        assert_eq!(parse_call_count("lots", 18), Err(InputError::NotANumber("lots".into())));
        assert!(parse_call_count("-1", 18).is_err());
    }

    #[test]
    fn hall_call_parses_floor_and_direction() {
        let cfg = BuildingConfig::default();
        assert_eq!(parse_hall_call("4 up", &cfg), Ok(HallCall::new(4, Direction::Up)));
        assert_eq!(parse_hall_call("  7   DOWN ", &cfg), Ok(HallCall::new(7, Direction::Down)));
    }

    #[test]
    fn hall_call_rejects_bad_input() {
        let cfg = BuildingConfig::default();
        assert!(matches!(parse_hall_call("4", &cfg), Err(InputError::Malformed(_))));
        assert!(matches!(parse_hall_call("4 up now", &cfg), Err(InputError::Malformed(_))));
        assert!(matches!(parse_hall_call("four up", &cfg), Err(InputError::NotANumber(_))));
        assert!(matches!(
            parse_hall_call("4 sideways", &cfg),
            Err(InputError::Hoist(HoistError::InvalidDirection(_)))
        ));
        assert!(matches!(
            parse_hall_call("12 down", &cfg),
            Err(InputError::Hoist(HoistError::InvalidFloor { floor: 12, .. }))
        ));
    }

    #[test]
    fn selections_skip_garbage() {
        assert_eq!(parse_selections("3 x 7  12 -1"), vec![3, 7, 12, -1]);
        assert!(parse_selections("").is_empty());
    }

    #[test]
    fn ordinals_use_english_suffixes() {
        let cases = [
            (1, "1st"),
            (2, "2nd"),
            (3, "3rd"),
            (4, "4th"),
            (10, "10th"),
            (11, "11th"),
            (12, "12th"),
            (13, "13th"),
            (21, "21st"),
            (22, "22nd"),
            (101, "101st"),
            (111, "111th"),
            (-2, "-2nd"),
        ];
        for (floor, expected) in cases {
            assert_eq!(ordinal(floor), expected);
        }
    }

    #[test]
    fn panel_strip_marks_lit_floors() {
        assert_eq!(render_panel(1, 4, &[2, 4]), "| 1: - | 2: * | 3: - | 4: * |");
        assert_eq!(render_panel(1, 2, &[]), "| 1: - | 2: - |");
    }

    #[test]
    fn dots_cover_the_whole_wait() {
        assert_eq!(dot_count(Duration::from_secs(1), DOT_INTERVAL), 4);
        assert_eq!(dot_count(Duration::from_millis(1100), DOT_INTERVAL), 5);
        assert_eq!(dot_count(Duration::ZERO, DOT_INTERVAL), 0);
        assert_eq!(dot_count(Duration::from_secs(1), Duration::ZERO), 0);
    }

    #[test]
    fn call_source_reprompts_until_input_is_valid() {
        let cfg = BuildingConfig::default();
        let lines = channel_with(&["many", "2", "2 up", "bogus", "9 down", "0"]);
        let mut source = ConsoleCallSource::new(lines, Arc::new(AtomicBool::new(false)), &cfg);

        assert_eq!(
            source.request_more_work(),
            Work::Calls(vec![HallCall::new(2, Direction::Up), HallCall::new(9, Direction::Down)])
        );
        assert_eq!(source.request_more_work(), Work::NoMoreWork);
    }

    #[test]
    fn call_source_stops_on_shutdown_or_eof() {
        let cfg = BuildingConfig::default();
        let (tx, rx) = unbounded::<String>();
        let mut source = ConsoleCallSource::new(rx.clone(), Arc::new(AtomicBool::new(true)), &cfg);
        assert_eq!(source.request_more_work(), Work::NoMoreWork);

        drop(tx);
        let mut source = ConsoleCallSource::new(rx, Arc::new(AtomicBool::new(false)), &cfg);
        assert_eq!(source.request_more_work(), Work::NoMoreWork);
    }

    #[test]
    fn panel_reads_a_waiting_line() {
        let cfg = BuildingConfig::default();
        let mut panel = ConsolePanel::new(channel_with(&["5 8"]), crossbeam_channel::never(), &cfg);
        assert_eq!(panel.collect_selections(2, Duration::from_secs(1)), vec![5, 8]);
    }

    #[test]
    fn panel_times_out_with_no_selection() {
        let cfg = BuildingConfig::default();
        let (_tx, rx) = unbounded::<String>();
        let mut panel = ConsolePanel::new(rx, crossbeam_channel::never(), &cfg);
        assert!(panel.collect_selections(2, Duration::from_millis(20)).is_empty());
    }

    #[test]
    fn panel_stops_waiting_once_stop_channel_closes() {
        let cfg = BuildingConfig::default();
        let (_tx, rx) = unbounded::<String>();
        let (stop_tx, stop_rx) = stop_channel();
        let mut panel = ConsolePanel::new(rx, stop_rx, &cfg);
        drop(stop_tx);

        let started = std::time::Instant::now();
        assert!(panel.collect_selections(2, Duration::from_secs(30)).is_empty());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn event_mirror_writes_json_lines() {
        let mut mirror = EventMirror::new(Vec::new());
        mirror.on_event(&TripEvent::Arrived { floor: 3 });
        mirror.on_event(&TripEvent::Reversed {
            direction: Direction::Down,
        });

        let out = String::from_utf8(mirror.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "arrived");
        assert_eq!(first["data"]["floor"], 3);
    }
}
