//! Background countdown engine.
//!
//! The engine owns the deadline and the poll timer on its own thread. The
//! foreground only talks to it through [`EngineHandle`], which sends
//! [`Command`]s and receives [`Signal`]s over channels.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(250);
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);
pub const MAX_TICK_INTERVAL: Duration = Duration::from_millis(1000);
/// Longer countdowns are clamped to roughly a century.
pub const MAX_COUNTDOWN_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Identifies one `start` command and every signal it produces.
pub type RunId = u64;

/// Controller -> engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start { run: RunId, duration_secs: u64 },
    Stop,
}

/// Engine -> controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Tick { time_left: u64 },
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tagged {
    pub run: RunId,
    pub signal: Signal,
}

/// A countdown measured against a fixed deadline.
///
/// Remaining time is always recomputed from the deadline, so late or early
/// polls never accumulate into drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    deadline: Instant,
}

impl Countdown {
    /// The deadline saturates to the furthest instant the platform can
    /// represent, so huge durations never overflow.
    pub fn new(now: Instant, duration_secs: u64) -> Self {
        let mut span = Duration::from_secs(duration_secs.min(MAX_COUNTDOWN_SECS));
        let deadline = loop {
            match now.checked_add(span) {
                Some(deadline) => break deadline,
                None => span /= 2,
            }
        };
        Self { deadline }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Whole seconds left, rounded up. Zero once the deadline has passed.
    pub fn remaining_secs(&self, now: Instant) -> u64 {
        let left = self.deadline.saturating_duration_since(now);
        left.as_secs() + u64::from(left.subsec_nanos() > 0)
    }

    pub fn poll(&self, now: Instant) -> Signal {
        match self.remaining_secs(now) {
            0 => Signal::Finish,
            time_left => Signal::Tick { time_left },
        }
    }
}

#[derive(Debug)]
struct ActiveRun {
    id: RunId,
    countdown: Countdown,
    last_tick: Option<u64>,
}

struct Worker {
    commands: Receiver<Command>,
    signals: Sender<Tagged>,
    tick_interval: Duration,
    active: Option<ActiveRun>,
    next_poll: Instant,
}

impl Worker {
    fn run(mut self) {
        loop {
            let command = if self.active.is_some() {
                let wait = self.next_poll.saturating_duration_since(Instant::now());
                match self.commands.recv_timeout(wait) {
                    Ok(command) => Some(command),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            } else {
                match self.commands.recv() {
                    Ok(command) => Some(command),
                    Err(_) => break,
                }
            };

            let keep_going = match command {
                Some(command) => {
                    self.handle(command);
                    true
                }
                None => self.poll(),
            };
            if !keep_going {
                break;
            }
        }
        debug!("countdown engine exiting");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Start { run, duration_secs } => {
                let now = Instant::now();
                if let Some(previous) = self.active.take() {
                    debug!(run = previous.id, "superseding countdown");
                }
                self.active = Some(ActiveRun {
                    id: run,
                    countdown: Countdown::new(now, duration_secs),
                    last_tick: None,
                });
                self.next_poll = now + self.tick_interval;
                info!(run, duration_secs, "countdown started");
            }
            Command::Stop => {
                if let Some(previous) = self.active.take() {
                    info!(run = previous.id, "countdown stopped");
                }
            }
        }
    }

    /// Returns false once nobody is listening for signals.
    fn poll(&mut self) -> bool {
        let Some(active) = self.active.as_mut() else {
            return true;
        };

        let now = Instant::now();
        let run = active.id;
        let signal = match active.countdown.poll(now) {
            Signal::Finish => {
                self.active = None;
                info!(run, "countdown finished");
                Signal::Finish
            }
            Signal::Tick { time_left } => {
                self.next_poll += self.tick_interval;
                if self.next_poll < now {
                    self.next_poll = now + self.tick_interval;
                }
                // several polls land inside the same second; report each value once
                if active.last_tick == Some(time_left) {
                    return true;
                }
                active.last_tick = Some(time_left);
                Signal::Tick { time_left }
            }
        };

        self.signals.send(Tagged { run, signal }).is_ok()
    }
}

pub struct CountdownEngine;

impl CountdownEngine {
    /// Spawn the engine thread. It lives until the returned handle is dropped.
    pub fn spawn(tick_interval: Duration) -> EngineHandle {
        let tick_interval = tick_interval.clamp(MIN_TICK_INTERVAL, MAX_TICK_INTERVAL);
        let (command_tx, command_rx) = mpsc::channel();
        let (signal_tx, signal_rx) = mpsc::channel();

        let worker = Worker {
            commands: command_rx,
            signals: signal_tx,
            tick_interval,
            active: None,
            next_poll: Instant::now(),
        };
        thread::spawn(move || worker.run());

        EngineHandle {
            commands: command_tx,
            signals: signal_rx,
            next_run: 0,
            active: None,
        }
    }
}

/// Foreground side of the engine.
///
/// Signals from any run other than the current one are discarded on receipt,
/// so once `stop` or a new `start` returns, nothing from the old run is ever
/// handed back, even if the engine had already queued it.
pub struct EngineHandle {
    commands: Sender<Command>,
    signals: Receiver<Tagged>,
    next_run: RunId,
    active: Option<RunId>,
}

impl EngineHandle {
    pub fn start(&mut self, duration_secs: u64) -> RunId {
        self.next_run += 1;
        let run = self.next_run;
        self.active = Some(run);
        self.send(Command::Start { run, duration_secs });
        run
    }

    pub fn stop(&mut self) {
        self.active = None;
        self.send(Command::Stop);
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn try_recv(&mut self) -> Option<Signal> {
        while let Ok(tagged) = self.signals.try_recv() {
            if let Some(signal) = self.accept(tagged) {
                return Some(signal);
            }
        }
        None
    }

    /// Block up to `timeout` for the next signal of the current run.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<Signal> {
        let give_up_at = Instant::now() + timeout;
        loop {
            let wait = give_up_at.saturating_duration_since(Instant::now());
            let tagged = self.signals.recv_timeout(wait).ok()?;
            if let Some(signal) = self.accept(tagged) {
                return Some(signal);
            }
        }
    }

    fn accept(&mut self, tagged: Tagged) -> Option<Signal> {
        if self.active != Some(tagged.run) {
            debug!(run = tagged.run, signal = ?tagged.signal, "dropping stale signal");
            return None;
        }
        if tagged.signal == Signal::Finish {
            self.active = None;
        }
        Some(tagged.signal)
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            warn!(?command, "countdown engine is gone");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const FAST: Duration = Duration::from_millis(5);

    fn collect_until_finish(handle: &mut EngineHandle, timeout: Duration) -> Vec<Signal> {
        let mut signals = Vec::new();
        while let Some(signal) = handle.recv_timeout(timeout) {
            signals.push(signal);
            if signal == Signal::Finish {
                break;
            }
        }
        signals
    }

    #[test]
    fn remaining_rounds_up_to_whole_seconds() {
        let t0 = Instant::now();
        let countdown = Countdown::new(t0, 3);

        assert_eq!(countdown.remaining_secs(t0), 3);
        assert_eq!(countdown.remaining_secs(t0 + Duration::from_millis(1)), 3);
        assert_eq!(countdown.remaining_secs(t0 + Duration::from_millis(1000)), 2);
        assert_eq!(countdown.remaining_secs(t0 + Duration::from_millis(2999)), 1);
        assert_eq!(countdown.remaining_secs(t0 + Duration::from_secs(3)), 0);
        assert_eq!(countdown.remaining_secs(t0 + Duration::from_secs(10)), 0);
    }

    #[test]
    fn poll_finishes_at_deadline() {
        let t0 = Instant::now();
        let countdown = Countdown::new(t0, 2);

        assert_eq!(
            countdown.poll(t0 + Duration::from_millis(250)),
            Signal::Tick { time_left: 2 }
        );
        assert_eq!(countdown.poll(countdown.deadline()), Signal::Finish);
        assert_eq!(
            countdown.poll(countdown.deadline() + Duration::from_secs(1)),
            Signal::Finish
        );
    }

    #[test]
    fn zero_duration_finishes_on_first_poll() {
        let t0 = Instant::now();
        assert_eq!(Countdown::new(t0, 0).poll(t0), Signal::Finish);
    }

    #[test]
    fn huge_duration_saturates_instead_of_overflowing() {
        let t0 = Instant::now();
        let countdown = Countdown::new(t0, u64::MAX);

        assert!(countdown.deadline() > t0);
        let left = countdown.remaining_secs(t0);
        assert!(left > 0 && left <= MAX_COUNTDOWN_SECS);
        assert_matches!(countdown.poll(t0), Signal::Tick { .. });
    }

    #[test]
    fn engine_survives_huge_duration() {
        let mut handle = CountdownEngine::spawn(FAST);
        handle.start(u64::MAX);
        assert_matches!(
            handle.recv_timeout(Duration::from_secs(2)),
            Some(Signal::Tick { time_left }) if time_left > 0
        );

        handle.stop();
        handle.start(1);
        let signals = collect_until_finish(&mut handle, Duration::from_secs(3));
        assert_eq!(signals.last(), Some(&Signal::Finish));
    }

    #[test]
    fn sloppy_polling_does_not_drift() {
        // Each poll arrives 300ms late; a decrementing counter would lag by
        // several seconds after 20 polls.
        let t0 = Instant::now();
        let countdown = Countdown::new(t0, 30);
        let mut now = t0;
        for _ in 0..20 {
            now += Duration::from_millis(1300);
        }

        assert_eq!(countdown.poll(now), Signal::Tick { time_left: 4 });
    }

    #[test]
    fn engine_counts_down_then_finishes_once() {
        let mut handle = CountdownEngine::spawn(FAST);
        handle.start(1);

        let signals = collect_until_finish(&mut handle, Duration::from_secs(3));
        assert_matches!(signals.last(), Some(Signal::Finish));

        let ticks: Vec<u64> = signals
            .iter()
            .filter_map(|s| match s {
                Signal::Tick { time_left } => Some(*time_left),
                Signal::Finish => None,
            })
            .collect();
        assert!(ticks.iter().all(|t| *t > 0));
        assert!(ticks.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(
            signals.iter().filter(|s| **s == Signal::Finish).count(),
            1
        );

        assert!(!handle.is_active());
        assert_eq!(handle.recv_timeout(Duration::from_millis(100)), None);
    }

    #[test]
    fn stop_silences_the_run() {
        let mut handle = CountdownEngine::spawn(FAST);
        handle.start(1);
        handle.stop();

        assert_eq!(handle.recv_timeout(Duration::from_millis(1500)), None);
    }

    #[test]
    fn stop_discards_already_queued_signals() {
        let mut handle = CountdownEngine::spawn(MIN_TICK_INTERVAL);
        handle.start(2);
        thread::sleep(Duration::from_millis(50));
        handle.stop();

        assert_eq!(handle.try_recv(), None);
    }

    #[test]
    fn stop_when_idle_is_a_no_op() {
        let mut handle = CountdownEngine::spawn(FAST);
        handle.stop();
        handle.stop();

        assert!(!handle.is_active());
        assert_eq!(handle.try_recv(), None);
    }

    #[test]
    fn restart_supersedes_previous_run() {
        let mut handle = CountdownEngine::spawn(FAST);
        handle.start(60);
        thread::sleep(Duration::from_millis(20));
        handle.start(1);

        let signals = collect_until_finish(&mut handle, Duration::from_secs(3));
        assert_matches!(signals.last(), Some(Signal::Finish));
        for signal in &signals {
            if let Signal::Tick { time_left } = signal {
                assert_eq!(*time_left, 1, "tick leaked from the superseded run");
            }
        }
    }

    #[test]
    fn run_ids_increase() {
        let mut handle = CountdownEngine::spawn(FAST);
        let first = handle.start(10);
        let second = handle.start(10);
        assert!(second > first);
        handle.stop();
    }
}
