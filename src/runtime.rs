use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

pub const PULSE_PERIOD: Duration = Duration::from_secs(1);

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// One beat of the session clock
    Pulse,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || loop {
            match event::read() {
                // key release/repeat events would double every action on
                // terminals that report them
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    if tx.send(AppEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(AppEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::error!(%err, "terminal input closed");
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Pulse deadlines spaced exactly one period apart.
///
/// Deadlines advance by the period rather than from "now", so time spent
/// handling events never pushes later pulses back. After a stall the missed
/// pulses are delivered back to back.
#[derive(Clone, Copy, Debug)]
pub struct Metronome {
    period: Duration,
    next: Instant,
}

impl Metronome {
    pub fn new(period: Duration) -> Self {
        Self::starting_at(period, Instant::now())
    }

    pub fn starting_at(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next: now + period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn next_deadline(&self) -> Instant {
        self.next
    }

    /// Restart the cadence: the next pulse lands one full period after `now`.
    pub fn realign(&mut self, now: Instant) {
        self.next = now + self.period;
    }

    pub fn until_next(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    /// Consume the current deadline
    pub fn beat(&mut self) {
        self.next += self.period;
    }
}

/// Runner that advances the application one event/pulse at a time
pub struct Runner<E: EventSource> {
    event_source: E,
    metronome: Metronome,
}

impl<E: EventSource> Runner<E> {
    pub fn new(event_source: E, period: Duration) -> Self {
        Self {
            event_source,
            metronome: Metronome::new(period),
        }
    }

    pub fn metronome(&self) -> &Metronome {
        &self.metronome
    }

    /// Next pulse one full period from now
    pub fn realign(&mut self) {
        self.metronome.realign(Instant::now());
    }

    /// Blocks until the next event or the next pulse deadline, whichever comes first
    pub fn step(&mut self) -> AppEvent {
        let wait = self.metronome.until_next(Instant::now());
        if wait.is_zero() {
            self.metronome.beat();
            return AppEvent::Pulse;
        }

        match self.event_source.recv_timeout(wait) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => {
                self.metronome.beat();
                AppEvent::Pulse
            }
            Err(RecvTimeoutError::Disconnected) => {
                thread::sleep(wait);
                self.metronome.beat();
                AppEvent::Pulse
            }
        }
    }
}
