use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::progress::KeyValueStore;
use crate::render::Renderer;
use crate::session::Mode;
use crate::timer::Clock;
use crate::trainer::Trainer;
use crate::typing_policy::Verdict;

/// Unified event type consumed by the trainer loop
#[derive(Clone, Debug, PartialEq)]
pub enum TrainerEvent {
    /// Full contents of the input widget after an edit
    Input(String),
    Start,
    Reset,
    SetMode(Mode),
    Tick,
}

/// Source of UI events
pub trait TrainerEventSource {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<TrainerEvent, RecvTimeoutError>;
}

/// Event source fed through an mpsc channel by the UI thread
pub struct ChannelEventSource {
    rx: Receiver<TrainerEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<TrainerEvent>) -> Self {
        Self { rx }
    }
}

impl TrainerEventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TrainerEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// The trainer's one-second countdown resolution
    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Runner that advances the trainer one event/tick at a time
///
/// Ticks are scheduled against a deadline, so a steady stream of input
/// events does not starve the countdown.
pub struct Runner<E: TrainerEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    next_tick: Instant,
}

impl<E: TrainerEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        let next_tick = Instant::now() + ticker.interval();
        Self {
            event_source,
            ticker,
            next_tick,
        }
    }

    /// Blocks until the next event or tick deadline and returns whichever comes first
    pub fn step(&mut self) -> TrainerEvent {
        let now = Instant::now();
        if now >= self.next_tick {
            return self.fire_tick();
        }

        match self.event_source.recv_timeout(self.next_tick - now) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => self.fire_tick(),
            Err(RecvTimeoutError::Disconnected) => {
                // recv returns at once when no sender is left; keep the tick cadence
                thread::sleep(self.next_tick.saturating_duration_since(Instant::now()));
                self.fire_tick()
            }
        }
    }

    fn fire_tick(&mut self) -> TrainerEvent {
        self.next_tick = Instant::now() + self.ticker.interval();
        TrainerEvent::Tick
    }
}

/// Apply one event to the trainer. Returns the verdict for input events.
pub fn dispatch<S, R, C>(trainer: &mut Trainer<S, R, C>, event: TrainerEvent) -> Option<Verdict>
where
    S: KeyValueStore,
    R: Renderer,
    C: Clock,
{
    match event {
        TrainerEvent::Input(buffer) => return Some(trainer.on_input(&buffer)),
        TrainerEvent::Start => {
            if let Err(e) = trainer.start() {
                log::debug!(target: "runtime", "start ignored: {e}");
            }
        }
        TrainerEvent::Reset => trainer.reset(),
        TrainerEvent::SetMode(mode) => trainer.set_mode(mode),
        TrainerEvent::Tick => {
            trainer.tick();
        }
    }
    None
}
