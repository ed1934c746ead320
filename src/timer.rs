use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;
use std::rc::Rc;

/// Source of wall-clock time for the engine
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-advanced clock; clones share the same instant
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(Duration::seconds(secs));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// One-second countdown driven by external ticks
///
/// Starts disarmed. Once cancelled, ticks are ignored until it is re-armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining_secs: u32,
    armed: bool,
}

impl Countdown {
    pub fn new(secs: u32) -> Self {
        Self {
            remaining_secs: secs,
            armed: false,
        }
    }

    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn cancel(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Count down one second. Returns true when this tick reached zero.
    pub fn tick(&mut self) -> bool {
        if !self.armed {
            return false;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        self.remaining_secs == 0
    }
}
