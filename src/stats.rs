use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Characters per word when converting to WPM
pub const CHARS_PER_WORD: f64 = 5.0;

/// Smallest elapsed time metrics are computed over (one millisecond)
pub const MIN_ELAPSED_MINUTES: f64 = 1.0 / 60_000.0;

/// Elapsed time assumed when a session ends without any keystroke
pub const UNSTARTED_ELAPSED_MINUTES: f64 = 1.0;

/// Results of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalStats {
    pub wpm: u32,
    pub accuracy: u32,
    pub elapsed_minutes: f64,
}

impl FinalStats {
    pub fn compute(correct: u32, attempts: u32, elapsed_minutes: f64) -> Self {
        let elapsed_minutes = elapsed_minutes.max(MIN_ELAPSED_MINUTES);
        Self {
            wpm: wpm(correct, elapsed_minutes),
            accuracy: accuracy(correct, attempts),
            elapsed_minutes,
        }
    }

    /// wpm scaled by the accuracy fraction
    pub fn combined_score(&self) -> f64 {
        self.wpm as f64 * (self.accuracy as f64 / 100.0)
    }
}

/// Running numbers shown while typing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LiveMetrics {
    pub wpm: u32,
    pub accuracy: u32,
}

pub fn wpm(correct: u32, elapsed_minutes: f64) -> u32 {
    let minutes = elapsed_minutes.max(MIN_ELAPSED_MINUTES);
    ((correct as f64 / CHARS_PER_WORD) / minutes).round() as u32
}

/// Percentage of correct attempts; 100 when nothing was attempted
pub fn accuracy(correct: u32, attempts: u32) -> u32 {
    if attempts == 0 {
        return 100;
    }
    let correct = correct.min(attempts);
    (100.0 * correct as f64 / attempts as f64).round() as u32
}

/// Minutes between two instants, never negative
pub fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let ms = (end - start).num_milliseconds().max(0);
    ms as f64 / 60_000.0
}
