use crate::session::Mode;
use crate::stats::FinalStats;
use log::info;

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 5;

const PROMOTE_SCORE: f64 = 40.0;
const PROMOTE_ACCURACY: u32 = 95;
const DEMOTE_SCORE: f64 = 20.0;

/// Outcome of an end-of-session difficulty review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjustment {
    pub level: u8,
    pub leveled_up: bool,
}

impl Adjustment {
    fn unchanged(level: u8) -> Self {
        Self {
            level,
            leveled_up: false,
        }
    }

    pub fn notice(&self) -> Option<String> {
        self.leveled_up
            .then(|| format!("Level Up! Now at Level {}", self.level))
    }
}

/// Owns the bounded difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyController {
    level: u8,
}

impl DifficultyController {
    pub fn new(level: u8) -> Self {
        Self {
            level: clamp_level(level),
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    /// Apply [`adjust`] to the held level
    pub fn review(&mut self, stats: &FinalStats, mode: Mode) -> Adjustment {
        let adjustment = adjust(stats, mode, self.level);
        if adjustment.level != self.level {
            info!(target: "difficulty", "level {} -> {}", self.level, adjustment.level);
        }
        self.level = adjustment.level;
        adjustment
    }
}

impl Default for DifficultyController {
    fn default() -> Self {
        Self::new(MIN_LEVEL)
    }
}

pub fn clamp_level(level: u8) -> u8 {
    level.clamp(MIN_LEVEL, MAX_LEVEL)
}

/// Next difficulty level after a session. Only standard sessions move it.
pub fn adjust(stats: &FinalStats, mode: Mode, current: u8) -> Adjustment {
    let current = clamp_level(current);
    if mode != Mode::Standard {
        return Adjustment::unchanged(current);
    }

    let combined = stats.combined_score();
    if combined > PROMOTE_SCORE && stats.accuracy > PROMOTE_ACCURACY && current < MAX_LEVEL {
        Adjustment {
            level: current + 1,
            leveled_up: true,
        }
    } else if combined < DEMOTE_SCORE && current > MIN_LEVEL {
        Adjustment::unchanged(current - 1)
    } else {
        Adjustment::unchanged(current)
    }
}
