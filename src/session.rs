use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Practice mode selected by the user
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Standard,
    Focus,
}

/// Lifecycle of a single typing test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Finished,
}

/// Display state of one character of the practice text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharStatus {
    Pending,
    Current,
    Correct,
    Incorrect,
}

/// Per-test typing state
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub text: Vec<char>,
    pub cursor: usize,
    pub correct_count: u32,
    pub total_attempts: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub time_remaining_secs: u32,
}

impl Session {
    pub fn new(text: &str, time_limit_secs: u32) -> Self {
        Self {
            text: text.chars().collect(),
            cursor: 0,
            correct_count: 0,
            total_attempts: 0,
            started_at: None,
            time_remaining_secs: time_limit_secs,
        }
    }

    pub fn empty(time_limit_secs: u32) -> Self {
        Self::new("", time_limit_secs)
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn expected_char(&self) -> Option<char> {
        self.text.get(self.cursor).copied()
    }

    pub fn is_complete(&self) -> bool {
        !self.text.is_empty() && self.cursor >= self.text.len()
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Share of the text typed correctly, 0-100
    pub fn progress_percent(&self) -> f64 {
        if self.text.is_empty() {
            return 0.0;
        }
        (100.0 * self.cursor as f64 / self.text.len() as f64).min(100.0)
    }

    /// The committed correct prefix of the text
    pub fn committed(&self) -> String {
        self.text[..self.cursor].iter().collect()
    }

    pub fn text_string(&self) -> String {
        self.text.iter().collect()
    }
}
