use chrono::{DateTime, Duration, Utc};

/// How long achievement and level-up notices stay on screen
pub const NOTICE_DURATION_MS: i64 = 3000;

/// A transient message shown over the trainer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub shown_at: DateTime<Utc>,
    pub duration: Duration,
}

impl Notice {
    pub fn new(message: impl Into<String>, shown_at: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            message: message.into(),
            shown_at,
            duration,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.shown_at + self.duration
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

/// Holds the notice currently on screen; a new notice replaces the old one
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    active: Option<Notice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, notice: Notice) {
        self.active = Some(notice);
    }

    pub fn active(&self) -> Option<&Notice> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Drop the notice once its time is up. Returns the dismissed notice.
    pub fn update(&mut self, now: DateTime<Utc>) -> Option<Notice> {
        if self.active.as_ref().is_some_and(|n| n.is_expired(now)) {
            return self.active.take();
        }
        None
    }
}
