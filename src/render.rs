use crate::notice::Notice;
use crate::session::CharStatus;
use std::ops::Range;

/// Numbers shown next to the text while typing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveStats {
    pub wpm: u32,
    pub accuracy: u32,
    pub level: u8,
}

/// End-of-test summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultsSummary {
    pub wpm: u32,
    pub accuracy: u32,
    pub level: u8,
}

/// Display callbacks the trainer invokes after every state change.
///
/// Implementations receive plain data and own all layout, styling and
/// animation.
pub trait Renderer {
    /// New practice text; every character starts out pending
    fn show_text(&mut self, text: &str);
    fn set_char_status(&mut self, range: Range<usize>, status: CharStatus);
    /// 0-100
    fn set_progress(&mut self, percent: f64);
    fn set_live_stats(&mut self, stats: LiveStats);
    fn set_badge_count(&mut self, count: u32);
    fn show_notice(&mut self, notice: &Notice);
    fn hide_notice(&mut self);
    fn show_results(&mut self, summary: ResultsSummary);
}

/// Renderer that draws nothing, for headless use
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn show_text(&mut self, _text: &str) {}
    fn set_char_status(&mut self, _range: Range<usize>, _status: CharStatus) {}
    fn set_progress(&mut self, _percent: f64) {}
    fn set_live_stats(&mut self, _stats: LiveStats) {}
    fn set_badge_count(&mut self, _count: u32) {}
    fn show_notice(&mut self, _notice: &Notice) {}
    fn hide_notice(&mut self) {}
    fn show_results(&mut self, _summary: ResultsSummary) {}
}
