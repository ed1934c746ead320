use crate::error::{Error, Result};
use crate::error_tracker::ErrorTracker;
use crate::session::{CharStatus, Phase, Session};
use crate::stats::{self, FinalStats, LiveMetrics, UNSTARTED_ELAPSED_MINUTES};
use crate::timer::{Clock, Countdown, SystemClock};
use crate::typing_policy::{self, Verdict};
use log::{debug, info};

/// Default length of a timed test
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// The whole text was typed
    Completed,
    /// The countdown reached zero
    TimedOut,
}

/// Emitted once, on the call that moved the engine into `Finished`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Completion {
    pub reason: FinishReason,
    pub stats: FinalStats,
}

/// Result of feeding one input-buffer update to the engine
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub verdict: Verdict,
    pub completion: Option<Completion>,
}

/// State machine scoring a single typing test
///
/// `Idle -> Running -> Finished`, back to `Idle` through [`SessionEngine::reset`].
/// Mistypes accumulate in the owned [`ErrorTracker`] across sessions.
#[derive(Debug)]
pub struct SessionEngine<C: Clock = SystemClock> {
    session: Session,
    phase: Phase,
    countdown: Countdown,
    time_limit_secs: u32,
    errors: ErrorTracker,
    error_at_cursor: bool,
    final_stats: Option<FinalStats>,
    clock: C,
}

impl SessionEngine<SystemClock> {
    pub fn new(time_limit_secs: u32) -> Self {
        Self::with_clock(time_limit_secs, SystemClock)
    }
}

impl<C: Clock> SessionEngine<C> {
    pub fn with_clock(time_limit_secs: u32, clock: C) -> Self {
        Self {
            session: Session::empty(time_limit_secs),
            phase: Phase::Idle,
            countdown: Countdown::new(time_limit_secs),
            time_limit_secs,
            errors: ErrorTracker::new(),
            error_at_cursor: false,
            final_stats: None,
            clock,
        }
    }

    /// Begin a test over `text`. The countdown waits for the first keystroke.
    pub fn start(&mut self, text: &str) -> Result<()> {
        if self.phase != Phase::Idle {
            return Err(Error::NotIdle);
        }
        if text.is_empty() {
            return Err(Error::EmptyText);
        }

        self.session = Session::new(text, self.time_limit_secs);
        self.countdown = Countdown::new(self.time_limit_secs);
        self.error_at_cursor = false;
        self.final_stats = None;
        self.phase = Phase::Running;
        debug!(target: "engine", "session started over {} chars", self.session.len());
        Ok(())
    }

    /// Evaluate the current contents of the input widget
    pub fn handle_keystroke(&mut self, buffer: &str) -> Step {
        if self.phase != Phase::Running {
            return Step {
                verdict: Verdict::Ignored,
                completion: None,
            };
        }

        if self.session.started_at.is_none() {
            self.session.started_at = Some(self.clock.now());
            self.countdown.arm();
        }

        let verdict = typing_policy::apply_input(&mut self.session, buffer);
        match &verdict {
            Verdict::Correct => self.error_at_cursor = false,
            Verdict::Incorrect {
                expected, typed, ..
            } => {
                self.errors.record(*expected, *typed);
                self.error_at_cursor = true;
            }
            _ => {}
        }

        let completion = if self.session.is_complete() {
            Some(self.finish(FinishReason::Completed))
        } else {
            None
        };

        Step {
            verdict,
            completion,
        }
    }

    /// Advance the countdown by one second
    pub fn tick(&mut self) -> Option<Completion> {
        if self.phase != Phase::Running {
            return None;
        }

        let expired = self.countdown.tick();
        self.session.time_remaining_secs = self.countdown.remaining_secs();
        if expired {
            Some(self.finish(FinishReason::TimedOut))
        } else {
            None
        }
    }

    /// Drop the current test and return to `Idle`
    pub fn reset(&mut self) {
        self.countdown.cancel();
        self.session = Session::empty(self.time_limit_secs);
        self.countdown = Countdown::new(self.time_limit_secs);
        self.error_at_cursor = false;
        self.final_stats = None;
        self.phase = Phase::Idle;
    }

    fn finish(&mut self, reason: FinishReason) -> Completion {
        self.countdown.cancel();
        self.phase = Phase::Finished;

        let elapsed = match self.session.started_at {
            Some(started) => stats::minutes_between(started, self.clock.now()),
            None => UNSTARTED_ELAPSED_MINUTES,
        };
        let final_stats = FinalStats::compute(
            self.session.correct_count,
            self.session.total_attempts,
            elapsed,
        );
        self.final_stats = Some(final_stats);

        info!(
            target: "engine",
            "session finished ({reason:?}): {} wpm, {}% accuracy",
            final_stats.wpm, final_stats.accuracy
        );
        Completion {
            reason,
            stats: final_stats,
        }
    }

    /// Metrics over the time elapsed so far
    pub fn live_metrics(&self) -> LiveMetrics {
        let accuracy = stats::accuracy(self.session.correct_count, self.session.total_attempts);
        let wpm = match self.session.started_at {
            Some(started) => stats::wpm(
                self.session.correct_count,
                stats::minutes_between(started, self.clock.now()),
            ),
            None => 0,
        };
        LiveMetrics { wpm, accuracy }
    }

    pub fn char_status(&self, idx: usize) -> CharStatus {
        let cursor = self.session.cursor;
        if idx < cursor {
            CharStatus::Correct
        } else if idx == cursor && self.phase == Phase::Running {
            if self.error_at_cursor {
                CharStatus::Incorrect
            } else {
                CharStatus::Current
            }
        } else {
            CharStatus::Pending
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn has_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn final_stats(&self) -> Option<FinalStats> {
        self.final_stats
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    pub fn errors(&self) -> &ErrorTracker {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut ErrorTracker {
        &mut self.errors
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualClock;
    use assert_matches::assert_matches;

    fn engine_with_clock(limit: u32) -> (SessionEngine<ManualClock>, ManualClock) {
        let clock = ManualClock::default();
        (SessionEngine::with_clock(limit, clock.clone()), clock)
    }

    /// Type `text` one character at a time, as an input widget would report it
    fn type_all(engine: &mut SessionEngine<ManualClock>, text: &str) -> Vec<Step> {
        let mut steps = Vec::new();
        for c in text.chars() {
            let mut buffer = engine.session().committed();
            buffer.push(c);
            steps.push(engine.handle_keystroke(&buffer));
        }
        steps
    }

    #[test]
    fn test_new_engine_is_idle() {
        let engine = SessionEngine::new(60);

        assert_eq!(engine.phase(), Phase::Idle);
        assert_eq!(engine.session().cursor, 0);
        assert!(engine.final_stats().is_none());
    }

    #[test]
    fn test_start_rejects_empty_text() {
        let (mut engine, _) = engine_with_clock(60);
        assert_matches!(engine.start(""), Err(Error::EmptyText));
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_start_twice_rejected() {
        let (mut engine, _) = engine_with_clock(60);
        engine.start("abc").unwrap();
        assert_matches!(engine.start("abc"), Err(Error::NotIdle));
    }

    #[test]
    fn test_keystroke_while_idle_is_noop() {
        let (mut engine, _) = engine_with_clock(60);

        let step = engine.handle_keystroke("a");
        assert_eq!(step.verdict, Verdict::Ignored);
        assert!(engine.session().started_at.is_none());
        assert_eq!(engine.session().total_attempts, 0);
    }

    #[test]
    fn test_timer_waits_for_first_keystroke() {
        let (mut engine, _) = engine_with_clock(60);
        engine.start("abc").unwrap();

        for _ in 0..5 {
            assert!(engine.tick().is_none());
        }
        assert_eq!(engine.session().time_remaining_secs, 60);
        assert!(!engine.countdown().is_armed());

        engine.handle_keystroke("a");
        assert!(engine.countdown().is_armed());
        engine.tick();
        assert_eq!(engine.session().time_remaining_secs, 59);
    }

    #[test]
    fn test_mismatch_records_error_and_holds_cursor() {
        let (mut engine, _) = engine_with_clock(60);
        engine.start("the").unwrap();

        engine.handle_keystroke("t");
        let step = engine.handle_keystroke("tj");
        assert_matches!(step.verdict, Verdict::Incorrect { ref buffer, .. } if buffer == "t");
        assert_eq!(engine.session().cursor, 1);
        assert_eq!(engine.errors().count('h', 'j'), 1);
        assert_eq!(engine.char_status(1), CharStatus::Incorrect);

        engine.handle_keystroke("th");
        assert_eq!(engine.char_status(1), CharStatus::Correct);
        assert_eq!(engine.char_status(2), CharStatus::Current);
    }

    #[test]
    fn test_counters_hold_invariants() {
        let (mut engine, _) = engine_with_clock(60);
        engine.start("hello world").unwrap();

        let inputs = ["h", "hx", "he", "hel", "helq", "helll", "hell", "hello"];
        let mut last_cursor = 0;
        for input in inputs {
            engine.handle_keystroke(input);
            let session = engine.session();
            assert!(session.correct_count <= session.total_attempts);
            assert!(session.cursor >= last_cursor);
            assert!(session.cursor <= session.len());
            last_cursor = session.cursor;
        }
        assert_eq!(engine.session().cursor, 5);
        assert_eq!(engine.session().correct_count, 5);
        assert_eq!(engine.session().total_attempts, 7);
    }

    #[test]
    fn test_natural_completion_emits_once() {
        let (mut engine, clock) = engine_with_clock(60);
        engine.start("hello").unwrap();

        let steps = type_all(&mut engine, "hell");
        assert!(steps.iter().all(|s| s.completion.is_none()));

        clock.advance_secs(6);
        let step = engine.handle_keystroke("hello");
        let completion = step.completion.expect("completion on last char");
        assert_eq!(completion.reason, FinishReason::Completed);
        // 5 chars = 1 word in 0.1 minutes
        assert_eq!(completion.stats.wpm, 10);
        assert_eq!(completion.stats.accuracy, 100);
        assert_eq!(engine.phase(), Phase::Finished);

        // Nothing more is emitted afterwards
        assert_eq!(engine.handle_keystroke("hellox").verdict, Verdict::Ignored);
        assert!(engine.tick().is_none());
        assert_eq!(engine.final_stats(), Some(completion.stats));
    }

    #[test]
    fn test_timeout_completion() {
        let (mut engine, clock) = engine_with_clock(3);
        engine.start("a long text").unwrap();

        type_all(&mut engine, "a l");
        clock.advance_secs(1);
        assert!(engine.tick().is_none());
        clock.advance_secs(1);
        assert!(engine.tick().is_none());
        clock.advance_secs(1);
        let completion = engine.tick().expect("timeout");

        assert_eq!(completion.reason, FinishReason::TimedOut);
        assert_eq!(completion.stats.elapsed_minutes, 0.05);
        assert_eq!(engine.session().time_remaining_secs, 0);
        assert!(engine.tick().is_none());
        assert!(engine.has_finished());
    }

    #[test]
    fn test_reset_cancels_countdown() {
        let (mut engine, _) = engine_with_clock(60);
        engine.start("abc").unwrap();
        engine.handle_keystroke("a");
        engine.tick();

        engine.reset();
        assert_eq!(engine.phase(), Phase::Idle);
        assert_eq!(engine.session().cursor, 0);
        assert_eq!(engine.session().correct_count, 0);
        assert_eq!(engine.session().total_attempts, 0);
        assert!(!engine.countdown().is_armed());

        for _ in 0..100 {
            assert!(engine.tick().is_none());
        }
        assert_eq!(engine.session().time_remaining_secs, 60);
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_reset_keeps_error_history() {
        let (mut engine, _) = engine_with_clock(60);
        engine.start("ab").unwrap();
        engine.handle_keystroke("x");
        engine.reset();

        assert_eq!(engine.errors().count('a', 'x'), 1);
    }

    #[test]
    fn test_live_metrics() {
        let (mut engine, clock) = engine_with_clock(60);
        engine.start("aaaaaaaaaa").unwrap();
        assert_eq!(engine.live_metrics(), LiveMetrics { wpm: 0, accuracy: 100 });

        type_all(&mut engine, "aaaab");
        clock.advance_secs(12);
        // 4 correct chars over a fifth of a minute
        assert_eq!(engine.live_metrics(), LiveMetrics { wpm: 4, accuracy: 80 });
    }

    #[test]
    fn test_char_status_when_idle() {
        let engine = SessionEngine::new(60);
        assert_eq!(engine.char_status(0), CharStatus::Pending);
    }
}
