use crate::achievements::AchievementEvaluator;
use crate::app_dirs::AppDirs;
use crate::config::{Config, ConfigStore, FileConfigStore};
use crate::difficulty::{Adjustment, DifficultyController};
use crate::engine::{Completion, FinishReason, SessionEngine};
use crate::error::{Error, Result};
use crate::language::WordBanks;
use crate::notice::{Notice, NoticeBoard};
use crate::progress::{KeyValueStore, ProgressSnapshot, ProgressStore, SqliteStore};
use crate::render::{LiveStats, Renderer, ResultsSummary};
use crate::session::{CharStatus, Mode, Phase};
use crate::stats::FinalStats;
use crate::timer::{Clock, SystemClock};
use crate::typing_policy::Verdict;
use crate::word_generator::WordGenerator;
use chrono::Duration;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Everything that happened when a session ended
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub reason: FinishReason,
    pub stats: FinalStats,
    /// Level the finished session was played at
    pub level_played: u8,
    pub adjustment: Adjustment,
    pub unlocked: Vec<&'static str>,
    /// Set when progress could not be persisted; in-memory state is unaffected
    pub save_error: Option<String>,
}

/// Wires the session engine to word generation, difficulty, achievements,
/// persistence and the UI callbacks
pub struct Trainer<S: KeyValueStore, R: Renderer, C: Clock = SystemClock> {
    config: Config,
    engine: SessionEngine<C>,
    generator: WordGenerator,
    mode: Mode,
    difficulty: DifficultyController,
    achievements: AchievementEvaluator,
    best_wpm: u32,
    tests_completed: u32,
    progress: ProgressStore<S>,
    renderer: R,
    notices: NoticeBoard,
    rng: StdRng,
    text: String,
    last_report: Option<SessionReport>,
}

impl<S: KeyValueStore, R: Renderer, C: Clock> Trainer<S, R, C> {
    /// Load saved progress and prepare the first practice text
    pub fn new(
        config: Config,
        banks: WordBanks,
        store: S,
        renderer: R,
        clock: C,
        rng: StdRng,
    ) -> Self {
        let progress = ProgressStore::new(store);
        let loaded = progress.load();
        let snapshot = loaded.snapshot;

        let mut engine = SessionEngine::with_clock(config.time_limit_secs, clock);
        engine.errors_mut().merge(&snapshot.error_patterns);

        let mut trainer = Self {
            generator: WordGenerator::new(banks, (&config).into()),
            config,
            engine,
            mode: Mode::Standard,
            difficulty: DifficultyController::new(snapshot.difficulty),
            achievements: AchievementEvaluator::new(loaded.achievements, snapshot.badge_count),
            best_wpm: snapshot.best_wpm,
            tests_completed: snapshot.tests_completed,
            progress,
            renderer,
            notices: NoticeBoard::new(),
            rng,
            text: String::new(),
            last_report: None,
        };
        trainer.prepare_text();
        trainer.renderer.set_badge_count(trainer.achievements.badge_count());
        trainer
    }

    /// Begin typing the prepared text. After a finished session a fresh text is prepared first.
    pub fn start(&mut self) -> Result<()> {
        match self.engine.phase() {
            Phase::Running => return Err(Error::NotIdle),
            Phase::Finished => {
                self.engine.reset();
                self.prepare_text();
            }
            Phase::Idle => {}
        }
        self.engine.start(&self.text)?;
        self.render_char(0, CharStatus::Current);
        Ok(())
    }

    /// Feed the full contents of the input widget.
    ///
    /// The returned verdict tells the widget how to correct its buffer.
    pub fn on_input(&mut self, buffer: &str) -> Verdict {
        let cursor = self.engine.session().cursor;
        let step = self.engine.handle_keystroke(buffer);

        match &step.verdict {
            Verdict::Correct => {
                self.render_char(cursor, CharStatus::Correct);
                if cursor + 1 < self.engine.session().len() {
                    self.render_char(cursor + 1, CharStatus::Current);
                }
            }
            Verdict::Incorrect { .. } => self.render_char(cursor, CharStatus::Incorrect),
            _ => {}
        }

        if step.verdict != Verdict::Ignored {
            self.renderer
                .set_progress(self.engine.session().progress_percent());
            self.render_live_stats();
        }

        if let Some(completion) = step.completion {
            self.finish_session(completion);
        }
        step.verdict
    }

    /// One-second timer callback
    pub fn tick(&mut self) -> Option<SessionReport> {
        let completion = self.engine.tick();

        if self.notices.update(self.engine.clock().now()).is_some() {
            self.renderer.hide_notice();
        }

        match completion {
            Some(completion) => Some(self.finish_session(completion)),
            None => {
                if self.engine.is_running() {
                    self.render_live_stats();
                }
                None
            }
        }
    }

    /// Abandon the current session and prepare a new text
    pub fn reset(&mut self) {
        self.engine.reset();
        self.prepare_text();
    }

    pub fn set_mode(&mut self, mode: Mode) {
        debug!(target: "trainer", "mode {} -> {}", self.mode, mode);
        self.mode = mode;
        self.reset();
    }

    /// Switch mode by its name, `"standard"` or `"focus"`
    pub fn set_mode_by_name(&mut self, name: &str) -> Result<()> {
        let mode = Mode::from_str(name).map_err(|_| Error::UnknownMode(name.to_string()))?;
        self.set_mode(mode);
        Ok(())
    }

    fn prepare_text(&mut self) {
        self.text = self.generator.generate_prompt(
            self.difficulty.level(),
            self.mode,
            self.engine.errors(),
            &mut self.rng,
        );

        let len = self.text.chars().count();
        self.renderer.show_text(&self.text);
        self.renderer.set_char_status(0..len, CharStatus::Pending);
        self.renderer.set_progress(0.0);
        self.render_live_stats();
    }

    fn finish_session(&mut self, completion: Completion) -> SessionReport {
        let stats = completion.stats;
        let level_played = self.difficulty.level();

        let unlocked: Vec<&'static str> = self
            .achievements
            .unlock(&stats)
            .into_iter()
            .map(|achievement| {
                self.show_notice(achievement.title.to_string());
                achievement.id
            })
            .collect();
        if !unlocked.is_empty() {
            self.renderer.set_badge_count(self.achievements.badge_count());
        }

        self.renderer.show_results(ResultsSummary {
            wpm: stats.wpm,
            accuracy: stats.accuracy,
            level: level_played,
        });

        self.tests_completed += 1;
        self.best_wpm = self.best_wpm.max(stats.wpm);

        let adjustment = self.difficulty.review(&stats, self.mode);
        if let Some(message) = adjustment.notice() {
            self.show_notice(message);
        }
        self.render_live_stats();

        let save_error = self.save().err().map(|e| {
            warn!(target: "trainer", "progress not saved: {e}");
            e.to_string()
        });

        let report = SessionReport {
            reason: completion.reason,
            stats,
            level_played,
            adjustment,
            unlocked,
            save_error,
        };
        self.last_report = Some(report.clone());
        report
    }

    fn save(&mut self) -> Result<()> {
        let snapshot = self.snapshot();
        self.progress.save_snapshot(&snapshot)?;
        self.progress
            .save_achievements(self.achievements.unlocked())
    }

    fn show_notice(&mut self, message: String) {
        let notice = Notice::new(
            message,
            self.engine.clock().now(),
            Duration::milliseconds(self.config.notice_duration_ms),
        );
        self.renderer.show_notice(&notice);
        self.notices.show(notice);
    }

    fn render_char(&mut self, idx: usize, status: CharStatus) {
        self.renderer.set_char_status(idx..idx + 1, status);
    }

    fn render_live_stats(&mut self) {
        let live = self.engine.live_metrics();
        self.renderer.set_live_stats(LiveStats {
            wpm: live.wpm,
            accuracy: live.accuracy,
            level: self.difficulty.level(),
        });
    }

    /// Current persisted view of progress
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            difficulty: self.difficulty.level(),
            best_wpm: self.best_wpm,
            tests_completed: self.tests_completed,
            error_patterns: self.engine.errors().clone(),
            badge_count: self.achievements.badge_count(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn level(&self) -> u8 {
        self.difficulty.level()
    }

    pub fn engine(&self) -> &SessionEngine<C> {
        &self.engine
    }

    pub fn achievements(&self) -> &AchievementEvaluator {
        &self.achievements
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn last_report(&self) -> Option<&SessionReport> {
        self.last_report.as_ref()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn store(&self) -> &S {
        self.progress.store()
    }
}

impl<R: Renderer> Trainer<SqliteStore, R> {
    /// Trainer over the user's config file and progress database
    pub fn open(renderer: R) -> Result<Self> {
        let db_path = AppDirs::progress_db_path()
            .unwrap_or_else(|| PathBuf::from("typecoach_progress.db"));
        Self::open_at(&FileConfigStore::new(), db_path, renderer)
    }

    /// Trainer with built-in word banks, the wall clock and an entropy-seeded rng
    pub fn open_at<P: AsRef<Path>>(
        config_store: &dyn ConfigStore,
        db_path: P,
        renderer: R,
    ) -> Result<Self> {
        let config = config_store.load();
        debug!(target: "trainer", "progress database at {}", db_path.as_ref().display());
        let store = SqliteStore::open(db_path)?;
        Ok(Self::new(
            config,
            WordBanks::builtin()?,
            store,
            renderer,
            SystemClock,
            StdRng::from_entropy(),
        ))
    }
}
