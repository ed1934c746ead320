use crate::{
    config::Config,
    error_tracker::ErrorTracker,
    language::{FocusSelector, StandardSelector, WordBanks, WordSelector},
    session::Mode,
};
use rand::RngCore;

/// Configuration for word generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordGenConfig {
    pub standard_word_count: usize,
    pub focus_word_count: usize,
}

impl Default for WordGenConfig {
    fn default() -> Self {
        Self {
            standard_word_count: 30,
            focus_word_count: 20,
        }
    }
}

impl From<&Config> for WordGenConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            standard_word_count: cfg.standard_word_count,
            focus_word_count: cfg.focus_word_count,
        }
    }
}

/// Produces practice text from the word banks
#[derive(Debug, Clone)]
pub struct WordGenerator {
    banks: WordBanks,
    config: WordGenConfig,
}

impl WordGenerator {
    pub fn new(banks: WordBanks, config: WordGenConfig) -> Self {
        Self { banks, config }
    }

    /// Words for the next session, selected by mode
    pub fn generate(
        &self,
        difficulty: u8,
        mode: Mode,
        errors: &ErrorTracker,
        rng: &mut dyn RngCore,
    ) -> Vec<String> {
        let selector: Box<dyn WordSelector> = match mode {
            Mode::Standard => Box::new(StandardSelector),
            Mode::Focus => Box::new(FocusSelector),
        };
        let count = match mode {
            Mode::Standard => self.config.standard_word_count,
            Mode::Focus => self.config.focus_word_count,
        };
        selector.select_words(&self.banks, count, difficulty, errors, rng)
    }

    /// The practice string: generated words joined by single spaces
    pub fn generate_prompt(
        &self,
        difficulty: u8,
        mode: Mode,
        errors: &ErrorTracker,
        rng: &mut dyn RngCore,
    ) -> String {
        self.generate(difficulty, mode, errors, rng).join(" ")
    }

    pub fn banks(&self) -> &WordBanks {
        &self.banks
    }
}
