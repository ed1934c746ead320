use super::core::{Tier, WordBanks};
use crate::error_tracker::ErrorTracker;
use log::debug;
use rand::seq::{IteratorRandom, SliceRandom};
use rand::RngCore;

/// Trait for different word selection strategies
pub trait WordSelector {
    /// Draw `count` words, with replacement, for a session
    fn select_words(
        &self,
        banks: &WordBanks,
        count: usize,
        difficulty: u8,
        errors: &ErrorTracker,
        rng: &mut dyn RngCore,
    ) -> Vec<String>;
}

/// Uniform draws from the bank matching the difficulty level
pub struct StandardSelector;

impl WordSelector for StandardSelector {
    fn select_words(
        &self,
        banks: &WordBanks,
        count: usize,
        difficulty: u8,
        _errors: &ErrorTracker,
        rng: &mut dyn RngCore,
    ) -> Vec<String> {
        let bank = banks.tier(Tier::for_level(difficulty));
        draw_with_replacement(&bank.words, count, rng)
    }
}

/// Draws biased toward characters the user keeps missing
///
/// Without any recorded mistakes this falls back to the medium bank.
/// Otherwise every third word (starting with the first) contains the
/// expected character of a randomly chosen error pair when any bank word
/// has it, and the rest come from all banks combined. A character missed
/// in several different ways is therefore targeted more often.
pub struct FocusSelector;

impl WordSelector for FocusSelector {
    fn select_words(
        &self,
        banks: &WordBanks,
        count: usize,
        _difficulty: u8,
        errors: &ErrorTracker,
        rng: &mut dyn RngCore,
    ) -> Vec<String> {
        if errors.is_empty() {
            return draw_with_replacement(&banks.medium.words, count, rng);
        }

        let all_words = banks.union();
        let mut words = Vec::with_capacity(count);

        for i in 0..count {
            let targeted = if i % 3 == 0 {
                errors
                    .iter()
                    .choose(rng)
                    .and_then(|((expected, _), _)| {
                        words_containing(&all_words, expected).choose(rng).copied()
                    })
            } else {
                None
            };

            match targeted.or_else(|| all_words.choose(rng).copied()) {
                Some(word) => words.push(word.to_string()),
                None => break,
            }
        }

        debug!(target: "selector", "focus selection over {} error pairs", errors.len());
        words
    }
}

fn draw_with_replacement(pool: &[String], count: usize, rng: &mut dyn RngCore) -> Vec<String> {
    (0..count)
        .filter_map(|_| pool.choose(rng).cloned())
        .collect()
}

fn words_containing<'a>(words: &[&'a str], c: char) -> Vec<&'a str> {
    words.iter().copied().filter(|w| w.contains(c)).collect()
}
