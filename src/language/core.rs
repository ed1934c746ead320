use crate::error::Result;
use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;

static BANK_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/banks");

/// Word bank tiers, ordered from easiest to hardest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Tier {
    Easy,
    Medium,
    Hard,
}

impl Tier {
    /// Bank used by standard mode for a difficulty level.
    /// Levels 1-2 are easy, 3-4 medium, 5 and above hard.
    pub fn for_level(level: u8) -> Self {
        match level {
            l if l >= 5 => Tier::Hard,
            l if l >= 3 => Tier::Medium,
            _ => Tier::Easy,
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct WordBank {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl WordBank {
    pub fn new(name: &str, words: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            size: words.len() as u32,
            words: words.iter().map(|w| w.to_string()).collect(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }
}

/// The three tiered banks practice text is drawn from
#[derive(Clone, Debug, PartialEq)]
pub struct WordBanks {
    pub easy: WordBank,
    pub medium: WordBank,
    pub hard: WordBank,
}

impl WordBanks {
    pub fn new(easy: WordBank, medium: WordBank, hard: WordBank) -> Self {
        Self { easy, medium, hard }
    }

    /// Banks embedded in the binary at compile time
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            easy: read_bank_from_file(Tier::Easy)?,
            medium: read_bank_from_file(Tier::Medium)?,
            hard: read_bank_from_file(Tier::Hard)?,
        })
    }

    pub fn tier(&self, tier: Tier) -> &WordBank {
        match tier {
            Tier::Easy => &self.easy,
            Tier::Medium => &self.medium,
            Tier::Hard => &self.hard,
        }
    }

    /// Every word across all tiers, easy first
    pub fn union(&self) -> Vec<&str> {
        self.easy
            .words
            .iter()
            .chain(&self.medium.words)
            .chain(&self.hard.words)
            .map(String::as_str)
            .collect()
    }
}

fn read_bank_from_file(tier: Tier) -> Result<WordBank> {
    let file_name = format!("{tier}.json");
    let file = BANK_DIR.get_file(&file_name).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("word bank {file_name} not found"),
        )
    })?;

    let contents = file.contents_utf8().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("word bank {file_name} is not valid UTF-8"),
        )
    })?;

    Ok(from_str(contents)?)
}
