use crate::stats::FinalStats;
use log::info;
use serde::{Deserialize, Serialize};

/// One unlockable badge
#[derive(Debug, Clone, Copy)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    unlocked_by: fn(&FinalStats) -> bool,
}

impl Achievement {
    pub fn is_met(&self, stats: &FinalStats) -> bool {
        (self.unlocked_by)(stats)
    }
}

pub static ACHIEVEMENTS: [Achievement; 3] = [
    Achievement {
        id: "speed_25",
        title: "Speed Demon - 25+ WPM!",
        unlocked_by: |s| s.wpm >= 25,
    },
    Achievement {
        id: "speed_40",
        title: "Speed Master - 40+ WPM!",
        unlocked_by: |s| s.wpm >= 40,
    },
    Achievement {
        id: "accuracy_95",
        title: "Precision Typist - 95%+ Accuracy!",
        unlocked_by: |s| s.accuracy >= 95,
    },
];

/// Ids unlocked so far, in unlock order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementSet {
    ids: Vec<String>,
}

impl AchievementSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id)
    }

    /// Returns false when the id was already present
    pub fn insert(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

impl<'a> FromIterator<&'a str> for AchievementSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = AchievementSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

/// Rules met by `stats` that are not in `unlocked`, in table order
pub fn evaluate(stats: &FinalStats, unlocked: &AchievementSet) -> Vec<&'static Achievement> {
    ACHIEVEMENTS
        .iter()
        .filter(|a| a.is_met(stats) && !unlocked.contains(a.id))
        .collect()
}

/// Tracks unlocked achievements and the badge counter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AchievementEvaluator {
    unlocked: AchievementSet,
    badge_count: u32,
}

impl AchievementEvaluator {
    pub fn new(unlocked: AchievementSet, badge_count: u32) -> Self {
        Self {
            unlocked,
            badge_count,
        }
    }

    /// Unlock everything newly earned; each new id adds one badge
    pub fn unlock(&mut self, stats: &FinalStats) -> Vec<&'static Achievement> {
        let earned = evaluate(stats, &self.unlocked);
        for achievement in &earned {
            if self.unlocked.insert(achievement.id) {
                self.badge_count += 1;
                info!(target: "achievements", "unlocked {}", achievement.id);
            }
        }
        earned
    }

    pub fn unlocked(&self) -> &AchievementSet {
        &self.unlocked
    }

    pub fn badge_count(&self) -> u32 {
        self.badge_count
    }
}
