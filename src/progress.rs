use crate::achievements::AchievementSet;
use crate::difficulty::clamp_level;
use crate::error::Result;
use crate::error_tracker::ErrorTracker;
use chrono::Utc;
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Key the aggregate progress blob is stored under
pub const SNAPSHOT_KEY: &str = "typingTestData";
/// Key the unlocked achievement ids are stored under
pub const ACHIEVEMENTS_KEY: &str = "typingAchievements";

/// Flat string key-value persistence
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Volatile store, mostly for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// All keys in a single JSON object on disk
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all().unwrap_or_else(|e| {
            warn!(target: "progress", "replacing unreadable {}: {e}", self.path.display());
            BTreeMap::new()
        });
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(&values)?)?;
        Ok(())
    }
}

/// Keys in a single-table SQLite database
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            [],
        )?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

/// The persisted aggregate of a user's progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressSnapshot {
    pub difficulty: u8,
    #[serde(rename = "bestWPM")]
    pub best_wpm: u32,
    #[serde(rename = "testsCompleted")]
    pub tests_completed: u32,
    #[serde(rename = "errorPatterns")]
    pub error_patterns: ErrorTracker,
    #[serde(rename = "currentBadges")]
    pub badge_count: u32,
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self {
            difficulty: 1,
            best_wpm: 0,
            tests_completed: 0,
            error_patterns: ErrorTracker::new(),
            badge_count: 0,
        }
    }
}

/// Everything loaded at startup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Progress {
    pub snapshot: ProgressSnapshot,
    pub achievements: AchievementSet,
}

/// Reads and writes progress through a [`KeyValueStore`]
#[derive(Debug)]
pub struct ProgressStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ProgressStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Load progress; anything absent or unreadable falls back to defaults
    pub fn load(&self) -> Progress {
        let mut snapshot: ProgressSnapshot = self.read_json(SNAPSHOT_KEY).unwrap_or_default();
        snapshot.difficulty = clamp_level(snapshot.difficulty);

        let achievements: AchievementSet = self
            .read_json::<AchievementSet>(ACHIEVEMENTS_KEY)
            .map(|set| set.ids().iter().map(String::as_str).collect())
            .unwrap_or_default();

        // The unlocked list is the source of truth for the badge counter
        snapshot.badge_count = achievements.len() as u32;

        debug!(
            target: "progress",
            "loaded level {} with {} tests and {} badges",
            snapshot.difficulty, snapshot.tests_completed, snapshot.badge_count
        );
        Progress {
            snapshot,
            achievements,
        }
    }

    pub fn save_snapshot(&mut self, snapshot: &ProgressSnapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot)?;
        self.store.set(SNAPSHOT_KEY, &json)
    }

    pub fn save_achievements(&mut self, achievements: &AchievementSet) -> Result<()> {
        let json = serde_json::to_string(achievements)?;
        self.store.set(ACHIEVEMENTS_KEY, &json)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn read_json<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(target: "progress", "could not read {key}: {e}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(target: "progress", "ignoring malformed {key}: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_snapshot() -> ProgressSnapshot {
        let mut errors = ErrorTracker::new();
        errors.record('e', 'r');
        ProgressSnapshot {
            difficulty: 3,
            best_wpm: 48,
            tests_completed: 7,
            error_patterns: errors,
            badge_count: 2,
        }
    }

    #[test]
    fn test_absent_keys_give_defaults() {
        let store = ProgressStore::new(MemoryStore::new());
        let progress = store.load();

        assert_eq!(progress.snapshot, ProgressSnapshot::default());
        assert_eq!(progress.snapshot.difficulty, 1);
        assert!(progress.achievements.is_empty());
    }

    #[test]
    fn test_malformed_blobs_give_defaults() {
        let mut kv = MemoryStore::new();
        kv.set(SNAPSHOT_KEY, "{not json").unwrap();
        kv.set(ACHIEVEMENTS_KEY, "42").unwrap();

        let progress = ProgressStore::new(kv).load();
        assert_eq!(progress, Progress::default());
    }

    #[test]
    fn test_partial_snapshot_fills_defaults() {
        let mut kv = MemoryStore::new();
        kv.set(SNAPSHOT_KEY, r#"{"bestWPM":33,"difficulty":0}"#).unwrap();

        let snapshot = ProgressStore::new(kv).load().snapshot;
        assert_eq!(snapshot.best_wpm, 33);
        assert_eq!(snapshot.difficulty, 1);
        assert_eq!(snapshot.tests_completed, 0);
        assert!(snapshot.error_patterns.is_empty());
    }

    #[test]
    fn test_snapshot_wire_names() {
        let json = serde_json::to_value(sample_snapshot()).unwrap();

        assert_eq!(json["difficulty"], 3);
        assert_eq!(json["bestWPM"], 48);
        assert_eq!(json["testsCompleted"], 7);
        assert_eq!(json["errorPatterns"]["e->r"], 1);
        assert_eq!(json["currentBadges"], 2);
    }

    #[test]
    fn test_badge_count_follows_unlocked_list() {
        let mut store = ProgressStore::new(MemoryStore::new());
        store.save_snapshot(&sample_snapshot()).unwrap();
        let achievements: AchievementSet = ["speed_25"].into_iter().collect();
        store.save_achievements(&achievements).unwrap();

        let progress = store.load();
        assert_eq!(progress.snapshot.badge_count, 1);
        assert_eq!(progress.achievements, achievements);
        assert_eq!(progress.snapshot.best_wpm, 48);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("progress.json");

        let mut store = ProgressStore::new(FileStore::with_path(&path));
        store.save_snapshot(&sample_snapshot()).unwrap();
        store
            .save_achievements(&["speed_25", "accuracy_95"].into_iter().collect())
            .unwrap();

        let reopened = ProgressStore::new(FileStore::with_path(&path)).load();
        assert_eq!(reopened.snapshot.difficulty, 3);
        assert_eq!(reopened.snapshot.error_patterns.count('e', 'r'), 1);
        assert_eq!(reopened.achievements.len(), 2);
    }

    #[test]
    fn test_file_store_missing_file() {
        let dir = tempdir().unwrap();
        let store = FileStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.get(SNAPSHOT_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_recovers_from_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.json");
        fs::write(&path, "garbage").unwrap();

        let mut store = FileStore::with_path(&path);
        assert!(store.get(SNAPSHOT_KEY).is_err());
        store.set(SNAPSHOT_KEY, "{}").unwrap();
        assert_eq!(store.get(SNAPSHOT_KEY).unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_sqlite_store_upserts() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn test_sqlite_store_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state").join("progress.db");

        {
            let mut store = ProgressStore::new(SqliteStore::open(&path).unwrap());
            store.save_snapshot(&sample_snapshot()).unwrap();
        }

        let progress = ProgressStore::new(SqliteStore::open(&path).unwrap()).load();
        assert_eq!(progress.snapshot.tests_completed, 7);
    }
}
