use crate::app_dirs::AppDirs;
use crate::error::Result;
use crate::notice::NOTICE_DURATION_MS;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Session tuning read from `config.json`; missing fields take defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub time_limit_secs: u32,
    pub standard_word_count: usize,
    pub focus_word_count: usize,
    pub notice_duration_ms: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_limit_secs: 60,
            standard_word_count: 30,
            focus_word_count: 20,
            notice_duration_ms: NOTICE_DURATION_MS,
        }
    }
}

impl Config {
    /// Replace values that would make a session unplayable with their defaults
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let mut cfg = self;
        if cfg.time_limit_secs == 0 {
            warn!(
                target: "config",
                "time_limit_secs must be positive, using {}",
                defaults.time_limit_secs
            );
            cfg.time_limit_secs = defaults.time_limit_secs;
        }
        if cfg.standard_word_count == 0 {
            warn!(
                target: "config",
                "standard_word_count must be positive, using {}",
                defaults.standard_word_count
            );
            cfg.standard_word_count = defaults.standard_word_count;
        }
        if cfg.focus_word_count == 0 {
            warn!(
                target: "config",
                "focus_word_count must be positive, using {}",
                defaults.focus_word_count
            );
            cfg.focus_word_count = defaults.focus_word_count;
        }
        if cfg.notice_duration_ms <= 0 {
            cfg.notice_duration_ms = defaults.notice_duration_ms;
        }
        cfg
    }
}

pub trait ConfigStore {
    /// Never fails; unreadable or malformed config yields the defaults
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

/// JSON config file, by default in the platform config directory
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("typecoach_config.json"));
        Self::with_path(path)
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(target: "config", "no config at {}: {e}", self.path.display());
                return Config::default();
            }
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg.sanitized(),
            Err(e) => {
                warn!(target: "config", "ignoring malformed {}: {e}", self.path.display());
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(cfg)?)?;
        Ok(())
    }
}
