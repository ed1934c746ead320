use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "typecoach";
const PROGRESS_DB: &str = "progress.db";
const CONFIG_FILE: &str = "config.json";

/// Where typecoach keeps its files on this machine
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.local/state/typecoach`, or the platform's local data dir without `HOME`
    pub fn state_dir() -> Option<PathBuf> {
        match std::env::var_os("HOME") {
            Some(home) => Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join(APP_NAME),
            ),
            None => project_dirs().map(|dirs| dirs.data_local_dir().to_path_buf()),
        }
    }

    /// SQLite database holding saved progress
    pub fn progress_db_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join(PROGRESS_DB))
    }

    pub fn config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}
