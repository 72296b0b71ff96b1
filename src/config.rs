use std::path::PathBuf;
use std::time::Duration;

use crate::scheduler::DEFAULT_PURGE_INTERVAL;

pub const DATA_DIR_ENV: &str = "ARCHIVE_TODO_DATA_DIR";
pub const PURGE_SECS_ENV: &str = "ARCHIVE_TODO_PURGE_SECS";
const DEFAULT_DATA_DIR: &str = ".archive-todo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub purge_interval: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Blank values count as unset; an unparsable or zero interval falls back to
    /// the daily default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let data_dir = read(DATA_DIR_ENV)
            .map(|value| PathBuf::from(value.trim()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let purge_interval = match read(PURGE_SECS_ENV).map(|value| value.trim().parse::<u64>()) {
            Some(Ok(secs)) if secs > 0 => Duration::from_secs(secs),
            Some(_) => {
                log::warn!("config: ignoring invalid {PURGE_SECS_ENV}");
                DEFAULT_PURGE_INTERVAL
            }
            None => DEFAULT_PURGE_INTERVAL,
        };

        Self {
            data_dir,
            purge_interval,
        }
    }
}
