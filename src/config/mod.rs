//! Configuration loading and management
//!
//! All tunables of the engine live in one `Config`: the rotation timezone and
//! reset hour (consumed only by the rotation clock), the XP reward table, the
//! cache TTL, and the leaderboard size cap. Loaded from `quizmill.toml`, with
//! every field defaulted so a missing file means defaults, not an error.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::progression::XpRewards;

/// Default data directory (~/.quizmill), falling back to the working
/// directory when no home is resolvable
static DATA_DIR: Lazy<PathBuf> = Lazy::new(|| {
    dirs::home_dir()
        .map(|home| home.join(".quizmill"))
        .unwrap_or_else(|| PathBuf::from(".quizmill"))
});

pub fn data_dir() -> &'static Path {
    &DATA_DIR
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// UTC offset of the quiz timezone in whole hours.
    /// All rotation, week, and month anchors are computed in this zone.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,

    /// Local hour (0-23) at which the daily rotation window resets
    #[serde(default = "default_reset_hour")]
    pub reset_hour: u32,

    /// XP awarded per correct answer, by difficulty
    #[serde(default)]
    pub rewards: XpRewards,

    /// TTL in seconds for cached public aggregate responses
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Maximum number of leaderboard entries returned per request
    #[serde(default = "default_leaderboard_limit")]
    pub leaderboard_limit: usize,

    /// Database path override; defaults to ~/.quizmill/quizmill.db
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            utc_offset_hours: default_utc_offset_hours(),
            reset_hour: default_reset_hour(),
            rewards: XpRewards::default(),
            cache_ttl_secs: default_cache_ttl_secs(),
            leaderboard_limit: default_leaderboard_limit(),
            db_path: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load `quizmill.toml` from a directory, falling back to defaults when
    /// the file does not exist
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join("quizmill.toml");
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolved database path
    pub fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| data_dir().join("quizmill.db"))
    }
}

fn default_utc_offset_hours() -> i32 {
    7
}

fn default_reset_hour() -> u32 {
    8
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_leaderboard_limit() -> usize {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.utc_offset_hours, 7);
        assert_eq!(config.reset_hour, 8);
        assert_eq!(config.cache_ttl_secs, 300);
        assert_eq!(config.rewards.hard, 50);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("reset_hour = 6\n[rewards]\neasy = 5\nmedium = 15\nhard = 40\n").unwrap();
        assert_eq!(config.reset_hour, 6);
        assert_eq!(config.utc_offset_hours, 7);
        assert_eq!(config.rewards.easy, 5);
    }

    #[test]
    fn test_partial_rewards_table_fills_defaults() {
        let config: Config = toml::from_str("[rewards]\neasy = 5\n").unwrap();
        assert_eq!(config.rewards.easy, 5);
        assert_eq!(config.rewards.medium, 25);
        assert_eq!(config.rewards.hard, 50);
    }

    #[test]
    fn test_missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_dir(dir.path()).unwrap();
        assert_eq!(config.reset_hour, 8);
    }
}
