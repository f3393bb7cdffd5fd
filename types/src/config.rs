use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LOG_FILE_NAME: &str = "OmegaStrikers.log";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
pub const DEFAULT_HISTORY_CAPACITY: usize = 8;

/// Message bodies matching any of these are dropped before classification.
pub const DEFAULT_NOISE_PATTERNS: &[&str] = &[r"^Warning:", r"^Error:", r"^Shutting down"];

/// Application configuration, persisted as TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory the game writes its logs to.
    pub log_directory: String,
    /// Log file tailed when no explicit path is given.
    pub log_file_name: String,
    pub poll_interval_ms: u64,
    /// Capacity of the reader -> session channel.
    pub channel_capacity: usize,
    /// Completed matches kept in memory.
    pub history_capacity: usize,
    pub noise_patterns: Vec<String>,
    /// Per-kind regex overrides, keyed by message kind name (e.g. `GoalScored`).
    pub patterns: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_directory: default_log_directory().to_string_lossy().to_string(),
            log_file_name: DEFAULT_LOG_FILE_NAME.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            noise_patterns: DEFAULT_NOISE_PATTERNS.iter().map(|p| p.to_string()).collect(),
            patterns: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    pub fn poll_interval(&self) -> Duration {
        // A zero interval would spin the tailer
        Duration::from_millis(self.poll_interval_ms.max(10))
    }

    /// Full path of the default log file.
    pub fn default_log_path(&self) -> PathBuf {
        PathBuf::from(&self.log_directory).join(&self.log_file_name)
    }
}

fn default_log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_default()
        .join("OmegaStrikers")
        .join("Saved")
        .join("Logs")
}
