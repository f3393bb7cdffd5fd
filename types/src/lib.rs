//! Shared configuration types for nabber.
//!
//! Pure data: no I/O beyond locating platform directories for defaults.

mod config;

pub use config::{
    AppConfig, DEFAULT_CHANNEL_CAPACITY, DEFAULT_HISTORY_CAPACITY, DEFAULT_LOG_FILE_NAME,
    DEFAULT_NOISE_PATTERNS, DEFAULT_POLL_INTERVAL_MS,
};
