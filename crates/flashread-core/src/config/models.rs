use crate::pacing::{MAX_WORDS_PER_SECOND, MIN_WORDS_PER_SECOND, PacingConfig};
use serde::Deserialize;
use std::time::Duration;

pub const MIN_TICK_INTERVAL_MS: u64 = 1;
pub const MAX_TICK_INTERVAL_MS: u64 = 1_000;

/// High-level app configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default = "crate::config::defaults::default_words_per_second")]
    pub words_per_second: u32,
    #[serde(default = "crate::config::defaults::default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "crate::config::defaults::default_skip_step")]
    pub skip_step: i64,
    #[serde(default = "crate::config::defaults::default_cache_dir")]
    pub cache_dir: String,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            words_per_second: crate::config::defaults::default_words_per_second(),
            tick_interval_ms: crate::config::defaults::default_tick_interval_ms(),
            skip_step: crate::config::defaults::default_skip_step(),
            cache_dir: crate::config::defaults::default_cache_dir(),
            log_level: crate::config::defaults::default_log_level(),
        }
    }
}

impl AppConfig {
    /// Pull every numeric field back into its supported range.
    pub fn clamped(mut self) -> Self {
        self.words_per_second = self
            .words_per_second
            .clamp(MIN_WORDS_PER_SECOND, MAX_WORDS_PER_SECOND);
        self.tick_interval_ms = self
            .tick_interval_ms
            .clamp(MIN_TICK_INTERVAL_MS, MAX_TICK_INTERVAL_MS);
        self.skip_step = self.skip_step.max(1);
        self
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(
            self.tick_interval_ms
                .clamp(MIN_TICK_INTERVAL_MS, MAX_TICK_INTERVAL_MS),
        )
    }

    pub fn pacing(&self) -> PacingConfig {
        PacingConfig::new(
            self.words_per_second
                .clamp(MIN_WORDS_PER_SECOND, MAX_WORDS_PER_SECOND),
        )
        .unwrap_or_default()
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
