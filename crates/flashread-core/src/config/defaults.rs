pub(crate) fn default_words_per_second() -> u32 {
    crate::pacing::DEFAULT_WORDS_PER_SECOND
}

pub(crate) fn default_tick_interval_ms() -> u64 {
    16
}

pub(crate) fn default_skip_step() -> i64 {
    10
}

pub(crate) fn default_cache_dir() -> String {
    ".cache".to_string()
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Info
}
