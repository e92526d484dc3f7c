use std::{env, time::Duration};

use chrono::NaiveTime;

/// Event cache configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long a fetched collection counts as fresh (default: 60s).
    pub stale_time: Duration,
    /// How long an unused collection for another principal is kept (default: 5 min).
    pub gc_time: Duration,
    /// Extra attempts for a failed read before the error is surfaced (default: 1).
    pub read_retries: u32,
    /// Maximum number of principal collections kept in memory (default: 8).
    pub max_principals: usize,
}

impl CacheConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `EVENTSYNC_STALE_TIME_SECONDS` - Freshness window in seconds (default: 60)
    /// - `EVENTSYNC_GC_TIME_SECONDS` - Unused collection lifetime in seconds (default: 300)
    /// - `EVENTSYNC_READ_RETRIES` - Read retries (default: 1)
    /// - `EVENTSYNC_MAX_PRINCIPALS` - Collections kept in memory (default: 8)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            stale_time: env_parse("EVENTSYNC_STALE_TIME_SECONDS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.stale_time),
            gc_time: env_parse("EVENTSYNC_GC_TIME_SECONDS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.gc_time),
            read_retries: env_parse("EVENTSYNC_READ_RETRIES").unwrap_or(defaults.read_retries),
            max_principals: env_parse("EVENTSYNC_MAX_PRINCIPALS")
                .filter(|max: &usize| *max > 0)
                .unwrap_or(defaults.max_principals),
        }
    }

    /// Sets the freshness window.
    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    /// Sets the number of read retries.
    pub fn with_read_retries(mut self, read_retries: u32) -> Self {
        self.read_retries = read_retries;
        self
    }

    /// Sets the unused collection lifetime.
    pub fn with_gc_time(mut self, gc_time: Duration) -> Self {
        self.gc_time = gc_time;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(60),
            gc_time: Duration::from_secs(5 * 60),
            read_retries: 1,
            max_principals: 8,
        }
    }
}

/// Event form configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormConfig {
    /// Delay between closing the dialog and clearing its fields (default: 150ms).
    pub reset_delay: Duration,
    /// Start time offered for new events (default: 12:00).
    pub default_start: NaiveTime,
    /// End time offered for new events (default: 13:00).
    pub default_end: NaiveTime,
}

impl FormConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `EVENTSYNC_RESET_DELAY_MS` - Reset delay in milliseconds (default: 150)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            reset_delay: env_parse("EVENTSYNC_RESET_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.reset_delay),
            ..defaults
        }
    }

    /// Sets the reset delay.
    pub fn with_reset_delay(mut self, reset_delay: Duration) -> Self {
        self.reset_delay = reset_delay;
        self
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            reset_delay: Duration::from_millis(150),
            default_start: NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN),
            default_end: NaiveTime::from_hms_opt(13, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
