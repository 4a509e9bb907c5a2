use std::time::Duration;

use crate::projection::{SortKey, StatusFilter};

const DEFAULT_VEHICLES_URL: &str = "https://fleet.example.edu/api/vehicles";
const DEFAULT_ROUTES_URL: &str = "https://fleet.example.edu/api/routes";
const DEFAULT_POLL_INTERVAL_MS: u64 = 30_000;
const DEFAULT_STALE_AFTER_MS: i64 = 300_000;

/// Runtime configuration, read once at startup. Everything has a default
/// so the binary runs with no environment at all.
#[derive(Debug, Clone)]
pub struct Config {
    pub vehicles_url: String,
    pub routes_url: String,
    pub poll_interval_ms: u64,
    /// Observations older than this classify as stale ("ghost"). Set it
    /// arbitrarily high to disable staleness detection in practice.
    pub stale_after_ms: i64,
    pub status_filter: StatusFilter,
    pub sort: SortKey,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            vehicles_url: env_or("FLEETWATCH_VEHICLES_URL", DEFAULT_VEHICLES_URL),
            routes_url: env_or("FLEETWATCH_ROUTES_URL", DEFAULT_ROUTES_URL),
            poll_interval_ms: env_parsed("FLEETWATCH_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS),
            stale_after_ms: env_parsed("FLEETWATCH_STALE_AFTER_MS", DEFAULT_STALE_AFTER_MS),
            status_filter: env_parsed("FLEETWATCH_STATUS_FILTER", StatusFilter::default()),
            sort: env_parsed("FLEETWATCH_SORT", SortKey::default()),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key, raw = %raw, "Ignoring unparsable configuration value");
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parsed_falls_back_on_garbage() {
        // Unset keys fall back.
        assert_eq!(env_parsed("FLEETWATCH_TEST_UNSET_KEY", 42u64), 42);
    }

    #[test]
    fn defaults_are_sane() {
        let config = Config::from_env();
        assert!(config.poll_interval() >= Duration::from_millis(1));
        assert!(config.stale_after_ms > 0);
    }
}
