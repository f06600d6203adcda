//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::{CacheConfig, DEFAULT_MAX_ENTRY_AGE_MS, DEFAULT_MAX_INFO_AGE_MS};
use crate::storage::InMemoryStorageOptions;

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 60;
const DEFAULT_LIST_VISIBILITY_DELAY_MS: u64 = 2_000;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// How long a cached resource keeps supplementing listings, in ms
    pub max_entry_age_ms: u64,
    /// How long cached metadata may be served without refetching, in ms
    pub max_info_age_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Expiry sweep interval in seconds; 0 disables the sweep
    pub cleanup_interval: u64,
    /// How long the in-memory store hides new resources from listings, in ms
    pub list_visibility_delay_ms: u64,
    /// Whether the in-memory store rejects concurrent creates at open
    pub create_marker_objects: bool,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRY_AGE_MS` - Cache entry lifetime (default: 14400000)
    /// - `MAX_INFO_AGE_MS` - Cached metadata lifetime (default: 10000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 60)
    /// - `LIST_VISIBILITY_DELAY_MS` - Listing lag of the store (default: 2000)
    /// - `CREATE_MARKER_OBJECTS` - `true` or `false` (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entry_age_ms: env_or("MAX_ENTRY_AGE_MS", defaults.max_entry_age_ms),
            max_info_age_ms: env_or("MAX_INFO_AGE_MS", defaults.max_info_age_ms),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            list_visibility_delay_ms: env_or(
                "LIST_VISIBILITY_DELAY_MS",
                defaults.list_visibility_delay_ms,
            ),
            create_marker_objects: env_or(
                "CREATE_MARKER_OBJECTS",
                defaults.create_marker_objects,
            ),
        }
    }

    /// Cache settings derived from this configuration.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new(self.max_entry_age_ms, self.max_info_age_ms)
    }

    /// Options for the in-memory backing store.
    pub fn in_memory_options(&self) -> InMemoryStorageOptions {
        InMemoryStorageOptions {
            list_visibility_delay_ms: self.list_visibility_delay_ms,
            create_marker_objects: self.create_marker_objects,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entry_age_ms: DEFAULT_MAX_ENTRY_AGE_MS,
            max_info_age_ms: DEFAULT_MAX_INFO_AGE_MS,
            server_port: DEFAULT_SERVER_PORT,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL_SECS,
            list_visibility_delay_ms: DEFAULT_LIST_VISIBILITY_DELAY_MS,
            create_marker_objects: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_entry_age_ms, 14_400_000);
        assert_eq!(config.max_info_age_ms, 10_000);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 60);
        assert_eq!(config.list_visibility_delay_ms, 2_000);
        assert!(!config.create_marker_objects);
    }

    #[test]
    fn test_config_from_env() {
        // Single test touches the environment so parallel tests don't race.
        for key in [
            "MAX_ENTRY_AGE_MS",
            "MAX_INFO_AGE_MS",
            "SERVER_PORT",
            "CLEANUP_INTERVAL",
            "LIST_VISIBILITY_DELAY_MS",
            "CREATE_MARKER_OBJECTS",
        ] {
            env::remove_var(key);
        }
        assert_eq!(Config::from_env(), Config::default());

        env::set_var("MAX_INFO_AGE_MS", "500");
        env::set_var("CREATE_MARKER_OBJECTS", "true");
        env::set_var("SERVER_PORT", "not-a-port");
        let config = Config::from_env();
        assert_eq!(config.max_info_age_ms, 500);
        assert!(config.create_marker_objects);
        assert_eq!(config.server_port, 3000);

        env::remove_var("MAX_INFO_AGE_MS");
        env::remove_var("CREATE_MARKER_OBJECTS");
        env::remove_var("SERVER_PORT");
    }

    #[test]
    fn test_derived_settings() {
        let config = Config {
            max_entry_age_ms: 10_000,
            max_info_age_ms: 2_000,
            list_visibility_delay_ms: 7,
            create_marker_objects: true,
            ..Config::default()
        };

        let cache = config.cache_config();
        assert_eq!(cache.max_entry_age_ms, 10_000);
        assert_eq!(cache.max_info_age_ms, 2_000);
        assert!(cache.is_consistent());

        let options = config.in_memory_options();
        assert_eq!(options.list_visibility_delay_ms, 7);
        assert!(options.create_marker_objects);
    }
}
