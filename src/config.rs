use std::time::Duration;

// =============================================================================
// Cache freshness windows
// =============================================================================

/// TTL for cached version lists (30 minutes)
pub const VERSIONS_TTL: Duration = Duration::from_secs(30 * 60);

/// TTL for cached resolved manifests (1 hour)
pub const MANIFEST_TTL: Duration = Duration::from_secs(60 * 60);

/// TTL for cached package existence checks (30 minutes)
pub const EXISTS_TTL: Duration = Duration::from_secs(30 * 60);

/// TTL for cached search results (5 minutes)
pub const SEARCH_TTL: Duration = Duration::from_secs(5 * 60);

// =============================================================================
// Retry and transport
// =============================================================================

/// Total number of tries per upstream call (first attempt included)
pub const RETRY_MAX_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff between retries
pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Wall-clock timeout for a single upstream HTTP request (30 seconds)
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// Cache sizing defaults
// =============================================================================

/// Default TTL applied when `set` is called without an explicit one
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Default maximum number of cache entries
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Cache tuning resolved once at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL used when callers do not supply one
    pub default_ttl: Duration,
    /// Upper bound on stored entries
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_CACHE_TTL,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl CacheConfig {
    /// Reads `MAVEN_META_CACHE_TTL_MS` and `MAVEN_META_CACHE_MAX_ENTRIES`,
    /// falling back to the defaults for anything absent or unparseable.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("MAVEN_META_CACHE_TTL_MS").ok(),
            std::env::var("MAVEN_META_CACHE_MAX_ENTRIES").ok(),
        )
    }

    fn from_vars(ttl_ms: Option<String>, max_entries: Option<String>) -> Self {
        let default = Self::default();

        let default_ttl = ttl_ms
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(default.default_ttl);

        let max_entries = max_entries
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(default.max_entries);

        Self {
            default_ttl,
            max_entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn from_vars_uses_defaults_when_unset() {
        let config = CacheConfig::from_vars(None, None);
        assert_eq!(config, CacheConfig::default());
    }

    #[test]
    fn from_vars_parses_overrides() {
        let config = CacheConfig::from_vars(Some("60000".to_string()), Some("50".to_string()));

        assert_eq!(config.default_ttl, Duration::from_millis(60_000));
        assert_eq!(config.max_entries, 50);
    }

    #[test]
    fn from_vars_ignores_unparseable_and_zero_values() {
        let config = CacheConfig::from_vars(Some("soon".to_string()), Some("0".to_string()));
        assert_eq!(config, CacheConfig::default());
    }

    #[test]
    #[serial]
    fn from_env_reads_process_environment() {
        // SAFETY: serial tests are the only writers of these variables
        unsafe {
            std::env::set_var("MAVEN_META_CACHE_TTL_MS", "1500");
            std::env::set_var("MAVEN_META_CACHE_MAX_ENTRIES", "7");
        }

        let config = CacheConfig::from_env();

        unsafe {
            std::env::remove_var("MAVEN_META_CACHE_TTL_MS");
            std::env::remove_var("MAVEN_META_CACHE_MAX_ENTRIES");
        }

        assert_eq!(config.default_ttl, Duration::from_millis(1500));
        assert_eq!(config.max_entries, 7);
    }
}
