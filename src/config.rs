//! Configuration for a shelf and its cache.
//!
//! Built with the builder pattern, or read from the environment with
//! [`ShelfConfig::from_env`].

use std::time::Duration;

use tracing::warn;

/// Environment variable holding the cache TTL in whole seconds.
pub const TTL_ENV: &str = "TTL_SECONDS";

/// Environment variable holding the lookup timeout in milliseconds.
pub const LOOKUP_TIMEOUT_ENV: &str = "LOOKUP_TIMEOUT_MS";

/// Cache TTL used when nothing else is configured.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Number of recommendations returned by default.
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 5;

/// Configuration for creating a new shelf.
///
/// ```
/// use reading_shelf::ShelfConfig;
/// use std::time::Duration;
///
/// let config = ShelfConfig::new()
///     .ttl(Duration::from_secs(300))
///     .lookup_timeout(Duration::from_secs(2))
///     .build();
///
/// assert_eq!(config.get_ttl(), Duration::from_secs(300));
/// ```
#[derive(Debug, Clone)]
pub struct ShelfConfig {
    /// How long a fetched record stays fresh. Zero disables caching.
    pub(crate) ttl: Duration,

    /// Timeout handed to the lookup service. `None` lets it decide.
    pub(crate) lookup_timeout: Option<Duration>,

    /// Upper bound on recommendations returned by the default policy.
    pub(crate) recommendation_limit: usize,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            lookup_timeout: None,
            recommendation_limit: DEFAULT_RECOMMENDATION_LIMIT,
        }
    }
}

impl ShelfConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `TTL_SECONDS` and `LOOKUP_TIMEOUT_MS`.
    ///
    /// Unset variables keep their defaults; unparsable ones are logged and
    /// ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = var(TTL_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.ttl = Duration::from_secs(secs),
                Err(_) => warn!(value = %raw, "ignoring invalid {}", TTL_ENV),
            }
        }

        if let Some(raw) = var(LOOKUP_TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(0) => config.lookup_timeout = None,
                Ok(ms) => config.lookup_timeout = Some(Duration::from_millis(ms)),
                Err(_) => warn!(value = %raw, "ignoring invalid {}", LOOKUP_TIMEOUT_ENV),
            }
        }

        config
    }

    /// Set how long fetched records stay fresh.
    ///
    /// `Duration::ZERO` makes every access go to the lookup service.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the timeout passed to every lookup. Zero clears it.
    pub fn lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = if timeout.is_zero() {
            None
        } else {
            Some(timeout)
        };
        self
    }

    /// Set how many recommendations the default policy returns.
    pub fn recommendation_limit(mut self, limit: usize) -> Self {
        self.recommendation_limit = limit;
        self
    }

    pub fn build(self) -> Self {
        self
    }

    pub fn get_ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get_lookup_timeout(&self) -> Option<Duration> {
        self.lookup_timeout
    }

    pub fn get_recommendation_limit(&self) -> usize {
        self.recommendation_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ShelfConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(60));
        assert!(config.lookup_timeout.is_none());
        assert_eq!(config.recommendation_limit, 5);
    }

    #[test]
    fn test_builder_pattern() {
        let config = ShelfConfig::new()
            .ttl(Duration::from_secs(10))
            .lookup_timeout(Duration::from_millis(500))
            .recommendation_limit(3)
            .build();

        assert_eq!(config.ttl, Duration::from_secs(10));
        assert_eq!(config.lookup_timeout, Some(Duration::from_millis(500)));
        assert_eq!(config.recommendation_limit, 3);
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let config = ShelfConfig::new().lookup_timeout(Duration::ZERO).build();
        assert!(config.lookup_timeout.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = ShelfConfig::from_lookup(env(&[
            ("TTL_SECONDS", "120"),
            ("LOOKUP_TIMEOUT_MS", "750"),
        ]));
        assert_eq!(config.ttl, Duration::from_secs(120));
        assert_eq!(config.lookup_timeout, Some(Duration::from_millis(750)));
    }

    #[test]
    fn test_env_invalid_values_keep_defaults() {
        let config = ShelfConfig::from_lookup(env(&[
            ("TTL_SECONDS", "soon"),
            ("LOOKUP_TIMEOUT_MS", "-1"),
        ]));
        assert_eq!(config.ttl, DEFAULT_TTL);
        assert!(config.lookup_timeout.is_none());
    }

    #[test]
    fn test_env_unset_uses_defaults() {
        let config = ShelfConfig::from_lookup(env(&[]));
        assert_eq!(config.ttl, DEFAULT_TTL);
    }
}
