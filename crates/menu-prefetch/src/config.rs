//! Polling policy.

use crate::ConfigError;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);
pub const DEFAULT_ITEM_LIMIT: u32 = 50;

/// Interval and wall-clock ceiling for poll workers, plus the item limit sent with each start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefetchConfig {
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub item_limit: u32,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            item_limit: DEFAULT_ITEM_LIMIT,
        }
    }
}

impl PrefetchConfig {
    /// Defaults overridden by `PREFETCH_POLL_INTERVAL_MS`, `PREFETCH_TIMEOUT_SECS` and
    /// `PREFETCH_ITEM_LIMIT` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(ms) = parse_positive(&lookup, "PREFETCH_POLL_INTERVAL_MS")? {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_positive(&lookup, "PREFETCH_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(limit) = parse_positive(&lookup, "PREFETCH_ITEM_LIMIT")? {
            config.item_limit = u32::try_from(limit).map_err(|_| ConfigError::Invalid {
                name: "PREFETCH_ITEM_LIMIT",
                value: limit.to_string(),
            })?;
        }
        Ok(config)
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_item_limit(mut self, item_limit: u32) -> Self {
        self.item_limit = item_limit;
        self
    }
}

fn parse_positive(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<u64>, ConfigError> {
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(v) if v > 0 => Ok(Some(v)),
        _ => Err(ConfigError::Invalid { name, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = PrefetchConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, PrefetchConfig::default());
        assert_eq!(config.poll_interval, Duration::from_secs(3));
        assert_eq!(config.timeout, Duration::from_secs(90));
    }

    #[test]
    fn overrides_from_env() {
        let config = PrefetchConfig::from_lookup(lookup(&[
            ("PREFETCH_POLL_INTERVAL_MS", "500"),
            ("PREFETCH_TIMEOUT_SECS", "30"),
            ("PREFETCH_ITEM_LIMIT", "12"),
        ]))
        .unwrap();
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.item_limit, 12);
    }

    #[test]
    fn rejects_zero_and_garbage() {
        let err = PrefetchConfig::from_lookup(lookup(&[("PREFETCH_POLL_INTERVAL_MS", "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("PREFETCH_POLL_INTERVAL_MS"));
        assert!(
            PrefetchConfig::from_lookup(lookup(&[("PREFETCH_TIMEOUT_SECS", "soon")])).is_err()
        );
    }
}
