//! Runtime configuration read from the environment.
//!
//! `main` loads a `.env` file through dotenvy first, so every key below can
//! come from either the process environment or that file.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_PRICE_CACHE_TTL_SECS: u64 = 10 * 60;

/// What to do when a visit is saved on a date no price table covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnpricedVisitPolicy {
    /// Refuse to save; the caller gets a `pricing_unavailable` error
    #[default]
    Reject,
    /// Save with a 0.00 charge and log a warning
    Allow,
}

impl FromStr for UnpricedVisitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "allow" => Ok(Self::Allow),
            other => Err(format!("expected 'reject' or 'allow', got '{}'", other)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    /// TTL of the cached price-table snapshot; also the warmer period
    pub price_cache_ttl: Duration,
    pub unpriced_visits: UnpricedVisitPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_addr = parse_or(&lookup, "BIND_ADDR", || SocketAddr::from(DEFAULT_BIND_ADDR))?;
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", || {
            DEFAULT_MAX_CONNECTIONS
        })?;
        let ttl_secs: u64 = parse_or(&lookup, "PRICE_CACHE_TTL_SECS", || {
            DEFAULT_PRICE_CACHE_TTL_SECS
        })?;
        if ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "PRICE_CACHE_TTL_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }
        let unpriced_visits = parse_or(&lookup, "UNPRICED_VISITS", UnpricedVisitPolicy::default)?;

        Ok(Self {
            database_url,
            bind_addr,
            max_connections,
            price_cache_ttl: Duration::from_secs(ttl_secs),
            unpriced_visits,
        })
    }
}

fn parse_or<F, T, D>(lookup: &F, key: &'static str, default: D) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
    D: FnOnce() -> T,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/abrolhos")]))
            .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.price_cache_ttl, Duration::from_secs(600));
        assert_eq!(config.unpriced_visits, UnpricedVisitPolicy::Reject);
    }

    #[test]
    fn test_missing_database_url() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/abrolhos"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
            ("PRICE_CACHE_TTL_SECS", "30"),
            ("UNPRICED_VISITS", "Allow"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.price_cache_ttl, Duration::from_secs(30));
        assert_eq!(config.unpriced_visits, UnpricedVisitPolicy::Allow);
    }

    #[test]
    fn test_invalid_values() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/abrolhos"),
            ("UNPRICED_VISITS", "sometimes"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "UNPRICED_VISITS", .. }));

        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/abrolhos"),
            ("PRICE_CACHE_TTL_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PRICE_CACHE_TTL_SECS", .. }));
    }
}
