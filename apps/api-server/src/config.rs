//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use throttle_core::{ConfigError, OverloadDetectorConfig, RateLimiterConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub rate_limit: RateLimiterConfig,
    pub load_shed: OverloadDetectorConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Missing variables fall back to defaults; present but malformed ones
    /// are rejected.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let rate_limit = RateLimiterConfig::new(
            parse_or(&lookup, "RATE_LIMIT_MAX_TOKENS", 10)?,
            Duration::from_millis(parse_or(&lookup, "RATE_LIMIT_REFILL_MS", 100)?),
        )?
        .with_idle_ttl(Duration::from_secs(parse_or(
            &lookup,
            "RATE_LIMIT_IDLE_TTL_SECS",
            300,
        )?))
        .with_sweep_interval(Duration::from_secs(parse_or(
            &lookup,
            "RATE_LIMIT_SWEEP_SECS",
            60,
        )?))?;

        // Check every 100ms whether the last window took longer than 200ms.
        let load_shed = OverloadDetectorConfig::new(
            Duration::from_millis(parse_or(&lookup, "LOAD_SHED_CHECK_MS", 100)?),
            Duration::from_millis(parse_or(&lookup, "LOAD_SHED_FACTOR_MS", 200)?),
        )?;

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 8080)?,
            rate_limit,
            load_shed,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { field: key, value: raw }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.rate_limit.max_tokens(), 10);
        assert_eq!(config.rate_limit.refill_interval(), Duration::from_millis(100));
        assert_eq!(config.load_shed, OverloadDetectorConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("RATE_LIMIT_MAX_TOKENS", "50"),
            ("RATE_LIMIT_REFILL_MS", "1000"),
            ("LOAD_SHED_FACTOR_MS", "500"),
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.rate_limit.max_tokens(), 50);
        assert_eq!(config.rate_limit.refill_interval(), Duration::from_secs(1));
        assert_eq!(config.load_shed.overload_factor(), Duration::from_millis(500));
    }

    #[test]
    fn test_rejects_malformed_and_zero_values() {
        assert_eq!(
            config_from(&[("RATE_LIMIT_MAX_TOKENS", "ten")]).unwrap_err(),
            ConfigError::Invalid {
                field: "RATE_LIMIT_MAX_TOKENS",
                value: "ten".to_string()
            }
        );
        assert_eq!(
            config_from(&[("RATE_LIMIT_MAX_TOKENS", "0")]).unwrap_err(),
            ConfigError::ZeroTokens
        );
        assert_eq!(
            config_from(&[("LOAD_SHED_CHECK_MS", "0")]).unwrap_err(),
            ConfigError::ZeroDuration {
                field: "check_interval"
            }
        );
    }

    #[test]
    fn test_rejects_loop_periods_that_cannot_be_scheduled() {
        assert_eq!(
            config_from(&[("RATE_LIMIT_SWEEP_SECS", "18446744073709551615")]).unwrap_err(),
            ConfigError::TooLong {
                field: "sweep_interval",
                max: throttle_core::MAX_LOOP_INTERVAL,
            }
        );
        assert_eq!(
            config_from(&[("LOAD_SHED_CHECK_MS", "18446744073709551615")]).unwrap_err(),
            ConfigError::TooLong {
                field: "check_interval",
                max: throttle_core::MAX_LOOP_INTERVAL,
            }
        );
    }
}
