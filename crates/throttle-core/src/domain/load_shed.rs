//! Overload detector configuration.

use std::time::Duration;

use serde::Serialize;

use crate::error::ConfigError;

/// Sampling settings for the overload detector.
///
/// Every `check_interval` the detector measures how long the last sampling
/// window actually took; a window longer than `overload_factor` marks the
/// server as overloaded until the next on-schedule sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverloadDetectorConfig {
    check_interval: Duration,
    overload_factor: Duration,
}

impl OverloadDetectorConfig {
    /// `check_interval` must be non-zero and at most
    /// [`super::MAX_LOOP_INTERVAL`]; `overload_factor` must be non-zero.
    pub fn new(check_interval: Duration, overload_factor: Duration) -> Result<Self, ConfigError> {
        super::validate_loop_interval("check_interval", check_interval)?;
        if overload_factor.is_zero() {
            return Err(ConfigError::ZeroDuration {
                field: "overload_factor",
            });
        }

        Ok(Self {
            check_interval,
            overload_factor,
        })
    }

    pub fn check_interval(&self) -> Duration {
        self.check_interval
    }

    pub fn overload_factor(&self) -> Duration {
        self.overload_factor
    }
}

impl Default for OverloadDetectorConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_millis(100),
            overload_factor: Duration::from_millis(200),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_durations() {
        assert_eq!(
            OverloadDetectorConfig::new(Duration::ZERO, Duration::from_millis(200)),
            Err(ConfigError::ZeroDuration {
                field: "check_interval"
            })
        );
        assert_eq!(
            OverloadDetectorConfig::new(Duration::from_millis(100), Duration::ZERO),
            Err(ConfigError::ZeroDuration {
                field: "overload_factor"
            })
        );
    }

    #[test]
    fn test_rejects_check_interval_past_max() {
        assert_eq!(
            OverloadDetectorConfig::new(Duration::MAX, Duration::from_millis(200)),
            Err(ConfigError::TooLong {
                field: "check_interval",
                max: crate::MAX_LOOP_INTERVAL,
            })
        );

        // Only the sampling period drives a timer; the threshold may be anything.
        assert!(OverloadDetectorConfig::new(Duration::from_millis(100), Duration::MAX).is_ok());
    }

    #[test]
    fn test_default_matches_new() {
        let config =
            OverloadDetectorConfig::new(Duration::from_millis(100), Duration::from_millis(200))
                .unwrap();
        assert_eq!(config, OverloadDetectorConfig::default());
    }
}
