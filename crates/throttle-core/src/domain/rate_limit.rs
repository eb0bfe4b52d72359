//! Token-bucket rate limiter configuration.

use std::time::Duration;

use serde::Serialize;

use crate::error::ConfigError;

/// Immutable settings for a token-bucket rate limiter.
///
/// `max_tokens` is both the bucket capacity and the refill quantum: every
/// `refill_interval` a bucket regains `max_tokens` tokens, capped at capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimiterConfig {
    max_tokens: u32,
    refill_interval: Duration,
    idle_ttl: Duration,
    sweep_interval: Duration,
}

impl RateLimiterConfig {
    /// Default idle time after which a bucket may be evicted.
    pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(300);
    /// Default period of the background eviction sweep.
    pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

    /// Create a validated configuration.
    pub fn new(max_tokens: u32, refill_interval: Duration) -> Result<Self, ConfigError> {
        if max_tokens == 0 {
            return Err(ConfigError::ZeroTokens);
        }
        if refill_interval.is_zero() {
            return Err(ConfigError::ZeroDuration {
                field: "refill_interval",
            });
        }

        Ok(Self {
            max_tokens,
            refill_interval,
            idle_ttl: Self::DEFAULT_IDLE_TTL,
            sweep_interval: Self::DEFAULT_SWEEP_INTERVAL,
        })
    }

    /// Set how long a bucket must sit idle before the sweeper may drop it.
    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    /// Set the period of the background eviction sweep.
    ///
    /// Must be non-zero and at most [`super::MAX_LOOP_INTERVAL`].
    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Result<Self, ConfigError> {
        super::validate_loop_interval("sweep_interval", sweep_interval)?;
        self.sweep_interval = sweep_interval;
        Ok(self)
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn refill_interval(&self) -> Duration {
        self.refill_interval
    }

    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// Idle time after which eviction is guaranteed to be invisible.
    ///
    /// A bucket untouched for two whole refill periods holds more than
    /// `max_tokens` on its next check and is reset to the fresh state, so
    /// dropping it earlier than that could change a decision.
    pub fn effective_idle_ttl(&self) -> Duration {
        self.idle_ttl.max(self.refill_interval.saturating_mul(2))
    }
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_tokens: 10,
            refill_interval: Duration::from_millis(100),
            idle_ttl: Self::DEFAULT_IDLE_TTL,
            sweep_interval: Self::DEFAULT_SWEEP_INTERVAL,
        }
    }
}
