//! In-memory per-key token-bucket rate limiter.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use throttle_core::RateLimiterConfig;
use throttle_core::ports::{Clock, MonotonicClock, RateLimiter};

/// Per-key bucket state.
///
/// Only the token balance and the time it was last normalized are stored;
/// refills are derived from elapsed time on the next check.
#[derive(Debug, Clone, Copy)]
struct Bucket {
    remaining_tokens: i64,
    last_refill: Instant,
}

impl Bucket {
    /// A bucket that has just served its first request.
    fn fresh(max_tokens: i64, now: Instant) -> Self {
        Self {
            remaining_tokens: max_tokens - 1,
            last_refill: now,
        }
    }

    /// Refill from elapsed time and try to take one token.
    ///
    /// Returns `true` when the bucket is empty. A denial leaves the bucket
    /// untouched so the next check recomputes from the same `last_refill`.
    fn try_consume(&mut self, now: Instant, max_tokens: i64, refill_interval: Duration) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill);
        let elapsed_refills = elapsed.as_nanos() / refill_interval.as_nanos();
        let elapsed_refills = i64::try_from(elapsed_refills).unwrap_or(i64::MAX);
        let current_tokens = self
            .remaining_tokens
            .saturating_add(max_tokens.saturating_mul(elapsed_refills));

        if current_tokens < 1 {
            return true;
        }

        if current_tokens > max_tokens {
            // Saturated: anything beyond one full bucket is discarded.
            *self = Self::fresh(max_tokens, now);
            return false;
        }

        // Bank whole refill periods only; the fractional part stays implicit
        // in `now - last_refill`.
        let delta_refills = (current_tokens - self.remaining_tokens) / max_tokens;
        let delta_refills = u32::try_from(delta_refills).unwrap_or(u32::MAX);
        self.last_refill += refill_interval.saturating_mul(delta_refills);
        self.remaining_tokens = current_tokens - 1;
        false
    }
}

/// Per-client token-bucket rate limiter.
///
/// Each key gets a bucket of `max_tokens` tokens, created lazily on its first
/// request and refilled by `max_tokens` every `refill_interval`. No timer runs
/// per bucket; refills are computed on demand from a monotonic clock.
///
/// A single mutex guards the whole map, so a check is one atomic
/// read-modify-write. Limits are per-process, not shared across instances.
pub struct TokenBucketLimiter<C: Clock = MonotonicClock> {
    buckets: Mutex<HashMap<String, Bucket>>,
    config: RateLimiterConfig,
    clock: C,
}

impl TokenBucketLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self::with_clock(config, MonotonicClock)
    }
}

impl<C: Clock> TokenBucketLimiter<C> {
    /// Create a limiter reading time from `clock`.
    pub fn with_clock(config: RateLimiterConfig, clock: C) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    /// Check the bucket for `key`, consuming one token on admission.
    ///
    /// Returns `true` if the limit is reached and the request must be denied,
    /// `false` if it was admitted.
    pub fn check_and_consume(&self, key: &str) -> bool {
        let now = self.clock.now();
        let max_tokens = i64::from(self.config.max_tokens());

        let mut buckets = self.buckets.lock();
        match buckets.get_mut(key) {
            Some(bucket) => bucket.try_consume(now, max_tokens, self.config.refill_interval()),
            None => {
                buckets.insert(key.to_owned(), Bucket::fresh(max_tokens, now));
                tracing::trace!(key, "Token bucket created");
                false
            }
        }
    }

    /// Drop every bucket that has been idle for at least
    /// [`RateLimiterConfig::effective_idle_ttl`].
    ///
    /// Returns the number of evicted buckets.
    pub fn evict_idle(&self) -> usize {
        let now = self.clock.now();
        let ttl = self.config.effective_idle_ttl();

        let mut buckets = self.buckets.lock();
        let before = buckets.len();
        buckets.retain(|_, bucket| now.saturating_duration_since(bucket.last_refill) < ttl);
        before - buckets.len()
    }

    /// Number of keys currently holding a bucket.
    pub fn tracked_keys(&self) -> usize {
        self.buckets.lock().len()
    }
}

impl<C: Clock> RateLimiter for TokenBucketLimiter<C> {
    fn is_limit_reached(&self, key: &str) -> bool {
        self.check_and_consume(key)
    }

    fn tracked_keys(&self) -> usize {
        TokenBucketLimiter::tracked_keys(self)
    }
}
