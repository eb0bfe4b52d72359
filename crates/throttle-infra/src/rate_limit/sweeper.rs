//! Background eviction of idle token buckets.

use std::sync::Arc;
use std::time::Duration;

use throttle_core::ports::Clock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::TokenBucketLimiter;

/// Periodically drops buckets that can no longer influence a decision.
///
/// Without it the limiter keeps one bucket per distinct key for the life of
/// the process.
pub struct BucketSweeper<C: Clock> {
    limiter: Arc<TokenBucketLimiter<C>>,
    interval: Duration,
}

impl<C: Clock + 'static> BucketSweeper<C> {
    /// Create a sweeper running at the limiter's configured sweep interval.
    pub fn new(limiter: Arc<TokenBucketLimiter<C>>) -> Self {
        let interval = limiter.config().sweep_interval();
        Self { limiter, interval }
    }

    /// Run a single sweep.
    pub fn run_cycle(&self) -> usize {
        let evicted = self.limiter.evict_idle();
        if evicted > 0 {
            debug!(
                evicted,
                remaining = self.limiter.tracked_keys(),
                "Evicted idle token buckets"
            );
        }
        evicted
    }

    /// Start the sweeper background task.
    ///
    /// The task exits once `cancel` fires.
    pub fn start(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!(
                interval_secs = self.interval.as_secs(),
                idle_ttl_secs = self.limiter.config().effective_idle_ttl().as_secs(),
                "Bucket sweeper started"
            );

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        self.run_cycle();
                    }
                }
            }

            info!("Bucket sweeper stopped");
        })
    }
}
