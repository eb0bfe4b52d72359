//! Application state - shared across all handlers of a worker.

use std::sync::Arc;

use throttle_core::RateLimiterConfig;
use throttle_core::ports::{LoadShedder, RateLimiter};

/// Shared application state.
///
/// The rate limiter is process-wide. The load shedder is per worker, so each
/// worker sheds based on how starved its own runtime is.
#[derive(Clone)]
pub struct AppState {
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub load_shedder: Arc<dyn LoadShedder>,
    pub rate_limit: RateLimiterConfig,
}

impl AppState {
    pub fn new(
        rate_limiter: Arc<dyn RateLimiter>,
        load_shedder: Arc<dyn LoadShedder>,
        rate_limit: RateLimiterConfig,
    ) -> Self {
        Self {
            rate_limiter,
            load_shedder,
            rate_limit,
        }
    }
}
