//! Domain configuration - the immutable settings each component is built from.

use std::time::Duration;

use crate::error::ConfigError;

mod load_shed;
mod rate_limit;

pub use load_shed::OverloadDetectorConfig;
pub use rate_limit::RateLimiterConfig;

/// Upper bound for the period of a background loop.
pub const MAX_LOOP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Reject a loop period that is zero or longer than [`MAX_LOOP_INTERVAL`].
fn validate_loop_interval(field: &'static str, interval: Duration) -> Result<(), ConfigError> {
    if interval.is_zero() {
        return Err(ConfigError::ZeroDuration { field });
    }
    if interval > MAX_LOOP_INTERVAL {
        return Err(ConfigError::TooLong {
            field,
            max: MAX_LOOP_INTERVAL,
        });
    }
    Ok(())
}
