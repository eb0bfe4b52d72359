//! # Throttle Infrastructure
//!
//! Concrete implementations of the ports defined in `throttle-core`.
//! Everything here is in-memory and per-process; restarting clears all state.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - Nothing beyond the core ports
//! - `rate-limit` - Per-client token-bucket limiter and idle-bucket sweeper
//! - `load-shed` - Scheduler-drift overload detector

#[cfg(feature = "load-shed")]
pub mod load_shed;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

#[cfg(feature = "load-shed")]
pub use load_shed::OverloadDetector;

#[cfg(feature = "rate-limit")]
pub use rate_limit::{BucketSweeper, TokenBucketLimiter};
