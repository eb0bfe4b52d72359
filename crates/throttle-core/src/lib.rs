//! # Throttle Core
//!
//! The domain layer of Throttle.
//! This crate holds the ports and validated configuration for the rate
//! limiter and the load shedder. It has no async runtime dependency.

pub mod domain;
pub mod error;
pub mod ports;

pub use domain::{MAX_LOOP_INTERVAL, OverloadDetectorConfig, RateLimiterConfig};
pub use error::ConfigError;
