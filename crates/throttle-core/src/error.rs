//! Configuration error types.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while building component configuration.
///
/// The components themselves never fail at check time; these only surface
/// when a configuration is constructed or loaded from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Bucket capacity must be at least one token")]
    ZeroTokens,

    #[error("Duration `{field}` must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("Duration `{field}` must not exceed {max:?}")]
    TooLong { field: &'static str, max: Duration },

    #[error("Invalid value for {field}: {value:?}")]
    Invalid { field: &'static str, value: String },
}
