//! Rate limiting port.

/// Rate limiter trait - abstraction over per-client admission backends.
///
/// Checks are synchronous and total: a backend decides from in-memory state
/// and never fails. The caller owns the policy for a denial (e.g. HTTP 429).
pub trait RateLimiter: Send + Sync {
    /// Check the budget for `key` and consume one token if available.
    /// Returns `true` if the limit is reached and the request must be denied.
    fn is_limit_reached(&self, key: &str) -> bool;

    /// Number of client keys currently holding state.
    fn tracked_keys(&self) -> usize;
}
