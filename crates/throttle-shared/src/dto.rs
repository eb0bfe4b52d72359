//! Data Transfer Objects - response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Liveness probe response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Snapshot of the overload-prevention state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleStatus {
    /// Whether the server is currently shedding load.
    pub overloaded: bool,
    /// Number of clients with a live token bucket.
    pub tracked_clients: usize,
    /// Bucket capacity per client.
    pub max_tokens: u32,
    pub refill_interval_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_field_names() {
        let status = ThrottleStatus {
            overloaded: true,
            tracked_clients: 3,
            max_tokens: 10,
            refill_interval_ms: 100,
        };

        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["overloaded"], true);
        assert_eq!(json["tracked_clients"], 3);
        assert_eq!(json["refill_interval_ms"], 100);
    }
}
