//! Load shedding port.

/// Load shedder trait - a cheap, non-blocking overload signal.
pub trait LoadShedder: Send + Sync {
    /// Returns `true` while the server should shed load (e.g. HTTP 503).
    fn is_overloaded(&self) -> bool;
}
