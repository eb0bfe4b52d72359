//! Ports - trait definitions the components are consumed through.
//! These are the "interfaces" that infrastructure must implement.

mod clock;
mod load_shed;
mod rate_limit;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use load_shed::LoadShedder;
pub use rate_limit::RateLimiter;
