//! Middleware modules.

pub mod error;
pub mod load_shed;
pub mod rate_limit;

pub use load_shed::LoadShedMiddleware;
pub use rate_limit::RateLimitMiddleware;
