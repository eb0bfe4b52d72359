//! Rate limiting implementations.

mod sweeper;
mod token_bucket;

pub use sweeper::BucketSweeper;
pub use token_bucket::TokenBucketLimiter;
