//! Load shedding implementations.

mod detector;

pub use detector::OverloadDetector;
