//! Shared utilities.

pub mod stats;

pub use stats::{mean, percentile};
