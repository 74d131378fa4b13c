//! Swarm topology construction.
//!
//! This module builds the peer population and its neighbor relation under
//! one of two interchangeable strategies, and summarizes the result.

pub mod types;
pub mod greedy;
pub mod regular;
pub mod summary;

// Re-export key types and functions for easier access
pub use types::{BuildTopology, TopologyError, TopologyStrategy};
pub use greedy::GreedyBoundedRandom;
pub use regular::FixedDegreeRandom;
pub use summary::{log_topology, summarize_topology, TopologySummary};
