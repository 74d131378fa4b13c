//! Topology strategy definitions.
//!
//! A strategy is selected by name in the configuration and dispatched by
//! enum variant; callers never need to know which one built a swarm.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::swarm::Swarm;
use crate::topology::greedy::GreedyBoundedRandom;
use crate::topology::regular::FixedDegreeRandom;

/// Errors raised while constructing a topology
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TopologyError {
    /// The requested graph cannot exist with these parameters
    #[error("Invalid topology configuration: {0}")]
    InvalidConfiguration(String),
    /// Random pairing kept dead-ending; only reachable for near-complete graphs
    #[error("Failed to generate a regular graph after {attempts} attempts")]
    GenerationExhausted { attempts: usize },
}

/// Capability shared by every topology strategy
pub trait BuildTopology {
    /// Short, stable name used in logs and reports
    fn name(&self) -> &'static str;

    /// Reject parameters that make the requested graph impossible
    fn validate(&self, peer_count: usize) -> Result<(), TopologyError>;

    /// Build a swarm of `peer_count` empty peers and connect them
    fn build<R: Rng + ?Sized>(
        &self,
        peer_count: usize,
        piece_count: usize,
        rng: &mut R,
    ) -> Result<Swarm, TopologyError>;
}

/// Topology strategy selected in configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum TopologyStrategy {
    /// Peers arrive one at a time and greedily connect to random earlier peers
    GreedyBoundedRandom(GreedyBoundedRandom),
    /// Uniformly random regular graph
    FixedDegreeRandom(FixedDegreeRandom),
}

impl TopologyStrategy {
    /// Preferred degree, if the strategy has one distinct from its hard cap
    pub fn soft_limit(&self) -> Option<usize> {
        match self {
            Self::GreedyBoundedRandom(s) => Some(s.soft_limit),
            Self::FixedDegreeRandom(_) => None,
        }
    }

    /// Maximum degree any peer may reach
    pub fn max_degree(&self) -> usize {
        match self {
            Self::GreedyBoundedRandom(s) => s.max_limit,
            Self::FixedDegreeRandom(s) => s.degree,
        }
    }
}

impl BuildTopology for TopologyStrategy {
    fn name(&self) -> &'static str {
        match self {
            Self::GreedyBoundedRandom(s) => s.name(),
            Self::FixedDegreeRandom(s) => s.name(),
        }
    }

    fn validate(&self, peer_count: usize) -> Result<(), TopologyError> {
        match self {
            Self::GreedyBoundedRandom(s) => s.validate(peer_count),
            Self::FixedDegreeRandom(s) => s.validate(peer_count),
        }
    }

    fn build<R: Rng + ?Sized>(
        &self,
        peer_count: usize,
        piece_count: usize,
        rng: &mut R,
    ) -> Result<Swarm, TopologyError> {
        match self {
            Self::GreedyBoundedRandom(s) => s.build(peer_count, piece_count, rng),
            Self::FixedDegreeRandom(s) => s.build(peer_count, piece_count, rng),
        }
    }
}

impl Default for TopologyStrategy {
    fn default() -> Self {
        Self::GreedyBoundedRandom(GreedyBoundedRandom::default())
    }
}
