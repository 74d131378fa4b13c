use serde::{Deserialize, Serialize};

use crate::swarm::PeerId;
use crate::topology::{BuildTopology, TopologyError, TopologyStrategy};

/// Default round cap, after which a run is reported as not converged
pub const DEFAULT_MAX_ROUNDS: u32 = 1000;

/// Top-level configuration structure that mirrors the YAML configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub swarm: SwarmConfig,
    #[serde(default)]
    pub topology: TopologyStrategy,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.general.max_rounds == 0 {
            return Err(ValidationError::InvalidGeneral(
                "max_rounds must be positive".to_string(),
            ));
        }

        let swarm = &self.swarm;
        if swarm.peer_count == 0 {
            return Err(ValidationError::InvalidSwarm(
                "peer_count must be positive".to_string(),
            ));
        }
        if swarm.piece_count == 0 {
            return Err(ValidationError::InvalidSwarm(
                "piece_count must be positive".to_string(),
            ));
        }
        if swarm.transmit_limit == 0 {
            return Err(ValidationError::InvalidSwarm(
                "transmit_limit must be positive".to_string(),
            ));
        }
        if swarm.seed_peer >= swarm.peer_count {
            return Err(ValidationError::InvalidSwarm(format!(
                "seed_peer ({}) must be less than peer_count ({})",
                swarm.seed_peer, swarm.peer_count
            )));
        }

        self.topology.validate(swarm.peer_count)?;

        Ok(())
    }

    /// True when the topology's degree limit is not below the peer count,
    /// so peers run out of candidates before reaching it
    pub fn degree_saturates(&self) -> bool {
        self.swarm.peer_count > 1 && self.topology.max_degree() >= self.swarm.peer_count
    }
}

/// Run-wide settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeneralConfig {
    /// Round cap
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    /// Seed for the random source; absent means seeded from entropy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,
}

/// Swarm population and bandwidth parameters
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SwarmConfig {
    pub peer_count: usize,
    pub piece_count: usize,
    /// Pieces a peer may upload, and separately download, per round
    pub transmit_limit: usize,
    #[serde(default)]
    pub seed_peer: PeerId,
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid swarm configuration: {0}")]
    InvalidSwarm(String),
    #[error(transparent)]
    InvalidTopology(#[from] TopologyError),
}

fn default_max_rounds() -> u32 {
    DEFAULT_MAX_ROUNDS
}

/// Default implementations
impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            rng_seed: None,
        }
    }
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            peer_count: 5000,
            piece_count: 125,
            transmit_limit: 10,
            seed_peer: 0,
        }
    }
}
