//! Greedy bounded random topology.
//!
//! Models peers joining one at a time: each newcomer walks a random
//! permutation of the peers already present and connects to any that still
//! have room, until it reaches its soft limit or runs out of patience.

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::swarm::{PeerId, Swarm};
use crate::topology::types::{BuildTopology, TopologyError};

/// Parameters for incremental-arrival topology construction
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GreedyBoundedRandom {
    /// Degree at which a newcomer stops looking for more neighbors
    pub soft_limit: usize,
    /// Degree at which an existing peer refuses new connections
    pub max_limit: usize,
    /// Rejections a newcomer tolerates before giving up
    pub failure_budget: usize,
}

impl Default for GreedyBoundedRandom {
    fn default() -> Self {
        Self {
            soft_limit: 5,
            max_limit: 20,
            failure_budget: 50,
        }
    }
}

impl BuildTopology for GreedyBoundedRandom {
    fn name(&self) -> &'static str {
        "greedy_bounded_random"
    }

    fn validate(&self, _peer_count: usize) -> Result<(), TopologyError> {
        if self.soft_limit == 0 || self.max_limit == 0 || self.failure_budget == 0 {
            return Err(TopologyError::InvalidConfiguration(format!(
                "soft_limit ({}), max_limit ({}) and failure_budget ({}) must be positive",
                self.soft_limit, self.max_limit, self.failure_budget
            )));
        }
        if self.soft_limit > self.max_limit {
            return Err(TopologyError::InvalidConfiguration(format!(
                "soft_limit ({}) cannot exceed max_limit ({})",
                self.soft_limit, self.max_limit
            )));
        }
        Ok(())
    }

    fn build<R: Rng + ?Sized>(
        &self,
        peer_count: usize,
        piece_count: usize,
        rng: &mut R,
    ) -> Result<Swarm, TopologyError> {
        self.validate(peer_count)?;

        let mut swarm = Swarm::new(peer_count, piece_count);
        let mut joined: Vec<PeerId> = Vec::with_capacity(peer_count);

        for id in 0..peer_count {
            joined.shuffle(rng);
            for &candidate in &joined {
                if swarm.peers()[candidate].degree() >= self.max_limit {
                    let peer = &mut swarm.peers_mut()[id];
                    peer.failed_connection_attempts += 1;
                    if peer.failed_connection_attempts > self.failure_budget {
                        debug!("Peer {} exhausted its failure budget", id);
                        break;
                    }
                } else {
                    swarm.connect(id, candidate);
                    if swarm.peers()[id].degree() >= self.soft_limit {
                        break;
                    }
                }
            }
            joined.push(id);
        }

        Ok(swarm)
    }
}
