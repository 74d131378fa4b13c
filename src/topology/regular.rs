//! Fixed-degree random topology.
//!
//! Generates a random simple regular graph with the configuration model:
//! every peer contributes `degree` stubs, stubs are shuffled and paired, and
//! pairs that would form a self-loop or a duplicate edge are thrown back for
//! another pairing round. An attempt that leaves only unpairable stubs is
//! discarded and generation starts over.

use std::collections::{BTreeMap, BTreeSet};
use std::iter;

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::swarm::{PeerId, Swarm};
use crate::topology::types::{BuildTopology, TopologyError};

/// Restart cap for the pairing process
const MAX_GENERATION_ATTEMPTS: usize = 1000;

/// Parameters for regular graph construction
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FixedDegreeRandom {
    /// Exact number of neighbors every peer ends up with
    pub degree: usize,
}

impl Default for FixedDegreeRandom {
    fn default() -> Self {
        Self { degree: 5 }
    }
}

impl BuildTopology for FixedDegreeRandom {
    fn name(&self) -> &'static str {
        "fixed_degree_random"
    }

    fn validate(&self, peer_count: usize) -> Result<(), TopologyError> {
        if self.degree == 0 {
            return Err(TopologyError::InvalidConfiguration(
                "degree must be positive".to_string(),
            ));
        }
        if self.degree >= peer_count {
            return Err(TopologyError::InvalidConfiguration(format!(
                "degree ({}) must be less than peer count ({})",
                self.degree, peer_count
            )));
        }
        if (self.degree * peer_count) % 2 != 0 {
            return Err(TopologyError::InvalidConfiguration(format!(
                "degree * peer count ({} * {}) must be even",
                self.degree, peer_count
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

        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            if let Some(edges) = self.try_pairing(peer_count, rng) {
                debug!("Regular graph generated on attempt {}", attempt);
                let mut swarm = Swarm::new(peer_count, piece_count);
                for (a, b) in edges {
                    swarm.connect(a, b);
                }
                return Ok(swarm);
            }
            debug!("Stub pairing dead-ended on attempt {}, restarting", attempt);
        }

        Err(TopologyError::GenerationExhausted {
            attempts: MAX_GENERATION_ATTEMPTS,
        })
    }
}

impl FixedDegreeRandom {
    /// One pass of the configuration model. Returns `None` on a dead end.
    fn try_pairing<R: Rng + ?Sized>(
        &self,
        peer_count: usize,
        rng: &mut R,
    ) -> Option<BTreeSet<(PeerId, PeerId)>> {
        let mut edges = BTreeSet::new();
        let mut stubs: Vec<PeerId> = (0..peer_count)
            .flat_map(|id| iter::repeat(id).take(self.degree))
            .collect();

        while !stubs.is_empty() {
            stubs.shuffle(rng);

            let mut leftover: BTreeMap<PeerId, usize> = BTreeMap::new();
            for pair in stubs.chunks_exact(2) {
                let (a, b) = (pair[0].min(pair[1]), pair[0].max(pair[1]));
                if a != b && edges.insert((a, b)) {
                    continue;
                }
                *leftover.entry(a).or_default() += 1;
                *leftover.entry(b).or_default() += 1;
            }

            if !can_still_pair(&edges, &leftover) {
                return None;
            }

            stubs = leftover
                .into_iter()
                .flat_map(|(id, count)| iter::repeat(id).take(count))
                .collect();
        }

        Some(edges)
    }
}

/// True if some pair of distinct leftover peers is not yet connected
fn can_still_pair(edges: &BTreeSet<(PeerId, PeerId)>, leftover: &BTreeMap<PeerId, usize>) -> bool {
    if leftover.is_empty() {
        return true;
    }
    let ids: Vec<PeerId> = leftover.keys().copied().collect();
    ids.iter().enumerate().any(|(i, &a)| {
        ids[i + 1..].iter().any(|&b| !edges.contains(&(a, b)))
    })
}
