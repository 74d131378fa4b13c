//! Core data types for simulation reports.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::swarm::{PeerId, Swarm};
use crate::topology::{BuildTopology, TopologySummary};
use crate::utils::stats::{mean, percentile};

/// Parameters a run was executed with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub generated_at: String,
    pub peer_count: usize,
    pub piece_count: usize,
    pub transmit_limit: usize,
    pub strategy: String,
    pub seed_peer: PeerId,
    pub max_rounds: u32,
    pub rng_seed: Option<u64>,
}

impl RunMetadata {
    pub fn from_config(config: &Config) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            peer_count: config.swarm.peer_count,
            piece_count: config.swarm.piece_count,
            transmit_limit: config.swarm.transmit_limit,
            strategy: config.topology.name().to_string(),
            seed_peer: config.swarm.seed_peer,
            max_rounds: config.general.max_rounds,
            rng_seed: config.general.rng_seed,
        }
    }
}

/// Final state of a single peer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerOutcome {
    pub id: PeerId,
    pub degree: usize,
    pub failed_connection_attempts: usize,
    pub completed_pieces: usize,
    /// Round in which the peer became complete; 0 for the seed
    pub finish_round: Option<u32>,
}

/// Aggregate finish-round statistics over the peers that completed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionStats {
    pub complete_peers: usize,
    pub incomplete_peers: usize,
    pub p50_finish_round: Option<u32>,
    pub p90_finish_round: Option<u32>,
    pub p100_finish_round: Option<u32>,
    pub mean_finish_round: Option<f64>,
}

impl CompletionStats {
    /// Statistics over `peers`, excluding the seed, which finishes at round 0
    pub fn from_peers(peers: &[PeerOutcome], seed_peer: PeerId) -> Self {
        let finish_rounds: Vec<u32> = peers
            .iter()
            .filter(|p| p.id != seed_peer)
            .filter_map(|p| p.finish_round)
            .collect();
        let complete_peers = peers.iter().filter(|p| p.finish_round.is_some()).count();

        Self {
            complete_peers,
            incomplete_peers: peers.len() - complete_peers,
            p50_finish_round: percentile(&finish_rounds, 50.0),
            p90_finish_round: percentile(&finish_rounds, 90.0),
            p100_finish_round: percentile(&finish_rounds, 100.0),
            mean_finish_round: mean(&finish_rounds),
        }
    }
}

/// Complete report of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub metadata: RunMetadata,
    pub topology: TopologySummary,
    /// True if every peer completed within the round cap
    pub converged: bool,
    /// Rounds executed
    pub total_rounds: u32,
    /// Pieces moved over the whole run
    pub total_transfers: usize,
    pub completion: CompletionStats,
    pub peers: Vec<PeerOutcome>,
}

/// Per-peer outcomes from a finished swarm
pub fn collect_peer_outcomes(swarm: &Swarm) -> Vec<PeerOutcome> {
    swarm
        .peers()
        .iter()
        .map(|p| PeerOutcome {
            id: p.id(),
            degree: p.degree(),
            failed_connection_attempts: p.failed_connection_attempts(),
            completed_pieces: p.completed_count(),
            finish_round: p.finish_round(),
        })
        .collect()
}
