//! Topology statistics and logging.
//!
//! Under the greedy strategy some peers may end below their soft limit or
//! fully isolated. That is a valid outcome, so it is surfaced here instead
//! of being treated as an error.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::swarm::{PeerId, Swarm};
use crate::topology::types::{BuildTopology, TopologyStrategy};

/// Shape of a built swarm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologySummary {
    pub strategy: String,
    pub peer_count: usize,
    pub edge_count: usize,
    pub min_degree: usize,
    pub max_degree: usize,
    pub mean_degree: f64,
    /// Peers with no neighbors at all
    pub isolated_peers: Vec<PeerId>,
    /// Peers that ended below the strategy's soft limit, if it has one
    pub peers_below_soft_limit: Vec<PeerId>,
    pub total_failed_connection_attempts: usize,
}

impl TopologySummary {
    /// True if any peer missed the degree the strategy aimed for
    pub fn is_degraded(&self) -> bool {
        !self.peers_below_soft_limit.is_empty() || !self.isolated_peers.is_empty()
    }
}

/// Compute degree statistics for `swarm` built by `strategy`
pub fn summarize_topology(swarm: &Swarm, strategy: &TopologyStrategy) -> TopologySummary {
    let degrees: Vec<usize> = swarm.peers().iter().map(|p| p.degree()).collect();
    let mean_degree = if degrees.is_empty() {
        0.0
    } else {
        degrees.iter().sum::<usize>() as f64 / degrees.len() as f64
    };

    // A lone peer has nobody to connect to; only count isolation when a
    // neighbor was possible.
    let isolated_peers = if swarm.len() > 1 {
        swarm.peers().iter().filter(|p| p.degree() == 0).map(|p| p.id()).collect()
    } else {
        Vec::new()
    };

    let peers_below_soft_limit = match strategy.soft_limit() {
        Some(limit) => {
            // Nobody can exceed peer_count - 1 neighbors
            let reachable = limit.min(swarm.len().saturating_sub(1));
            swarm
                .peers()
                .iter()
                .filter(|p| p.degree() < reachable)
                .map(|p| p.id())
                .collect()
        }
        None => Vec::new(),
    };

    TopologySummary {
        strategy: strategy.name().to_string(),
        peer_count: swarm.len(),
        edge_count: swarm.edge_count(),
        min_degree: degrees.iter().copied().min().unwrap_or(0),
        max_degree: degrees.iter().copied().max().unwrap_or(0),
        mean_degree,
        isolated_peers,
        peers_below_soft_limit,
        total_failed_connection_attempts: swarm
            .peers()
            .iter()
            .map(|p| p.failed_connection_attempts())
            .sum(),
    }
}

/// Log the summary, plus a per-peer neighbor dump at debug level
pub fn log_topology(swarm: &Swarm, summary: &TopologySummary) {
    for peer in swarm.peers() {
        let neighbors: Vec<String> = peer.neighbors().iter().map(|n| n.to_string()).collect();
        debug!(
            "Peer {} failed {} connection attempts. Connected to peers {}",
            peer.id(),
            peer.failed_connection_attempts(),
            neighbors.join("; ")
        );
    }

    info!(
        "Built {} topology: {} peers, {} edges, degree min/mean/max {}/{:.2}/{}",
        summary.strategy,
        summary.peer_count,
        summary.edge_count,
        summary.min_degree,
        summary.mean_degree,
        summary.max_degree
    );

    if !summary.peers_below_soft_limit.is_empty() {
        warn!(
            "{} peers ended below the soft connection limit ({} failed connection attempts in total)",
            summary.peers_below_soft_limit.len(),
            summary.total_failed_connection_attempts
        );
    }
    if !summary.isolated_peers.is_empty() {
        warn!(
            "{} peers have no neighbors and can never receive pieces",
            summary.isolated_peers.len()
        );
    }
}
