//! Swarm state: the peer arena and its neighbor relation.
//!
//! Peers are stored in a flat vector and refer to each other by index, so
//! the cyclic neighbor graph never needs shared ownership. Edges are added
//! only while a topology is being built; afterwards only piece ownership and
//! per-round counters change.

pub mod peer;

pub use peer::{Peer, PeerId, PeerState};

use std::fmt;

/// Errors raised when addressing peers that are not part of the swarm
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SwarmError {
    #[error("Peer {id} does not exist in a swarm of {peer_count} peers")]
    UnknownPeer { id: PeerId, peer_count: usize },
    #[error("Peer {existing} is already the seed, cannot also seed peer {id}")]
    SeedAlreadyAssigned { existing: PeerId, id: PeerId },
}

/// Violation of a structural swarm invariant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Name of the violated invariant
    pub invariant: &'static str,
    /// Peer the violation was detected on
    pub peer: PeerId,
    /// Detailed description of the violation
    pub description: String,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invariant '{}' violated at peer {}: {}",
            self.invariant, self.peer, self.description
        )
    }
}

impl std::error::Error for InvariantViolation {}

/// The full peer population plus its symmetric neighbor relation
#[derive(Debug, Clone)]
pub struct Swarm {
    peers: Vec<Peer>,
    piece_count: usize,
    seed: Option<PeerId>,
}

impl Swarm {
    /// Create `peer_count` disconnected, empty peers
    pub fn new(peer_count: usize, piece_count: usize) -> Self {
        Self {
            peers: (0..peer_count).map(|id| Peer::new(id, piece_count)).collect(),
            piece_count,
            seed: None,
        }
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn piece_count(&self) -> usize {
        self.piece_count
    }

    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    pub fn peer(&self, id: PeerId) -> Option<&Peer> {
        self.peers.get(id)
    }

    /// The designated seed peer, once one has been chosen
    pub fn seed_peer(&self) -> Option<PeerId> {
        self.seed
    }

    pub(crate) fn peers_mut(&mut self) -> &mut [Peer] {
        &mut self.peers
    }

    pub(crate) fn peer_mut(&mut self, id: PeerId) -> Option<&mut Peer> {
        self.peers.get_mut(id)
    }

    /// Connect two peers symmetrically.
    ///
    /// Returns false without changing anything for self-loops, unknown
    /// peers and already-connected pairs.
    pub(crate) fn connect(&mut self, a: PeerId, b: PeerId) -> bool {
        if a == b || a >= self.peers.len() || b >= self.peers.len() {
            return false;
        }
        if self.peers[a].is_neighbor(b) {
            return false;
        }
        self.peers[a].add_neighbor(b);
        self.peers[b].add_neighbor(a);
        true
    }

    /// Designate `id` as the seed: it starts out owning every piece.
    ///
    /// A swarm has exactly one seed; a second call is rejected.
    pub fn seed(&mut self, id: PeerId) -> Result<(), SwarmError> {
        if let Some(existing) = self.seed {
            return Err(SwarmError::SeedAlreadyAssigned { existing, id });
        }
        let peer_count = self.peers.len();
        let peer = self
            .peers
            .get_mut(id)
            .ok_or(SwarmError::UnknownPeer { id, peer_count })?;
        peer.fill();
        peer.finish_round = Some(0);
        self.seed = Some(id);
        Ok(())
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.peers.iter().map(Peer::degree).sum::<usize>() / 2
    }

    pub fn complete_count(&self) -> usize {
        self.peers.iter().filter(|p| p.is_complete()).count()
    }

    /// True once every peer owns every piece
    pub fn is_converged(&self) -> bool {
        self.peers.iter().all(Peer::is_complete)
    }

    /// Check the structural invariants that must hold at any point of a run.
    ///
    /// Covers ownership vector length, `completed_count` consistency,
    /// symmetry/irreflexivity of the neighbor relation and the seed peer
    /// keeping every piece.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if let Some(seed) = self.seed {
            if !self.peers.get(seed).is_some_and(Peer::is_complete) {
                return Err(InvariantViolation {
                    invariant: "seed_complete",
                    peer: seed,
                    description: "seed peer does not own every piece".to_string(),
                });
            }
        }

        for peer in &self.peers {
            if peer.piece_count() != self.piece_count {
                return Err(InvariantViolation {
                    invariant: "ownership_length",
                    peer: peer.id(),
                    description: format!(
                        "ownership vector has {} entries, swarm has {} pieces",
                        peer.piece_count(),
                        self.piece_count
                    ),
                });
            }

            let owned = peer.pieces().iter().filter(|&&p| p).count();
            if owned != peer.completed_count() {
                return Err(InvariantViolation {
                    invariant: "completed_count",
                    peer: peer.id(),
                    description: format!(
                        "completed_count is {} but {} pieces are owned",
                        peer.completed_count(),
                        owned
                    ),
                });
            }

            for &neighbor in peer.neighbors() {
                if neighbor == peer.id() {
                    return Err(InvariantViolation {
                        invariant: "irreflexive",
                        peer: peer.id(),
                        description: "peer is its own neighbor".to_string(),
                    });
                }
                let symmetric = self
                    .peers
                    .get(neighbor)
                    .map_or(false, |other| other.is_neighbor(peer.id()));
                if !symmetric {
                    return Err(InvariantViolation {
                        invariant: "symmetric",
                        peer: peer.id(),
                        description: format!(
                            "neighbor {} does not list this peer back",
                            neighbor
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_is_symmetric() {
        let mut swarm = Swarm::new(3, 4);
        assert!(swarm.connect(0, 2));
        assert!(swarm.peers()[0].is_neighbor(2));
        assert!(swarm.peers()[2].is_neighbor(0));
        assert_eq!(swarm.edge_count(), 1);
        assert!(swarm.check_invariants().is_ok());
    }

    #[test]
    fn test_connect_rejects_self_loops_and_duplicates() {
        let mut swarm = Swarm::new(2, 1);
        assert!(!swarm.connect(1, 1));
        assert!(swarm.connect(0, 1));
        assert!(!swarm.connect(1, 0));
        assert!(!swarm.connect(0, 5));
        assert_eq!(swarm.edge_count(), 1);
    }

    #[test]
    fn test_seed_fills_only_one_peer() {
        let mut swarm = Swarm::new(4, 6);
        swarm.seed(2).unwrap();

        for peer in swarm.peers() {
            if peer.id() == 2 {
                assert_eq!(peer.completed_count(), 6);
                assert_eq!(peer.finish_round(), Some(0));
            } else {
                assert_eq!(peer.completed_count(), 0);
            }
        }
        assert_eq!(swarm.complete_count(), 1);
        assert!(!swarm.is_converged());
    }

    #[test]
    fn test_seed_unknown_peer() {
        let mut swarm = Swarm::new(2, 1);
        assert_eq!(
            swarm.seed(9),
            Err(SwarmError::UnknownPeer { id: 9, peer_count: 2 })
        );
    }

    #[test]
    fn test_second_seed_is_rejected() {
        let mut swarm = Swarm::new(3, 2);
        swarm.seed(0).unwrap();

        assert_eq!(
            swarm.seed(1),
            Err(SwarmError::SeedAlreadyAssigned { existing: 0, id: 1 })
        );
        assert_eq!(swarm.seed_peer(), Some(0));
        assert_eq!(swarm.peers()[1].completed_count(), 0);
        assert_eq!(swarm.complete_count(), 1);
    }

    #[test]
    fn test_invariant_detects_incomplete_seed() {
        let mut swarm = Swarm::new(2, 3);
        swarm.seed(1).unwrap();
        assert!(swarm.check_invariants().is_ok());

        swarm.peers_mut()[1] = Peer::new(1, 3);
        let violation = swarm.check_invariants().unwrap_err();
        assert_eq!(violation.invariant, "seed_complete");
        assert_eq!(violation.peer, 1);
    }

    #[test]
    fn test_invariant_detects_asymmetry() {
        let mut swarm = Swarm::new(2, 1);
        swarm.peers_mut()[0].add_neighbor(1);

        let violation = swarm.check_invariants().unwrap_err();
        assert_eq!(violation.invariant, "symmetric");
        assert_eq!(violation.peer, 0);
    }

    #[test]
    fn test_invariant_detects_self_loop() {
        let mut swarm = Swarm::new(1, 1);
        swarm.peers_mut()[0].add_neighbor(0);

        let violation = swarm.check_invariants().unwrap_err();
        assert_eq!(violation.invariant, "irreflexive");
    }
}
