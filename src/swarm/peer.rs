//! Per-peer simulation state.
//!
//! A peer tracks which pieces it owns, who its neighbors are, and how much
//! it has uploaded and downloaded in the current round.

use std::collections::BTreeSet;

/// Stable peer identifier: the peer's index in the swarm arena
pub type PeerId = usize;

/// Completion state of a peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    /// Still missing at least one piece
    Incomplete,
    /// Owns every piece; never transitions back
    Complete,
}

/// A single member of the swarm
#[derive(Debug, Clone)]
pub struct Peer {
    id: PeerId,
    pieces: Vec<bool>,
    completed_count: usize,
    neighbors: BTreeSet<PeerId>,
    pub(crate) uploaded_this_round: usize,
    pub(crate) downloaded_this_round: usize,
    pub(crate) failed_connection_attempts: usize,
    pub(crate) finish_round: Option<u32>,
}

impl Peer {
    /// Create an empty peer that owns none of `piece_count` pieces
    pub fn new(id: PeerId, piece_count: usize) -> Self {
        Self {
            id,
            pieces: vec![false; piece_count],
            completed_count: 0,
            neighbors: BTreeSet::new(),
            uploaded_this_round: 0,
            downloaded_this_round: 0,
            failed_connection_attempts: 0,
            finish_round: None,
        }
    }

    pub fn id(&self) -> PeerId {
        self.id
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn completed_count(&self) -> usize {
        self.completed_count
    }

    /// Returns true if this peer owns piece `index`
    pub fn has_piece(&self, index: usize) -> bool {
        self.pieces.get(index).copied().unwrap_or(false)
    }

    /// Ownership vector, one entry per piece
    pub fn pieces(&self) -> &[bool] {
        &self.pieces
    }

    pub fn neighbors(&self) -> &BTreeSet<PeerId> {
        &self.neighbors
    }

    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_neighbor(&self, other: PeerId) -> bool {
        self.neighbors.contains(&other)
    }

    pub fn uploaded_this_round(&self) -> usize {
        self.uploaded_this_round
    }

    pub fn downloaded_this_round(&self) -> usize {
        self.downloaded_this_round
    }

    pub fn failed_connection_attempts(&self) -> usize {
        self.failed_connection_attempts
    }

    /// Round in which this peer became complete, if it has
    pub fn finish_round(&self) -> Option<u32> {
        self.finish_round
    }

    pub fn state(&self) -> PeerState {
        if self.is_complete() {
            PeerState::Complete
        } else {
            PeerState::Incomplete
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed_count == self.pieces.len()
    }

    /// Mark every piece as owned. Used to designate the seed peer.
    pub(crate) fn fill(&mut self) {
        self.pieces.iter_mut().for_each(|p| *p = true);
        self.completed_count = self.pieces.len();
    }

    /// Record ownership of piece `index`.
    ///
    /// Returns false if the piece was already owned or is out of range, in
    /// which case nothing changes.
    pub(crate) fn receive_piece(&mut self, index: usize) -> bool {
        match self.pieces.get_mut(index) {
            Some(owned) if !*owned => {
                *owned = true;
                self.completed_count += 1;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn add_neighbor(&mut self, other: PeerId) -> bool {
        self.neighbors.insert(other)
    }

    pub(crate) fn reset_round_counters(&mut self) {
        self.uploaded_this_round = 0;
        self.downloaded_this_round = 0;
    }
}
