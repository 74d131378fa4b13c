//! Round-based piece exchange.
//!
//! Each round every incomplete peer gets `transmit_limit` chances to fetch a
//! piece. The chances of all peers are pooled and shuffled, then processed
//! strictly one after another, so quota and ownership checks always see the
//! effects of every earlier transfer in the round.

use log::{debug, trace};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::swarm::{PeerId, Swarm};

/// What happened during a single round
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    /// 1-based round number
    pub round: u32,
    /// Work items in the round's plan
    pub work_items: usize,
    /// Pieces that changed hands
    pub transfers: usize,
    /// Peers that became complete during this round
    pub newly_completed: Vec<PeerId>,
}

/// Drives piece dissemination over a built swarm
#[derive(Debug)]
pub struct ExchangeEngine {
    swarm: Swarm,
    transmit_limit: usize,
    round: u32,
}

impl ExchangeEngine {
    /// Take ownership of `swarm`; from here on only the engine mutates it
    pub fn new(swarm: Swarm, transmit_limit: usize) -> Self {
        Self {
            swarm,
            transmit_limit,
            round: 0,
        }
    }

    pub fn swarm(&self) -> &Swarm {
        &self.swarm
    }

    pub fn into_swarm(self) -> Swarm {
        self.swarm
    }

    pub fn transmit_limit(&self) -> usize {
        self.transmit_limit
    }

    /// Number of rounds executed so far
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Advance the swarm by one round
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> RoundSummary {
        self.step_with(rng, |_| {})
    }

    /// Advance the swarm by one round, calling `observe` after every work item.
    ///
    /// The observer sees the swarm mid-round, before counters are reset.
    pub fn step_with<R, F>(&mut self, rng: &mut R, mut observe: F) -> RoundSummary
    where
        R: Rng + ?Sized,
        F: FnMut(&Swarm),
    {
        self.round += 1;
        let round = self.round;

        let mut plan = self.plan();
        plan.shuffle(rng);

        let mut summary = RoundSummary {
            round,
            work_items: plan.len(),
            ..RoundSummary::default()
        };

        for &peer in &plan {
            if self.fetch(peer, rng) {
                summary.transfers += 1;
                if let Some(p) = self.swarm.peer_mut(peer) {
                    if p.is_complete() {
                        p.finish_round = Some(round);
                        debug!("Peer {} finished downloading at round {}", peer, round);
                        summary.newly_completed.push(peer);
                    }
                }
            }
            observe(&self.swarm);
        }

        for peer in self.swarm.peers_mut() {
            peer.reset_round_counters();
        }

        summary
    }

    /// One entry per fetch opportunity, `transmit_limit` per incomplete peer
    fn plan(&self) -> Vec<PeerId> {
        self.swarm
            .peers()
            .iter()
            .filter(|p| !p.is_complete())
            .flat_map(|p| std::iter::repeat(p.id()).take(self.transmit_limit))
            .collect()
    }

    /// Try to move one piece from a random eligible neighbor to `id`.
    ///
    /// Returns true if a piece was transferred.
    fn fetch<R: Rng + ?Sized>(&mut self, id: PeerId, rng: &mut R) -> bool {
        let limit = self.transmit_limit;
        let Some(peer) = self.swarm.peer(id) else {
            return false;
        };
        if peer.is_complete() || peer.downloaded_this_round() >= limit {
            return false;
        }

        let mut candidates: Vec<(PeerId, usize)> = Vec::new();
        for &n in peer.neighbors() {
            let Some(neighbor) = self.swarm.peer(n) else {
                continue;
            };
            if neighbor.uploaded_this_round() >= limit {
                continue;
            }
            candidates.extend(
                neighbor
                    .pieces()
                    .iter()
                    .zip(peer.pieces())
                    .enumerate()
                    .filter(|(_, (theirs, ours))| **theirs && !**ours)
                    .map(|(i, _)| (n, i)),
            );
        }

        let Some(&(from, piece)) = candidates.choose(rng) else {
            return false;
        };

        let peers = self.swarm.peers_mut();
        if !peers[id].receive_piece(piece) {
            return false;
        }
        peers[id].downloaded_this_round += 1;
        peers[from].uploaded_this_round += 1;

        trace!(
            "Peer {} downloaded piece {} from neighbor {}. Total completed: {}",
            id,
            piece,
            from,
            peers[id].completed_count()
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pair(piece_count: usize) -> Swarm {
        let mut swarm = Swarm::new(2, piece_count);
        swarm.connect(0, 1);
        swarm.seed(0).unwrap();
        swarm
    }

    #[test]
    fn test_single_piece_pair_completes_in_one_round() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut engine = ExchangeEngine::new(pair(1), 1);

        let summary = engine.step(&mut rng);
        assert_eq!(summary.round, 1);
        assert_eq!(summary.work_items, 1);
        assert_eq!(summary.transfers, 1);
        assert_eq!(summary.newly_completed, vec![1]);
        assert_eq!(engine.swarm().peers()[1].completed_count(), 1);
        assert_eq!(engine.swarm().peers()[1].finish_round(), Some(1));
    }

    #[test]
    fn test_transmit_limit_caps_transfers_per_round() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut engine = ExchangeEngine::new(pair(10), 3);

        let summary = engine.step(&mut rng);
        assert_eq!(summary.work_items, 3);
        assert_eq!(summary.transfers, 3);
        assert_eq!(engine.swarm().peers()[1].completed_count(), 3);

        // 10 pieces at 3 per round: rounds 2, 3 and 4 finish the job
        for _ in 0..3 {
            engine.step(&mut rng);
        }
        assert!(engine.swarm().is_converged());
        assert_eq!(engine.swarm().peers()[1].finish_round(), Some(4));
    }

    #[test]
    fn test_uploader_quota_is_shared_between_downloaders() {
        // Star around the seed: four leaves compete for the seed's upload quota
        let mut swarm = Swarm::new(5, 4);
        for leaf in 1..5 {
            swarm.connect(0, leaf);
        }
        swarm.seed(0).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut engine = ExchangeEngine::new(swarm, 2);
        let summary = engine.step(&mut rng);

        assert_eq!(summary.work_items, 8);
        assert_eq!(summary.transfers, 2);
    }

    #[test]
    fn test_counters_stay_within_quota_and_reset() {
        let mut swarm = Swarm::new(6, 20);
        for (a, b) in [(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0), (0, 3)] {
            swarm.connect(a, b);
        }
        swarm.seed(0).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut engine = ExchangeEngine::new(swarm, 2);
        while !engine.swarm().is_converged() {
            engine.step_with(&mut rng, |swarm| {
                for peer in swarm.peers() {
                    assert!(peer.uploaded_this_round() <= 2);
                    assert!(peer.downloaded_this_round() <= 2);
                }
            });
            for peer in engine.swarm().peers() {
                assert_eq!(peer.uploaded_this_round(), 0);
                assert_eq!(peer.downloaded_this_round(), 0);
            }
            assert!(engine.round() < 200);
        }
        assert!(engine.swarm().check_invariants().is_ok());
    }

    #[test]
    fn test_complete_swarm_has_empty_plan() {
        let mut swarm = Swarm::new(1, 4);
        swarm.seed(0).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut engine = ExchangeEngine::new(swarm, 10);
        let summary = engine.step(&mut rng);
        assert_eq!(summary.work_items, 0);
        assert_eq!(summary.transfers, 0);
    }

    #[test]
    fn test_isolated_peer_is_a_no_op() {
        let mut swarm = Swarm::new(2, 3);
        swarm.seed(0).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut engine = ExchangeEngine::new(swarm, 1);
        let summary = engine.step(&mut rng);
        assert_eq!(summary.work_items, 1);
        assert_eq!(summary.transfers, 0);
        assert_eq!(engine.swarm().peers()[1].completed_count(), 0);
    }
}
