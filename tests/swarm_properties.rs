#[cfg(test)]
mod swarm_properties {
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use swarmsim::config::Config;
    use swarmsim::driver::{build_swarm, run_simulation, run_to_completion};
    use swarmsim::engine::ExchangeEngine;
    use swarmsim::swarm::Swarm;
    use swarmsim::topology::{
        BuildTopology, FixedDegreeRandom, GreedyBoundedRandom, TopologyError, TopologyStrategy,
    };

    fn config(
        peers: usize,
        pieces: usize,
        limit: usize,
        max_rounds: u32,
        topology: TopologyStrategy,
    ) -> Config {
        let mut config = Config::default();
        config.swarm.peer_count = peers;
        config.swarm.piece_count = pieces;
        config.swarm.transmit_limit = limit;
        config.general.max_rounds = max_rounds;
        config.topology = topology;
        config
    }

    fn assert_symmetric(swarm: &Swarm) {
        for a in swarm.peers() {
            assert!(!a.is_neighbor(a.id()), "peer {} is its own neighbor", a.id());
            for b in swarm.peers() {
                assert_eq!(
                    a.is_neighbor(b.id()),
                    b.is_neighbor(a.id()),
                    "asymmetric edge between {} and {}",
                    a.id(),
                    b.id()
                );
            }
        }
    }

    /// Two peers, one piece, a single edge: done after exactly one round
    #[test]
    fn test_minimal_convergence_fixed_degree() {
        let config = config(
            2,
            1,
            1,
            1000,
            TopologyStrategy::FixedDegreeRandom(FixedDegreeRandom { degree: 1 }),
        );
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let report = run_simulation(&config, &mut rng).unwrap();

        assert!(report.converged);
        assert_eq!(report.total_rounds, 1);
        assert_eq!(report.peers[1].completed_pieces, 1);
    }

    #[test]
    fn test_minimal_convergence_greedy_pair() {
        let config = config(
            2,
            1,
            1,
            1000,
            TopologyStrategy::GreedyBoundedRandom(GreedyBoundedRandom {
                soft_limit: 1,
                max_limit: 1,
                failure_budget: 1,
            }),
        );
        let mut rng = ChaCha8Rng::seed_from_u64(2025);
        let report = run_simulation(&config, &mut rng).unwrap();

        assert!(report.converged);
        assert_eq!(report.total_rounds, 1);
    }

    #[test]
    fn test_lone_seed_converges_without_rounds() {
        let config = config(1, 10, 3, 1000, TopologyStrategy::default());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let report = run_simulation(&config, &mut rng).unwrap();

        assert!(report.converged);
        assert_eq!(report.total_rounds, 0);
        assert_eq!(report.total_transfers, 0);
    }

    #[test]
    fn test_degree_equal_to_peer_count_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = FixedDegreeRandom { degree: 5 }.build(5, 1, &mut rng).unwrap_err();
        assert!(matches!(err, TopologyError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_unreachable_pair_never_completes() {
        // A degree-1 regular graph on four peers is always two disjoint pairs
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut swarm = FixedDegreeRandom { degree: 1 }.build(4, 2, &mut rng).unwrap();
        swarm.seed(0).unwrap();
        let partner = *swarm.peers()[0].neighbors().iter().next().unwrap();

        let outcome = run_to_completion(swarm, 1, 50, &mut rng);
        assert!(!outcome.converged);
        assert_eq!(outcome.total_rounds, 51);
        for peer in outcome.swarm.peers() {
            if peer.id() == 0 || peer.id() == partner {
                assert!(peer.is_complete());
            } else {
                assert_eq!(peer.completed_count(), 0);
                assert_eq!(peer.finish_round(), None);
            }
        }
    }

    #[test]
    fn test_reference_parameters_converge_quickly() {
        // Scaled-down version of the reference scenario: 500 peers, 25 pieces
        let config = config(500, 25, 10, 1000, TopologyStrategy::default());
        let mut rng = ChaCha8Rng::seed_from_u64(5000);
        let report = run_simulation(&config, &mut rng).unwrap();

        assert!(report.converged);
        assert!(report.total_rounds < 100);
        assert_eq!(report.completion.complete_peers, 500);
        assert_eq!(report.completion.p100_finish_round, Some(report.total_rounds));
    }

    fn strategy() -> impl Strategy<Value = TopologyStrategy> {
        prop_oneof![
            (1usize..6, 0usize..10, 1usize..20).prop_map(|(soft, extra, budget)| {
                TopologyStrategy::GreedyBoundedRandom(GreedyBoundedRandom {
                    soft_limit: soft,
                    max_limit: soft + extra,
                    failure_budget: budget,
                })
            }),
            (1usize..6).prop_map(|half| {
                TopologyStrategy::FixedDegreeRandom(FixedDegreeRandom { degree: half * 2 })
            }),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_topology_is_symmetric_and_bounded(
            topology in strategy(),
            peers in 13usize..60,
            seed in any::<u64>(),
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let swarm = topology.build(peers, 1, &mut rng).unwrap();

            prop_assert!(swarm.check_invariants().is_ok());
            assert_symmetric(&swarm);
            for peer in swarm.peers() {
                match &topology {
                    TopologyStrategy::FixedDegreeRandom(s) => prop_assert_eq!(peer.degree(), s.degree),
                    TopologyStrategy::GreedyBoundedRandom(s) => prop_assert!(peer.degree() <= s.max_limit),
                }
            }
        }

        #[test]
        fn prop_rounds_preserve_invariants(
            topology in strategy(),
            peers in 13usize..40,
            pieces in 1usize..12,
            limit in 1usize..5,
            seed_peer in 0usize..13,
            seed in any::<u64>(),
        ) {
            let mut config = config(peers, pieces, limit, 1000, topology);
            config.swarm.seed_peer = seed_peer;
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let swarm = build_swarm(&config, &mut rng).unwrap();

            for peer in swarm.peers() {
                let expected = if peer.id() == seed_peer { pieces } else { 0 };
                prop_assert_eq!(peer.completed_count(), expected);
            }

            let mut engine = ExchangeEngine::new(swarm, limit);
            for _ in 0..30 {
                let before: Vec<usize> =
                    engine.swarm().peers().iter().map(|p| p.completed_count()).collect();

                engine.step_with(&mut rng, |swarm| {
                    for peer in swarm.peers() {
                        assert!(peer.uploaded_this_round() <= limit);
                        assert!(peer.downloaded_this_round() <= limit);
                    }
                });

                let swarm = engine.swarm();
                prop_assert!(swarm.check_invariants().is_ok());
                for (peer, old) in swarm.peers().iter().zip(before) {
                    prop_assert!(peer.completed_count() >= old);
                    prop_assert_eq!(peer.uploaded_this_round(), 0);
                    prop_assert_eq!(peer.downloaded_this_round(), 0);
                    if peer.is_complete() {
                        prop_assert!(peer.finish_round().is_some());
                    }
                }
                if swarm.is_converged() {
                    break;
                }
            }
        }
    }
}
