//! # SwarmSim - Piece dissemination simulator for peer-to-peer swarms
//!
//! This library simulates, in discrete rounds, how a fixed set of equally
//! sized pieces spreads from a single seed peer through a swarm, so that
//! topology and bandwidth-quota policies can be compared before they are
//! deployed on a real content-distribution network.
//!
//! ## Overview
//!
//! A run builds a swarm topology, seeds one peer with every piece, and then
//! repeats exchange rounds until every peer owns every piece or a round cap
//! is reached. In each round a peer may download at most `transmit_limit`
//! pieces and upload at most `transmit_limit` pieces; who fetches from whom
//! is decided by a shuffled plan and uniformly random candidate selection.
//!
//! ## Architecture
//!
//! - `swarm`: peer state and the peer arena with its neighbor relation
//! - `topology`: greedy bounded-random and fixed-degree random construction
//! - `engine`: the round-based piece exchange
//! - `driver`: wires configuration, topology and engine into a run
//! - `report`: per-peer and aggregate results, text and JSON output
//! - `sweep`: parallel runs over consecutive random seeds
//! - `config` / `config_loader`: YAML configuration and CLI overrides
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use std::path::Path;
//! use swarmsim::{config_loader, driver};
//!
//! let config = config_loader::load_config(Path::new("swarm.yaml"))?;
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let report = driver::run_simulation(&config, &mut rng)?;
//! println!("converged: {} after {} rounds", report.converged, report.total_rounds);
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Configuration Format
//!
//! ```yaml
//! general:
//!   max_rounds: 1000
//!   rng_seed: 42
//! swarm:
//!   peer_count: 5000
//!   piece_count: 125
//!   transmit_limit: 10
//!   seed_peer: 0
//! topology:
//!   strategy: greedy_bounded_random   # or fixed_degree_random with `degree`
//!   soft_limit: 5
//!   max_limit: 20
//!   failure_budget: 50
//! ```
//!
//! ## Reproducibility
//!
//! The simulation never seeds itself. Every function that needs randomness
//! takes the random source as an argument; pass a seeded RNG to get
//! identical runs.
//!
//! ## Error Handling
//!
//! Module seams use typed `thiserror` errors (`ValidationError`,
//! `TopologyError`); orchestration functions return
//! `Result<T, color_eyre::eyre::Error>`. A run that hits the round cap is
//! not an error: it is reported with `converged == false`.

pub mod config;
pub mod config_loader;
pub mod swarm;
pub mod topology;
pub mod engine;
pub mod driver;
pub mod report;
pub mod sweep;
pub mod utils;
