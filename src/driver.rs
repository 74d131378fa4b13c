//! Simulation driver.
//!
//! Wires a configuration into a topology build, designates the seed peer and
//! drives the exchange engine until every peer is complete or the round
//! counter exceeds the cap. Hitting the cap is a normal, reported outcome.

use color_eyre::Result;
use log::{debug, info, warn};
use rand::Rng;

use crate::config::Config;
use crate::engine::ExchangeEngine;
use crate::report::{collect_peer_outcomes, CompletionStats, RunMetadata, SimulationReport};
use crate::swarm::Swarm;
use crate::topology::{log_topology, summarize_topology, BuildTopology};

/// Result of driving an engine to termination
#[derive(Debug)]
pub struct RunOutcome {
    pub swarm: Swarm,
    pub total_rounds: u32,
    pub total_transfers: usize,
    pub converged: bool,
}

/// Build the configured topology and seed it, ready for the first round
pub fn build_swarm<R: Rng + ?Sized>(config: &Config, rng: &mut R) -> Result<Swarm> {
    let mut swarm = config
        .topology
        .build(config.swarm.peer_count, config.swarm.piece_count, rng)?;
    swarm.seed(config.swarm.seed_peer)?;
    swarm.check_invariants()?;
    Ok(swarm)
}

/// Run rounds until the swarm converges or the round counter exceeds `max_rounds`.
///
/// A swarm that never converges runs `max_rounds + 1` rounds; one that is
/// already converged runs none.
pub fn run_to_completion<R: Rng + ?Sized>(
    swarm: Swarm,
    transmit_limit: usize,
    max_rounds: u32,
    rng: &mut R,
) -> RunOutcome {
    let mut engine = ExchangeEngine::new(swarm, transmit_limit);
    let mut total_transfers = 0;
    let mut converged = engine.swarm().is_converged();

    while !converged && engine.round() <= max_rounds {
        let summary = engine.step(rng);
        total_transfers += summary.transfers;
        debug!(
            "Round {}: {} work items, {} transfers, {} peers finished, {}/{} complete",
            summary.round,
            summary.work_items,
            summary.transfers,
            summary.newly_completed.len(),
            engine.swarm().complete_count(),
            engine.swarm().len()
        );
        converged = engine.swarm().is_converged();
    }

    let total_rounds = engine.round();
    if converged {
        info!("Done. Total rounds: {}", total_rounds);
    } else {
        warn!(
            "Round cap of {} exceeded after {} rounds with {} of {} peers incomplete",
            max_rounds,
            total_rounds,
            engine.swarm().len() - engine.swarm().complete_count(),
            engine.swarm().len()
        );
    }

    RunOutcome {
        swarm: engine.into_swarm(),
        total_rounds,
        total_transfers,
        converged,
    }
}

/// Warn when the topology's degree limit cannot be met by the population
pub(crate) fn warn_if_saturating(config: &Config) {
    if config.degree_saturates() {
        warn!(
            "Topology degree limit {} is not below peer count {}; peers will saturate early",
            config.topology.max_degree(),
            config.swarm.peer_count
        );
    }
}

/// Run one full simulation described by `config`, drawing all randomness from `rng`
pub fn run_simulation<R: Rng + ?Sized>(config: &Config, rng: &mut R) -> Result<SimulationReport> {
    config.validate()?;
    warn_if_saturating(config);
    simulate(config, rng)
}

/// Run a simulation from an already validated configuration
pub(crate) fn simulate<R: Rng + ?Sized>(config: &Config, rng: &mut R) -> Result<SimulationReport> {
    info!(
        "Simulating {} peers, {} pieces, transmit limit {}, {} topology",
        config.swarm.peer_count,
        config.swarm.piece_count,
        config.swarm.transmit_limit,
        config.topology.name()
    );

    let swarm = build_swarm(config, rng)?;
    let topology = summarize_topology(&swarm, &config.topology);
    log_topology(&swarm, &topology);

    let outcome = run_to_completion(
        swarm,
        config.swarm.transmit_limit,
        config.general.max_rounds,
        rng,
    );

    let peers = collect_peer_outcomes(&outcome.swarm);
    let completion = CompletionStats::from_peers(&peers, config.swarm.seed_peer);

    Ok(SimulationReport {
        metadata: RunMetadata::from_config(config),
        topology,
        converged: outcome.converged,
        total_rounds: outcome.total_rounds,
        total_transfers: outcome.total_transfers,
        completion,
        peers,
    })
}
