//! Seed sweeps: many independent runs of one configuration.
//!
//! A single run is strictly sequential, but separate runs share nothing, so
//! they are spread across the rayon thread pool. Run `i` uses
//! `base_seed + i` as its random seed, which keeps a sweep reproducible
//! regardless of scheduling.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::driver::{simulate, warn_if_saturating};
use crate::report::RunMetadata;
use crate::utils::stats::{mean, percentile};

/// Outcome of one run in a sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRun {
    pub run: usize,
    pub rng_seed: u64,
    pub converged: bool,
    pub total_rounds: u32,
    pub p50_finish_round: Option<u32>,
    pub p100_finish_round: Option<u32>,
}

/// Aggregate over all runs of a sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub metadata: RunMetadata,
    pub base_seed: u64,
    pub runs: Vec<SweepRun>,
    pub converged_runs: usize,
    /// Total-round statistics over converged runs
    pub p50_total_rounds: Option<u32>,
    pub p100_total_rounds: Option<u32>,
    pub mean_total_rounds: Option<f64>,
}

/// Execute `runs` independent simulations of `config` in parallel
pub fn run_sweep(config: &Config, runs: usize, base_seed: u64) -> Result<SweepReport> {
    config.validate()?;
    warn_if_saturating(config);
    info!("Starting sweep of {} runs from base seed {}", runs, base_seed);

    let results: Vec<SweepRun> = (0..runs)
        .into_par_iter()
        .map(|run| -> Result<SweepRun> {
            let rng_seed = base_seed.wrapping_add(run as u64);
            let mut run_config = config.clone();
            run_config.general.rng_seed = Some(rng_seed);

            let mut rng = ChaCha8Rng::seed_from_u64(rng_seed);
            let report = simulate(&run_config, &mut rng)
                .wrap_err_with(|| format!("Sweep run {} (seed {}) failed", run, rng_seed))?;

            Ok(SweepRun {
                run,
                rng_seed,
                converged: report.converged,
                total_rounds: report.total_rounds,
                p50_finish_round: report.completion.p50_finish_round,
                p100_finish_round: report.completion.p100_finish_round,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let converged_rounds: Vec<u32> = results
        .iter()
        .filter(|r| r.converged)
        .map(|r| r.total_rounds)
        .collect();

    info!(
        "Sweep finished: {} of {} runs converged",
        converged_rounds.len(),
        results.len()
    );

    let mut metadata = RunMetadata::from_config(config);
    metadata.rng_seed = Some(base_seed);

    Ok(SweepReport {
        metadata,
        base_seed,
        converged_runs: converged_rounds.len(),
        p50_total_rounds: percentile(&converged_rounds, 50.0),
        p100_total_rounds: percentile(&converged_rounds, 100.0),
        mean_total_rounds: mean(&converged_rounds),
        runs: results,
    })
}

/// Render a sweep as text
pub fn render_sweep_report(report: &SweepReport) -> String {
    let dash = |r: Option<u32>| r.map_or_else(|| "-".to_string(), |r| r.to_string());
    let mut lines: Vec<String> = Vec::new();

    lines.push("=".repeat(80));
    lines.push("                            SWARMSIM SEED SWEEP".to_string());
    lines.push("=".repeat(80));
    lines.push(String::new());
    lines.push(format!(
        "Peers: {}, pieces: {}, transmit limit: {}, strategy: {}",
        report.metadata.peer_count,
        report.metadata.piece_count,
        report.metadata.transmit_limit,
        report.metadata.strategy
    ));
    lines.push(format!("Base seed: {}", report.base_seed));
    lines.push(format!(
        "Converged runs: {}/{}",
        report.converged_runs,
        report.runs.len()
    ));
    lines.push(format!(
        "Total rounds p50/p100: {}/{}",
        dash(report.p50_total_rounds),
        dash(report.p100_total_rounds)
    ));
    if let Some(mean) = report.mean_total_rounds {
        lines.push(format!("Mean total rounds: {:.1}", mean));
    }
    lines.push(String::new());

    lines.push("Run   Seed                  Converged  Rounds  p50  p100".to_string());
    for run in &report.runs {
        lines.push(format!(
            "{:<5} {:<21} {:<10} {:>6}  {:>3}  {:>4}",
            run.run,
            run.rng_seed,
            run.converged,
            run.total_rounds,
            dash(run.p50_finish_round),
            dash(run.p100_finish_round)
        ));
    }
    lines.push(String::new());
    lines.push("=".repeat(80));

    lines.join("\n")
}

/// Write the sweep as JSON
pub fn generate_sweep_json(report: &SweepReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .wrap_err("Failed to serialize sweep report to JSON")?;
    fs::write(output_path, json)
        .wrap_err_with(|| format!("Failed to write sweep report to {}", output_path.display()))?;

    info!("Sweep report written to {}", output_path.display());
    Ok(())
}
