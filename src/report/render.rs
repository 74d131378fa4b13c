//! Report generation for simulation runs.
//!
//! Generates both JSON and human-readable text reports.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};

use super::types::SimulationReport;

/// Generate JSON report
pub fn generate_json_report(report: &SimulationReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize report to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))?;

    log::info!("JSON report written to {}", output_path.display());
    Ok(())
}

/// Generate human-readable text report
pub fn generate_text_report(report: &SimulationReport, output_path: &Path) -> Result<()> {
    fs::write(output_path, render_text_report(report))
        .with_context(|| format!("Failed to write text report to {}", output_path.display()))?;

    log::info!("Text report written to {}", output_path.display());
    Ok(())
}

fn round_or_dash(round: Option<u32>) -> String {
    round.map_or_else(|| "-".to_string(), |r| r.to_string())
}

/// Render the text report
pub fn render_text_report(report: &SimulationReport) -> String {
    let mut lines: Vec<String> = Vec::new();
    let meta = &report.metadata;

    // Header
    lines.push("=".repeat(80));
    lines.push("                      SWARMSIM PIECE DISSEMINATION REPORT".to_string());
    lines.push("=".repeat(80));
    lines.push(String::new());

    lines.push(format!("Generated: {}", meta.generated_at));
    lines.push(format!("Peers: {}", meta.peer_count));
    lines.push(format!("Pieces: {}", meta.piece_count));
    lines.push(format!("Transmit limit: {} pieces/round", meta.transmit_limit));
    lines.push(format!("Seed peer: {}", meta.seed_peer));
    lines.push(format!("Round cap: {}", meta.max_rounds));
    lines.push(format!(
        "Random seed: {}",
        meta.rng_seed.map_or_else(|| "entropy".to_string(), |s| s.to_string())
    ));
    lines.push(String::new());

    // Topology
    let topo = &report.topology;
    lines.push("=".repeat(80));
    lines.push("                               TOPOLOGY".to_string());
    lines.push("=".repeat(80));
    lines.push(String::new());
    lines.push(format!("Strategy: {}", topo.strategy));
    lines.push(format!("Edges: {}", topo.edge_count));
    lines.push(format!(
        "Degree: min {}, mean {:.2}, max {}",
        topo.min_degree, topo.mean_degree, topo.max_degree
    ));
    if topo.total_failed_connection_attempts > 0 {
        lines.push(format!(
            "Failed connection attempts: {}",
            topo.total_failed_connection_attempts
        ));
    }
    if !topo.peers_below_soft_limit.is_empty() {
        lines.push(format!(
            "Peers below soft limit: {}",
            topo.peers_below_soft_limit.len()
        ));
    }
    if !topo.isolated_peers.is_empty() {
        let ids: Vec<String> = topo.isolated_peers.iter().map(|id| id.to_string()).collect();
        lines.push(format!("Isolated peers: {}", ids.join(", ")));
    }
    lines.push(String::new());

    // Completion
    let completion = &report.completion;
    lines.push("=".repeat(80));
    lines.push("                              COMPLETION".to_string());
    lines.push("=".repeat(80));
    lines.push(String::new());
    if report.converged {
        lines.push(format!("Converged after {} rounds", report.total_rounds));
    } else {
        lines.push(format!(
            "NOT CONVERGED: {} peers incomplete after {} rounds",
            completion.incomplete_peers, report.total_rounds
        ));
    }
    lines.push(format!("Pieces transferred: {}", report.total_transfers));
    lines.push(format!(
        "Finish round p50/p90/p100: {}/{}/{}",
        round_or_dash(completion.p50_finish_round),
        round_or_dash(completion.p90_finish_round),
        round_or_dash(completion.p100_finish_round)
    ));
    if let Some(mean) = completion.mean_finish_round {
        lines.push(format!("Mean finish round: {:.1}", mean));
    }
    lines.push(String::new());

    // Per-peer table
    lines.push("Peer      Degree  Failed  Pieces  Finish".to_string());
    for peer in &report.peers {
        lines.push(format!(
            "{:<9} {:>6}  {:>6}  {:>6}  {:>6}",
            peer.id,
            peer.degree,
            peer.failed_connection_attempts,
            peer.completed_pieces,
            round_or_dash(peer.finish_round)
        ));
    }
    lines.push(String::new());

    // Footer
    lines.push("=".repeat(80));

    lines.join("\n")
}

/// Print a summary to stdout
pub fn print_summary(report: &SimulationReport) {
    println!("\n=== SWARMSIM SUMMARY ===\n");
    println!("Peers: {}", report.metadata.peer_count);
    println!("Pieces: {}", report.metadata.piece_count);
    println!("Strategy: {}", report.topology.strategy);
    println!("Converged: {}", report.converged);
    println!("Total rounds: {}", report.total_rounds);
    println!(
        "Finish round p50/p100: {}/{}",
        round_or_dash(report.completion.p50_finish_round),
        round_or_dash(report.completion.p100_finish_round)
    );
    println!();
}
