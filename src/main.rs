use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use swarmsim::config::Config;
use swarmsim::config_loader::{self, CliOverrides};
use swarmsim::driver::run_simulation;
use swarmsim::report;
use swarmsim::sweep::{generate_sweep_json, render_sweep_report, run_sweep};

/// Round-based piece dissemination simulator for peer-to-peer swarms
#[derive(Parser, Debug)]
#[command(name = "swarmsim", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the simulation configuration YAML file (built-in defaults if omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Override the number of peers
    #[arg(long, global = true)]
    peers: Option<usize>,

    /// Override the number of pieces
    #[arg(long, global = true)]
    pieces: Option<usize>,

    /// Override the per-round transmit limit
    #[arg(long, global = true)]
    transmit_limit: Option<usize>,

    /// Override the seed peer index
    #[arg(long, global = true)]
    seed_peer: Option<usize>,

    /// Override the round cap
    #[arg(long, global = true)]
    max_rounds: Option<u32>,

    /// Seed for the random source
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single simulation
    Run {
        /// Write the report to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report format
        #[arg(long, value_enum, default_value = "text")]
        format: ReportFormat,
    },

    /// Run many independently seeded simulations in parallel
    Sweep {
        /// Number of runs
        #[arg(short = 'n', long, default_value = "10")]
        runs: usize,

        /// Number of parallel workers (0 = auto-detect)
        #[arg(short = 'j', long, default_value = "0")]
        threads: usize,

        /// Write the report to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report format
        #[arg(long, value_enum, default_value = "text")]
        format: ReportFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            peers: self.peers,
            pieces: self.pieces,
            transmit_limit: self.transmit_limit,
            seed_peer: self.seed_peer,
            max_rounds: self.max_rounds,
            rng_seed: self.seed,
        }
    }
}

fn load(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => config_loader::load_config(path)?,
        None => {
            info!("No configuration file given, using built-in defaults");
            Config::default()
        }
    };
    config_loader::apply_cli_overrides(&mut config, &cli.overrides())?;
    Ok(config)
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)
                .wrap_err_with(|| format!("Failed to write report to '{}'", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level)).init();

    let mut config = load(&cli)?;

    // The binary is the caller that owns seeding: pick one and record it so
    // the run can be replayed.
    let seed = config.general.rng_seed.unwrap_or_else(rand::random);
    config.general.rng_seed = Some(seed);
    info!("Random seed: {}", seed);

    match &cli.command {
        Commands::Run { output, format } => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let report = run_simulation(&config, &mut rng)?;

            match (format, output) {
                (ReportFormat::Json, Some(path)) => {
                    report::generate_json_report(&report, path)?;
                    report::print_summary(&report);
                }
                (ReportFormat::Text, Some(path)) => {
                    report::generate_text_report(&report, path)?;
                    report::print_summary(&report);
                }
                (ReportFormat::Json, None) => {
                    let json = serde_json::to_string_pretty(&report)
                        .wrap_err("Failed to serialize report to JSON")?;
                    write_output(None, &json)?;
                }
                (ReportFormat::Text, None) => {
                    write_output(None, &report::render_text_report(&report))?;
                }
            }
        }
        Commands::Sweep { runs, threads, output, format } => {
            if *threads > 0 {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(*threads)
                    .build_global()
                    .wrap_err("Failed to configure thread pool")?;
            }

            let report = run_sweep(&config, *runs, seed)?;
            match (format, output) {
                (ReportFormat::Json, Some(path)) => generate_sweep_json(&report, path)?,
                (ReportFormat::Json, None) => {
                    let json = serde_json::to_string_pretty(&report)
                        .wrap_err("Failed to serialize sweep report to JSON")?;
                    write_output(None, &json)?;
                }
                (ReportFormat::Text, output) => {
                    write_output(output.as_deref(), &render_sweep_report(&report))?
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["swarmsim", "run", "--config", "swarm.yaml"]);

        assert_eq!(cli.config, Some(PathBuf::from("swarm.yaml")));
        assert_eq!(cli.log_level, "info");
        match cli.command {
            Commands::Run { output, format } => {
                assert_eq!(output, None);
                assert_eq!(format, ReportFormat::Text);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_sweep_args() {
        let cli = Cli::parse_from([
            "swarmsim", "sweep", "-n", "25", "-j", "4", "--seed", "7", "--peers", "1000",
            "--format", "json",
        ]);

        assert_eq!(cli.seed, Some(7));
        assert_eq!(cli.peers, Some(1000));
        match cli.command {
            Commands::Sweep { runs, threads, format, .. } => {
                assert_eq!(runs, 25);
                assert_eq!(threads, 4);
                assert_eq!(format, ReportFormat::Json);
            }
            _ => panic!("expected sweep"),
        }
    }

    #[test]
    fn test_defaults_with_overrides() {
        let cli = Cli::parse_from([
            "swarmsim", "run", "--peers", "50", "--pieces", "5", "--max-rounds", "20",
        ]);
        let config = load(&cli).unwrap();
        assert_eq!(config.swarm.peer_count, 50);
        assert_eq!(config.swarm.piece_count, 5);
        assert_eq!(config.general.max_rounds, 20);
        assert_eq!(config.swarm.transmit_limit, 10);
    }
}
