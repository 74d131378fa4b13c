use crate::config::Config;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::Path;

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration '{}'", config_path.display()))?;

    let config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration '{}'", config_path.display()))?;

    config.validate()?;

    Ok(config)
}

/// Command-line values that override the loaded configuration
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub peers: Option<usize>,
    pub pieces: Option<usize>,
    pub transmit_limit: Option<usize>,
    pub seed_peer: Option<usize>,
    pub max_rounds: Option<u32>,
    pub rng_seed: Option<u64>,
}

/// Apply CLI overrides to a configuration
pub fn apply_cli_overrides(config: &mut Config, overrides: &CliOverrides) -> Result<()> {
    if let Some(peers) = overrides.peers {
        info!("Overriding peer count: {}", peers);
        config.swarm.peer_count = peers;
    }
    if let Some(pieces) = overrides.pieces {
        info!("Overriding piece count: {}", pieces);
        config.swarm.piece_count = pieces;
    }
    if let Some(limit) = overrides.transmit_limit {
        info!("Overriding transmit limit: {}", limit);
        config.swarm.transmit_limit = limit;
    }
    if let Some(seed_peer) = overrides.seed_peer {
        config.swarm.seed_peer = seed_peer;
    }
    if let Some(max_rounds) = overrides.max_rounds {
        config.general.max_rounds = max_rounds;
    }
    if let Some(rng_seed) = overrides.rng_seed {
        info!("Using random seed {}", rng_seed);
        config.general.rng_seed = Some(rng_seed);
    }

    // Re-validate after applying overrides
    config.validate()?;

    Ok(())
}
