//! optgail: evaluation and replay tooling for option-based imitation learning.
//!
//! Subcommands:
//!
//! - `render`  -- replay a trained checkpoint, rendering rollouts forever
//! - `stats`   -- collect a batch of rollouts and report reward statistics
//! - `inspect` -- print a summary of a checkpoint and its companion config

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use optgail::checkpoint::Checkpoint;
use optgail::config::Config;
use optgail::env::{AnyEnv, Environment};
use optgail::eval::reward_validate;
use optgail::policy::StateFilter;
use optgail::render::display_model;
use optgail::trajectory::{CollectSpec, TrajectoryCollector};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Evaluation and replay tooling for option-based imitation learning.
#[derive(Parser)]
#[command(name = "optgail", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a trained checkpoint, rendering rollouts until interrupted.
    Render {
        /// Path to the checkpoint file.
        model_path: PathBuf,

        /// Path to the companion config (defaults to a sibling `config.log`).
        config_path: Option<PathBuf>,
    },

    /// Collect a batch of exploratory rollouts and report reward statistics.
    Stats {
        /// Path to the checkpoint file.
        #[arg(long)]
        model: PathBuf,

        /// Path to the companion config (defaults to a sibling `config.log`).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of episodes to collect.
        #[arg(long, default_value_t = 8)]
        episodes: usize,
    },

    /// Print a summary of a checkpoint and its companion config.
    Inspect {
        /// Path to the checkpoint file.
        model_path: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Entrypoint
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // Initialise tracing (reads RUST_LOG env var, defaults to info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            model_path,
            config_path,
        } => display_model(&model_path, config_path.as_deref()),
        Commands::Stats {
            model,
            config,
            episodes,
        } => cmd_stats(&model, config.as_deref(), episodes),
        Commands::Inspect { model_path } => cmd_inspect(&model_path),
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn sibling_config(model_path: &std::path::Path) -> PathBuf {
    model_path
        .parent()
        .unwrap_or_else(|| std::path::Path::new("."))
        .join("config.log")
}

fn load_run(
    model_path: &std::path::Path,
    config_path: Option<&std::path::Path>,
) -> Result<(Config, Checkpoint)> {
    let config_path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(|| sibling_config(model_path));
    let config = Config::load_saved(&config_path)?;
    let checkpoint = Checkpoint::load(model_path)?;
    Ok((config, checkpoint))
}

fn cmd_stats(
    model_path: &std::path::Path,
    config_path: Option<&std::path::Path>,
    episodes: usize,
) -> Result<()> {
    let (config, checkpoint) = load_run(model_path, config_path)?;

    let mut env = AnyEnv::from_config(&config, false);
    let (dim_s, dim_a) = env.state_action_size();
    let policy = checkpoint
        .load_policy(&config, dim_s, dim_a)
        .context("Failed to reconstruct policy from checkpoint")?;

    let mut filter = StateFilter::new(config.use_state_filter);
    filter.load_state(checkpoint.filter.clone());
    filter.enable = config.use_state_filter;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let (stats, option_seqs) = reward_validate(
        &TrajectoryCollector::new(),
        &mut env,
        &policy,
        &mut filter,
        CollectSpec::Episodes(episodes),
        false,
        &mut rng,
    )?;

    println!("{stats}");
    if let Some(seqs) = option_seqs {
        println!("Option sequences (best return first):");
        for (rank, seq) in seqs.iter().enumerate() {
            let preview: Vec<String> = seq.iter().take(20).map(|c| c.to_string()).collect();
            let suffix = if seq.len() > 20 { " ..." } else { "" };
            println!("  #{rank}: [{}]{suffix}", preview.join(", "));
        }
    }
    Ok(())
}

fn cmd_inspect(model_path: &std::path::Path) -> Result<()> {
    let (config, checkpoint) = load_run(model_path, None)?;

    println!("Checkpoint: {}", model_path.display());
    println!("  env: {} ({})", config.env_name, config.env_type);
    println!("  hierarchical: {}", config.use_option);
    if config.use_option {
        println!("  dim_c: {}", config.dim_c);
    }
    println!("  state filter: {}", config.use_state_filter);
    println!("  filter observations: {}", checkpoint.filter.count());
    println!("  seed: {}", config.seed);

    let env = AnyEnv::from_config(&config, false);
    let (dim_s, dim_a) = env.state_action_size();
    match checkpoint.load_policy(&config, dim_s, dim_a) {
        Ok(policy) => {
            let (ps, pa) = policy.dims();
            println!("  policy dims: state {ps}, action {pa}");
        }
        Err(err) => println!("  policy: failed to load ({err})"),
    }
    Ok(())
}
