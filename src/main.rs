mod brain;
mod config;
mod evolution;
mod grid;
mod replay;
mod snake;
mod stats;
mod training;

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::EvolutionConfig;
use crate::training::TrainOptions;

#[derive(Parser, Debug)]
#[command(author, version, about = "genetic snake foragers", long_about = None)]
struct Cli {
    /// json file overriding the default evolution settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// fixed rng seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// evolve a population from scratch
    Train {
        /// how many generations to run
        #[arg(short, long, default_value_t = 500)]
        generations: u32,

        /// where session logs and genome dumps go
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// where best-brain weight files go
        #[arg(long, default_value = "checkpoints")]
        checkpoint_dir: PathBuf,

        /// also write every agent's weights each generation
        #[arg(long)]
        dump_genomes: bool,
    },
    /// play a saved brain without evolving it
    Replay {
        /// weight file produced by a training run
        weights: PathBuf,

        /// episodes to play before exiting
        #[arg(short, long, default_value_t = 10)]
        episodes: u32,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut config: EvolutionConfig = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => EvolutionConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    match cli.command {
        Command::Train {
            generations,
            data_dir,
            checkpoint_dir,
            dump_genomes,
        } => training::run_training(
            config,
            &TrainOptions {
                generations,
                data_dir,
                checkpoint_dir,
                dump_genomes,
            },
        ),
        Command::Replay { weights, episodes } => replay::run_replay(&config, &weights, episodes),
    }
}
