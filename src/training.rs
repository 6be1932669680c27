use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Local;
use tracing::info;

use crate::config::EvolutionConfig;
use crate::evolution::Population;
use crate::stats::StatsLog;

pub struct TrainOptions {
    pub generations: u32,
    /// session logs and genome dumps land here
    pub data_dir: PathBuf,
    /// best-brain weight files land here
    pub checkpoint_dir: PathBuf,
    /// also write every agent's weights each generation
    pub dump_genomes: bool,
}

/// Runs the full training loop: simulate each generation to extinction,
/// evolve, log a summary row and checkpoint the winner when warranted.
pub fn run_training(config: EvolutionConfig, opts: &TrainOptions) -> anyhow::Result<()> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let session_dir = opts.data_dir.join(format!("session_{timestamp}"));
    fs::create_dir_all(&session_dir)
        .with_context(|| format!("creating session dir {}", session_dir.display()))?;
    fs::create_dir_all(&opts.checkpoint_dir)
        .with_context(|| format!("creating checkpoint dir {}", opts.checkpoint_dir.display()))?;

    let mut stats_log = StatsLog::create(&session_dir.join("stats.csv"))?;
    let mut population = Population::new(config.clone())?;

    info!(
        population = config.population_size,
        generations = opts.generations,
        "training started"
    );

    for _ in 0..opts.generations {
        while !population.is_extinct() {
            population.step_all()?;
        }

        if opts.dump_genomes {
            dump_generation(&population, &session_dir)?;
        }

        let report = population.evolve();
        let stats = &report.stats;

        info!(
            "gen {:>4} | id {:>2} | score {:>3} | record {:>3} | fitness {:>10.2} | mean {:>10.2}",
            stats.generation,
            stats.best_index,
            stats.best_score,
            stats.record_score,
            stats.best_fitness,
            stats.mean_fitness
        );

        stats_log.append(stats)?;

        if report.should_checkpoint(config.checkpoint_cadence) {
            let name = format!(
                "best_gen_{}_id_{}_score_{}.txt",
                stats.generation, stats.best_index, stats.best_score
            );
            let path = opts.checkpoint_dir.join(name);
            report
                .best_brain
                .save(&path)
                .with_context(|| format!("saving checkpoint {}", path.display()))?;
        }
    }

    info!(record = population.record_score, "training finished");
    Ok(())
}

/// raw weight dump of the generation that just finished, one file per agent
fn dump_generation(population: &Population, session_dir: &Path) -> anyhow::Result<()> {
    let dir = session_dir.join(format!("gen_{}", population.generation));
    fs::create_dir_all(&dir)?;
    for (i, agent) in population.agents.iter().enumerate() {
        agent.brain().save(&dir.join(format!("snake_{i}.txt")))?;
    }
    Ok(())
}
