use std::path::Path;

use tracing::info;

use crate::brain::Brain;
use crate::config::EvolutionConfig;
use crate::snake::Agent;

/// Plays a saved brain with no evolution at all: run an episode until
/// the agent dies, report the score, restart from the same weights.
pub fn run_replay(config: &EvolutionConfig, weights: &Path, episodes: u32) -> anyhow::Result<()> {
    config.validate()?;
    let brain = Brain::load(weights)?;
    let mut rng = config.seeded_rng();

    info!(
        "replaying {} ({}x{})",
        weights.display(),
        brain.n_inputs(),
        brain.n_outputs()
    );

    for episode in 1..=episodes {
        let mut agent = Agent::with_brain(config, brain.clone(), &mut rng)?;
        while agent.alive {
            agent.think()?;
            agent.update(&mut rng);
        }
        info!(
            "episode {:>3} | score {:>3} | steps {:>5}",
            episode, agent.score, agent.steps
        );
    }

    Ok(())
}
