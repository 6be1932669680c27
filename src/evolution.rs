use rand::Rng;
use rand::rngs::SmallRng;
use rand_distr::{Distribution, Normal};

use crate::brain::{Brain, BrainError};
use crate::config::{ConfigError, EvolutionConfig};
use crate::snake::Agent;

/// One line of the per-generation log.
#[derive(Debug, Clone)]
pub struct GenerationStats {
    pub generation: u32,
    /// index of the best agent within its generation, before sorting
    pub best_index: usize,
    pub best_score: u32,
    /// all-time best score across every generation so far
    pub record_score: u32,
    pub best_fitness: f32,
    pub mean_fitness: f32,
}

/// What `evolve` hands back: the log line plus a verbatim copy of the
/// winning genes, so callers can decide whether to persist them.
pub struct GenerationReport {
    pub stats: GenerationStats,
    pub best_brain: Brain,
}

impl GenerationReport {
    /// Checkpoint rule: the record was equalled or beaten, or the
    /// generation index landed on the cadence.
    pub fn should_checkpoint(&self, cadence: u32) -> bool {
        self.stats.best_score >= self.stats.record_score
            || (cadence > 0 && self.stats.generation % cadence == 0)
    }
}

/// A generation's worth of agents plus the shared rng that feeds every
/// random draw in the run.
pub struct Population {
    pub agents: Vec<Agent>,
    pub generation: u32,
    pub record_score: u32,
    config: EvolutionConfig,
    rng: SmallRng,
}

impl Population {
    pub fn new(config: EvolutionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = config.seeded_rng();
        let agents = (0..config.population_size)
            .map(|_| Agent::spawn(&config, &mut rng))
            .collect();
        Ok(Self {
            agents,
            generation: 1,
            record_score: 0,
            config,
            rng,
        })
    }

    /// advance every living agent one tick
    pub fn step_all(&mut self) -> Result<(), BrainError> {
        for agent in &mut self.agents {
            if agent.alive {
                agent.think()?;
                agent.update(&mut self.rng);
            }
        }
        Ok(())
    }

    pub fn is_extinct(&self) -> bool {
        self.agents.iter().all(|a| !a.alive)
    }

    /// Closes out a finished generation: ranks everyone, records the
    /// winner and breeds the replacement population. The swap is
    /// wholesale; callers never observe a half-built generation.
    pub fn evolve(&mut self) -> GenerationReport {
        // the first maximal element wins ties
        let mut best_index = 0;
        for (i, agent) in self.agents.iter().enumerate() {
            if agent.fitness() > self.agents[best_index].fitness() {
                best_index = i;
            }
        }

        let best_score = self.agents[best_index].score;
        let best_fitness = self.agents[best_index].fitness();
        let mean_fitness =
            self.agents.iter().map(|a| a.fitness()).sum::<f32>() / self.agents.len() as f32;

        if best_score > self.record_score {
            self.record_score = best_score;
        }

        let stats = GenerationStats {
            generation: self.generation,
            best_index,
            best_score,
            record_score: self.record_score,
            best_fitness,
            mean_fitness,
        };
        let best_brain = self.agents[best_index].brain().clone();

        self.agents
            .sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));

        let mut next: Vec<Agent> = Vec::with_capacity(self.config.population_size);

        // elites keep their genes exactly, no mutation
        for elite in self.agents.iter().take(self.config.elite_count) {
            next.push(Agent::inherit(
                &self.config,
                elite.brain().clone(),
                &mut self.rng,
            ));
        }

        // everyone else is bred from the top half, drawn with replacement
        let pool = self.config.population_size / 2;
        while next.len() < self.config.population_size {
            let parent_a = &self.agents[self.rng.gen_range(0..pool)];
            let parent_b = &self.agents[self.rng.gen_range(0..pool)];
            let mut genes = crossover(parent_a.brain(), parent_b.brain(), &mut self.rng);
            mutate(
                &mut genes,
                self.config.mutation_rate,
                self.config.mutation_sigma,
                &mut self.rng,
            );
            next.push(Agent::inherit(&self.config, genes, &mut self.rng));
        }

        self.agents = next;
        self.generation += 1;

        GenerationReport { stats, best_brain }
    }
}

/// Uniform crossover: a fresh coin flip for every single gene.
/// Both parents must share one shape.
pub fn crossover(a: &Brain, b: &Brain, rng: &mut impl Rng) -> Brain {
    assert_eq!(a.n_inputs(), b.n_inputs());
    assert_eq!(a.n_outputs(), b.n_outputs());
    let weights = a
        .weights()
        .iter()
        .zip(b.weights())
        .map(|(x, y)| if rng.gen_bool(0.5) { *x } else { *y })
        .collect();
    Brain::from_weights(a.n_inputs(), a.n_outputs(), weights)
}

/// Per-gene gaussian nudge at the given rate, clamped back into [-1, 1].
pub fn mutate(brain: &mut Brain, rate: f64, sigma: f32, rng: &mut impl Rng) {
    let Ok(noise) = Normal::new(0.0, sigma) else {
        return;
    };
    for w in brain.weights_mut() {
        if rng.gen_bool(rate) {
            *w = (*w + noise.sample(rng)).clamp(-1.0, 1.0);
        }
    }
}
