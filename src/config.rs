use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// All tunables for one evolution run in a single place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// play field width in cells
    pub grid_width: i32,
    /// play field height in cells
    pub grid_height: i32,
    /// agents per generation
    pub population_size: usize,
    /// per-gene probability of a gaussian nudge
    pub mutation_rate: f64,
    /// standard deviation of the mutation noise
    pub mutation_sigma: f32,
    /// how many top agents carry over untouched
    pub elite_count: usize,
    /// ticks an agent survives without eating
    pub initial_hunger: i32,
    /// extra ticks granted per food item
    pub hunger_bonus: i32,
    /// save a checkpoint every n-th generation regardless of record
    pub checkpoint_cadence: u32,
    /// fixed rng seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            grid_width: 30,
            grid_height: 30,
            population_size: 50,
            mutation_rate: 0.05,
            mutation_sigma: 0.5,
            elite_count: 2,
            initial_hunger: 100,
            hunger_bonus: 100,
            checkpoint_cadence: 10,
            seed: None,
        }
    }
}

impl EvolutionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width < 5 || self.grid_height < 5 {
            return Err(ConfigError::Invalid("grid must be at least 5x5"));
        }
        if self.population_size < 4 {
            return Err(ConfigError::Invalid("population_size must be at least 4"));
        }
        if self.elite_count > self.population_size {
            return Err(ConfigError::Invalid(
                "elite_count cannot exceed population_size",
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::Invalid("mutation_rate must be in [0, 1]"));
        }
        if self.mutation_sigma < 0.0 {
            return Err(ConfigError::Invalid("mutation_sigma must be non-negative"));
        }
        if self.initial_hunger <= 0 {
            return Err(ConfigError::Invalid("initial_hunger must be positive"));
        }
        if self.hunger_bonus < 0 {
            return Err(ConfigError::Invalid("hunger_bonus must be non-negative"));
        }
        Ok(())
    }

    /// Returns the rng for the whole run, seeded from the config when a
    /// seed is set, from entropy otherwise.
    pub fn seeded_rng(&self) -> SmallRng {
        match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::seed_from_u64(rand::random()),
        }
    }
}
