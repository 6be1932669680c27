use rand::Rng;

use crate::brain::{ACTION_OUTPUTS, Brain, BrainError, SENSOR_INPUTS};
use crate::config::EvolutionConfig;
use crate::grid::{Direction, Point};

const INIT_LENGTH: usize = 3;

/// One forager. Owns its brain, its body and its own food item;
/// agents never see each other.
pub struct Agent {
    pub body: Vec<Point>, // body[0] is the head
    pub direction: Direction,
    pub alive: bool,
    pub hunger: i32,
    pub score: u32,
    pub steps: u32,
    pub food: Point,
    brain: Brain,
    grid_width: i32,
    grid_height: i32,
    hunger_bonus: i32,
}

impl Agent {
    /// fresh agent with random genes
    pub fn spawn(cfg: &EvolutionConfig, rng: &mut impl Rng) -> Self {
        let brain = Brain::random(SENSOR_INPUTS, ACTION_OUTPUTS, rng);
        Self::inherit(cfg, brain, rng)
    }

    /// Fresh body, hunger and score around an externally loaded brain.
    /// The matrix must match the forager's sensor and action counts.
    pub fn with_brain(
        cfg: &EvolutionConfig,
        brain: Brain,
        rng: &mut impl Rng,
    ) -> Result<Self, BrainError> {
        if brain.n_inputs() != SENSOR_INPUTS {
            return Err(BrainError::DimensionMismatch {
                expected: SENSOR_INPUTS,
                actual: brain.n_inputs(),
            });
        }
        if brain.n_outputs() != ACTION_OUTPUTS {
            return Err(BrainError::DimensionMismatch {
                expected: ACTION_OUTPUTS,
                actual: brain.n_outputs(),
            });
        }
        Ok(Self::inherit(cfg, brain, rng))
    }

    /// fresh body around an inherited brain, used for every birth
    pub(crate) fn inherit(cfg: &EvolutionConfig, brain: Brain, rng: &mut impl Rng) -> Self {
        let head = Point::new(cfg.grid_width / 2, cfg.grid_height / 2);
        let direction = Direction::Up;
        // tail segments trail away opposite to the movement direction
        let (dx, dy) = direction.opposite().delta();
        let mut body = vec![head];
        for i in 1..INIT_LENGTH as i32 {
            body.push(Point::new(head.x + dx * i, head.y + dy * i));
        }

        let mut agent = Self {
            body,
            direction,
            alive: true,
            hunger: cfg.initial_hunger,
            score: 0,
            steps: 0,
            food: head,
            brain,
            grid_width: cfg.grid_width,
            grid_height: cfg.grid_height,
            hunger_bonus: cfg.hunger_bonus,
        };
        match agent.random_free_cell(rng) {
            Some(cell) => agent.food = cell,
            None => agent.alive = false,
        }
        agent
    }

    pub fn head(&self) -> Point {
        self.body[0]
    }

    pub fn brain(&self) -> &Brain {
        &self.brain
    }

    /// selection rank: food count dominates, survival time breaks ties
    pub fn fitness(&self) -> f32 {
        self.score as f32 * 500.0 + self.steps as f32
    }

    /// True when stepping onto `cell` would kill: outside the field, or
    /// on the body except the tail cell that vacates this tick.
    fn hits_obstacle(&self, cell: Point) -> bool {
        if cell.x < 0 || cell.x >= self.grid_width || cell.y < 0 || cell.y >= self.grid_height {
            return true;
        }
        self.body[..self.body.len() - 1].contains(&cell)
    }

    /// sensor vector: normalized food offset plus four neighbor flags
    fn sense(&self) -> [f32; SENSOR_INPUTS] {
        let head = self.head();
        let mut input = [0.0f32; SENSOR_INPUTS];
        input[0] = (self.food.x - head.x) as f32 / self.grid_width as f32;
        input[1] = (self.food.y - head.y) as f32 / self.grid_height as f32;
        for (slot, dir) in Direction::ALL.iter().enumerate() {
            if self.hits_obstacle(head.step(*dir)) {
                input[2 + slot] = 1.0;
            }
        }
        input
    }

    /// Asks the brain for a direction. The first maximal output wins;
    /// a 180 degree turn is ignored and the previous direction kept.
    pub fn think(&mut self) -> Result<(), BrainError> {
        if !self.alive {
            return Ok(());
        }
        let scores = self.brain.predict(&self.sense())?;
        let mut best = 0;
        for i in 1..scores.len() {
            if scores[i] > scores[best] {
                best = i;
            }
        }
        let wanted = Direction::ALL[best];
        if wanted != self.direction.opposite() {
            self.direction = wanted;
        }
        Ok(())
    }

    /// One tick of the survival state machine: hunger, movement,
    /// collision, feeding.
    pub fn update(&mut self, rng: &mut impl Rng) {
        if !self.alive {
            return;
        }

        self.hunger -= 1;
        if self.hunger <= 0 {
            self.alive = false; // starved
            return;
        }

        let next = self.head().step(self.direction);
        if self.hits_obstacle(next) {
            self.alive = false;
            return;
        }

        self.body.insert(0, next);
        if next == self.food {
            self.score += 1;
            self.hunger += self.hunger_bonus;
            match self.random_free_cell(rng) {
                Some(cell) => self.food = cell,
                // the body covers the whole field, nothing left to eat:
                // retire the agent with its score intact
                None => self.alive = false,
            }
        } else {
            self.body.pop();
        }
        self.steps += 1;
    }

    /// Rejection-samples a cell outside the body. Returns None once the
    /// body covers the whole field, so callers never spin forever.
    fn random_free_cell(&self, rng: &mut impl Rng) -> Option<Point> {
        if self.body.len() >= (self.grid_width * self.grid_height) as usize {
            return None;
        }
        loop {
            let cell = Point::new(
                rng.gen_range(0..self.grid_width),
                rng.gen_range(0..self.grid_height),
            );
            if !self.body.contains(&cell) {
                return Some(cell);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> EvolutionConfig {
        EvolutionConfig {
            grid_width: 10,
            grid_height: 10,
            seed: Some(99),
            ..EvolutionConfig::default()
        }
    }

    /// brain with a single nonzero gene at (input row, output column)
    fn single_gene_brain(row: usize, col: usize, weight: f32) -> Brain {
        let mut weights = vec![0.0; SENSOR_INPUTS * ACTION_OUTPUTS];
        weights[row * ACTION_OUTPUTS + col] = weight;
        Brain::from_weights(SENSOR_INPUTS, ACTION_OUTPUTS, weights)
    }

    #[test]
    fn spawn_builds_a_straight_body() {
        let cfg = test_config();
        let mut rng = cfg.seeded_rng();
        let agent = Agent::spawn(&cfg, &mut rng);
        assert_eq!(agent.body.len(), INIT_LENGTH);
        assert_eq!(agent.head(), Point::new(5, 5));
        assert_eq!(agent.body[1], Point::new(5, 6));
        assert_eq!(agent.body[2], Point::new(5, 7));
        assert!(agent.alive);
        assert_eq!(agent.hunger, cfg.initial_hunger);
        assert!(!agent.body.contains(&agent.food));
    }

    #[test]
    fn starving_agent_dies_without_moving() {
        let cfg = test_config();
        let mut rng = cfg.seeded_rng();
        let mut agent = Agent::spawn(&cfg, &mut rng);
        agent.hunger = 1;
        agent.food = Point::new(0, 0); // out of reach this tick

        let body_before = agent.body.clone();
        agent.update(&mut rng);

        assert!(!agent.alive);
        assert_eq!(agent.score, 0);
        assert_eq!(agent.steps, 0);
        assert_eq!(agent.body, body_before);
    }

    #[test]
    fn eating_grows_feeds_and_relocates_food() {
        let cfg = test_config();
        let mut rng = cfg.seeded_rng();
        let mut agent = Agent::spawn(&cfg, &mut rng);
        agent.food = agent.head().step(agent.direction);

        agent.update(&mut rng);

        assert!(agent.alive);
        assert_eq!(agent.score, 1);
        assert_eq!(agent.steps, 1);
        // one tick of hunger spent, one food bonus gained
        assert_eq!(agent.hunger, cfg.initial_hunger - 1 + cfg.hunger_bonus);
        // the body grew instead of dropping its tail
        assert_eq!(agent.body.len(), INIT_LENGTH + 1);
        assert!(!agent.body.contains(&agent.food));
    }

    #[test]
    fn plain_move_keeps_length() {
        let cfg = test_config();
        let mut rng = cfg.seeded_rng();
        let mut agent = Agent::spawn(&cfg, &mut rng);
        agent.food = Point::new(0, 0);

        let head_before = agent.head();
        agent.update(&mut rng);

        assert!(agent.alive);
        assert_eq!(agent.body.len(), INIT_LENGTH);
        assert_eq!(agent.head(), head_before.step(agent.direction));
        assert_eq!(agent.steps, 1);
    }

    #[test]
    fn wall_collision_kills() {
        let cfg = test_config();
        let mut rng = cfg.seeded_rng();
        let mut agent = Agent::spawn(&cfg, &mut rng);
        agent.food = Point::new(0, 0);

        // head marches straight up and out of the field
        for _ in 0..cfg.grid_height {
            agent.update(&mut rng);
        }
        assert!(!agent.alive);
        assert_eq!(agent.steps, 5); // five rows above the start
    }

    #[test]
    fn reverse_direction_is_rejected() {
        let cfg = test_config();
        let mut rng = cfg.seeded_rng();
        // food below the head and a gene wiring food_dy straight into
        // the Down output: the brain always votes for the reverse
        let brain = single_gene_brain(1, 1, 1.0);
        let mut agent = Agent::with_brain(&cfg, brain, &mut rng).unwrap();
        agent.food = Point::new(5, 9);
        assert_eq!(agent.direction, Direction::Up);

        agent.think().unwrap();
        assert_eq!(agent.direction, Direction::Up);
    }

    #[test]
    fn sideways_turn_is_accepted() {
        let cfg = test_config();
        let mut rng = cfg.seeded_rng();
        // food to the left, negative gene on the Left output
        let brain = single_gene_brain(0, 2, -1.0);
        let mut agent = Agent::with_brain(&cfg, brain, &mut rng).unwrap();
        agent.food = Point::new(0, 5);
        assert_eq!(agent.direction, Direction::Up);

        agent.think().unwrap();
        assert_eq!(agent.direction, Direction::Left);
    }

    #[test]
    fn obstacle_flags_mark_blocked_neighbors() {
        let cfg = test_config();
        let mut rng = cfg.seeded_rng();
        let mut agent = Agent::spawn(&cfg, &mut rng);
        // park the head in the top-left corner
        agent.body = vec![Point::new(0, 0), Point::new(1, 0), Point::new(2, 0)];
        agent.food = Point::new(0, 5);

        let input = agent.sense();
        assert_eq!(input[2], 1.0); // up is the wall
        assert_eq!(input[3], 0.0); // down is open
        assert_eq!(input[4], 1.0); // left is the wall
        assert_eq!(input[5], 1.0); // right is the body
        assert_eq!(input[0], 0.0);
        assert_eq!(input[1], 0.5); // five cells down on a 10-cell grid
    }

    #[test]
    fn tail_cell_does_not_count_as_obstacle() {
        let cfg = test_config();
        let mut rng = cfg.seeded_rng();
        let mut agent = Agent::spawn(&cfg, &mut rng);
        // the tail vacates this tick, moving onto it is legal
        assert!(!agent.hits_obstacle(agent.body[INIT_LENGTH - 1]));
        assert!(agent.hits_obstacle(agent.body[1]));
    }

    #[test]
    fn with_brain_rejects_wrong_shape() {
        let cfg = test_config();
        let mut rng = cfg.seeded_rng();
        let brain = Brain::random(3, 4, &mut rng);
        assert!(Agent::with_brain(&cfg, brain, &mut rng).is_err());
        let brain = Brain::random(6, 2, &mut rng);
        assert!(Agent::with_brain(&cfg, brain, &mut rng).is_err());
    }

    #[test]
    fn full_grid_retires_the_winner() {
        let cfg = test_config();
        let mut rng = cfg.seeded_rng();
        let mut agent = Agent::spawn(&cfg, &mut rng);

        // body everywhere except one corner cell, head right next to it
        let mut body = vec![Point::new(1, 0)];
        for y in 0..cfg.grid_height {
            for x in 0..cfg.grid_width {
                let cell = Point::new(x, y);
                if cell != Point::new(0, 0) && cell != Point::new(1, 0) {
                    body.push(cell);
                }
            }
        }
        agent.body = body;
        agent.direction = Direction::Left;
        agent.food = Point::new(0, 0);
        let score_before = agent.score;

        agent.update(&mut rng);

        assert!(!agent.alive);
        assert_eq!(agent.score, score_before + 1);
    }

    #[test]
    fn fitness_weights_food_over_steps() {
        let cfg = test_config();
        let mut rng = cfg.seeded_rng();
        let mut agent = Agent::spawn(&cfg, &mut rng);

        agent.score = 2;
        agent.steps = 100;
        assert_eq!(agent.fitness(), 1100.0);

        // more steps never lower the rank
        agent.steps = 101;
        assert_eq!(agent.fitness(), 1101.0);

        // one extra food item beats the whole step budget an agent with
        // the same score could possibly accumulate before starving
        for score in 0..4u32 {
            let max_steps = (cfg.initial_hunger + cfg.hunger_bonus * score as i32) as u32;
            agent.score = score;
            agent.steps = max_steps;
            let capped = agent.fitness();
            agent.score = score + 1;
            agent.steps = 0;
            assert!(agent.fitness() > capped);
        }
    }
}
