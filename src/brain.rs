use std::fs;
use std::path::Path;

use rand::Rng;
use thiserror::Error;

/// sensor vector length fed to a forager brain
pub const SENSOR_INPUTS: usize = 6;
/// one output column per direction
pub const ACTION_OUTPUTS: usize = 4;

#[derive(Debug, Error, PartialEq)]
pub enum BrainError {
    #[error("input vector has {actual} components, matrix expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Errors raised while reading a weight file back in.
#[derive(Debug, Error)]
pub enum WeightFileError {
    #[error("failed to read weight file: {0}")]
    Io(#[from] std::io::Error),
    #[error("weight file contains no rows")]
    Empty,
    #[error("line {line}: '{token}' is not a number")]
    Parse { line: usize, token: String },
    #[error("line {line} has {actual} columns, expected {expected}")]
    NotRectangular {
        line: usize,
        expected: usize,
        actual: usize,
    },
}

/// Linear decision model: one weight per (input, output) pair.
/// The matrix keeps its shape for its whole lifetime, only values change.
#[derive(Clone, Debug, PartialEq)]
pub struct Brain {
    n_inputs: usize,
    n_outputs: usize,
    weights: Vec<f32>, // row-major, one row per input
}

impl Brain {
    /// fresh matrix with every gene drawn uniformly from [-1, 1)
    pub fn random(n_inputs: usize, n_outputs: usize, rng: &mut impl Rng) -> Self {
        let weights = (0..n_inputs * n_outputs)
            .map(|_| rng.gen_range(-1.0..1.0))
            .collect();
        Self { n_inputs, n_outputs, weights }
    }

    pub fn from_weights(n_inputs: usize, n_outputs: usize, weights: Vec<f32>) -> Self {
        assert_eq!(weights.len(), n_inputs * n_outputs);
        Self { n_inputs, n_outputs, weights }
    }

    pub fn n_inputs(&self) -> usize {
        self.n_inputs
    }

    pub fn n_outputs(&self) -> usize {
        self.n_outputs
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// mutable view of the genes; the shape itself stays fixed
    pub fn weights_mut(&mut self) -> &mut [f32] {
        &mut self.weights
    }

    /// Scores every action for the given sensor reading: a plain
    /// matrix-vector product, no activation, no state.
    pub fn predict(&self, input: &[f32]) -> Result<Vec<f32>, BrainError> {
        if input.len() != self.n_inputs {
            return Err(BrainError::DimensionMismatch {
                expected: self.n_inputs,
                actual: input.len(),
            });
        }
        let mut scores = vec![0.0f32; self.n_outputs];
        for (i, &v) in input.iter().enumerate() {
            let row = &self.weights[i * self.n_outputs..(i + 1) * self.n_outputs];
            for (j, &w) in row.iter().enumerate() {
                scores[j] += v * w;
            }
        }
        Ok(scores)
    }

    /// Writes the matrix as text: one row per line, values separated by
    /// spaces, five fractional digits each.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let mut out = String::new();
        for row in self.weights.chunks(self.n_outputs) {
            let cells: Vec<String> = row.iter().map(|w| format!("{w:.5}")).collect();
            out.push_str(&cells.join(" "));
            out.push('\n');
        }
        fs::write(path, out)
    }

    /// Parses a saved matrix back in. Dimensions are inferred from the
    /// file itself: row count becomes n_inputs, column count n_outputs.
    pub fn load(path: &Path) -> Result<Self, WeightFileError> {
        let text = fs::read_to_string(path)?;
        let rows = parse_grid(&text)?;
        let n_inputs = rows.len();
        let n_outputs = rows[0].len();
        let weights = rows.into_iter().flatten().collect();
        Ok(Self { n_inputs, n_outputs, weights })
    }
}

/// Text to rectangular rows of numbers. Format checks only, no domain
/// knowledge; `Brain::load` turns the result into a typed matrix.
fn parse_grid(text: &str) -> Result<Vec<Vec<f32>>, WeightFileError> {
    let mut rows: Vec<Vec<f32>> = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut row = Vec::new();
        for token in line.split_whitespace() {
            let value: f32 = token.parse().map_err(|_| WeightFileError::Parse {
                line: idx + 1,
                token: token.to_string(),
            })?;
            row.push(value);
        }
        if let Some(first) = rows.first() {
            if row.len() != first.len() {
                return Err(WeightFileError::NotRectangular {
                    line: idx + 1,
                    expected: first.len(),
                    actual: row.len(),
                });
            }
        }
        rows.push(row);
    }
    if rows.is_empty() {
        return Err(WeightFileError::Empty);
    }
    Ok(rows)
}
