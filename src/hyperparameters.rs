use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainError};

/// Number of rows used for a single gradient update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchSize {
    /// Fixed chunk size; 1 is stochastic gradient descent.
    Rows(usize),
    /// Every row, in original order, every epoch.
    Full,
}

impl BatchSize {
    /// Checks the batch size against a dataset of `n` rows
    pub fn validate(&self, n: usize) -> Result<()> {
        match *self {
            BatchSize::Full => Ok(()),
            BatchSize::Rows(0) => Err(TrainError::hyperparameter(
                "batch_size",
                0,
                "must be at least 1",
            )),
            BatchSize::Rows(rows) if rows > n => Err(TrainError::hyperparameter(
                "batch_size",
                rows,
                "must not exceed the number of training rows",
            )),
            BatchSize::Rows(_) => Ok(()),
        }
    }

    /// Chunk length for a dataset of `n` rows
    pub fn chunk_len(&self, n: usize) -> usize {
        match *self {
            BatchSize::Rows(rows) => rows,
            BatchSize::Full => n,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, BatchSize::Full)
    }
}

impl fmt::Display for BatchSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchSize::Rows(1) => write!(f, "SGD"),
            BatchSize::Rows(rows) => write!(f, "Mini-Batch ({})", rows),
            BatchSize::Full => write!(f, "Full-Batch"),
        }
    }
}

/// Hyperparameter triple explored by the search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Step size for weight updates, no decay
    pub learning_rate: f32,

    /// L2 penalty coefficient applied to every weight
    pub regularization: f32,

    /// Number of training epochs
    pub epochs: usize,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Hyperparameters {
            learning_rate: 0.01,
            regularization: 0.001,
            epochs: 100,
        }
    }
}

impl Hyperparameters {
    pub fn new(learning_rate: f32, regularization: f32, epochs: usize) -> Self {
        Hyperparameters {
            learning_rate,
            regularization,
            epochs,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(TrainError::hyperparameter(
                "learning_rate",
                self.learning_rate,
                "must be finite and greater than zero",
            ));
        }
        if !self.regularization.is_finite() || self.regularization < 0.0 {
            return Err(TrainError::hyperparameter(
                "regularization",
                self.regularization,
                "must be finite and non-negative",
            ));
        }
        if self.epochs < 1 {
            return Err(TrainError::hyperparameter(
                "epochs",
                self.epochs,
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Everything a single training run needs besides the data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
    pub hyperparameters: Hyperparameters,
    pub batch_size: BatchSize,

    /// Reshuffle rows every epoch in chunked modes. Ignored for full-batch.
    pub shuffle: bool,
}

impl Default for TrainingParams {
    fn default() -> Self {
        TrainingParams {
            hyperparameters: Hyperparameters::default(),
            batch_size: BatchSize::Rows(32),
            shuffle: true,
        }
    }
}

impl TrainingParams {
    pub fn new(hyperparameters: Hyperparameters, batch_size: BatchSize) -> Self {
        TrainingParams {
            hyperparameters,
            batch_size,
            shuffle: true,
        }
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: BatchSize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Validates the hyperparameters and the batch size for `n` rows
    pub fn validate(&self, n: usize) -> Result<()> {
        self.hyperparameters.validate()?;
        self.batch_size.validate(n)
    }
}

/// Ordered set of candidate triples. Order decides ties: first seen wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateGrid {
    candidates: Vec<Hyperparameters>,
}

impl Default for CandidateGrid {
    fn default() -> Self {
        CandidateGrid::cartesian(&[0.001, 0.01, 0.1], &[0.0, 0.001, 0.01, 0.1], &[50, 100, 200])
    }
}

impl CandidateGrid {
    pub fn new(candidates: Vec<Hyperparameters>) -> Self {
        CandidateGrid { candidates }
    }

    /// Every combination, learning rate outermost and epochs innermost
    pub fn cartesian(learning_rates: &[f32], regularizations: &[f32], epochs: &[usize]) -> Self {
        let mut candidates =
            Vec::with_capacity(learning_rates.len() * regularizations.len() * epochs.len());
        for &learning_rate in learning_rates {
            for &regularization in regularizations {
                for &epoch_count in epochs {
                    candidates.push(Hyperparameters::new(learning_rate, regularization, epoch_count));
                }
            }
        }
        CandidateGrid { candidates }
    }

    pub fn push(&mut self, candidate: Hyperparameters) {
        self.candidates.push(candidate);
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hyperparameters> {
        self.candidates.iter()
    }
}

impl From<Vec<Hyperparameters>> for CandidateGrid {
    fn from(candidates: Vec<Hyperparameters>) -> Self {
        CandidateGrid::new(candidates)
    }
}
