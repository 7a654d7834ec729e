//! Grid search over (learning rate, regularization, epochs).
//!
//! Every candidate is trained on the training split and scored with plain
//! mean squared error on the validation split. The lowest score wins; ties
//! keep the candidate that appears first in the grid.

use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, TrainError};
use crate::hyperparameters::{BatchSize, CandidateGrid, Hyperparameters, TrainingParams};
use crate::trainer::GradientDescentTrainer;
use crate::utils::{argmin, check_training_shape};

/// One evaluated candidate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub hyperparameters: Hyperparameters,
    pub validation_mse: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub best: Hyperparameters,
    pub best_validation_mse: f32,

    /// Every candidate in grid order
    pub trials: Vec<Trial>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HyperparameterSearcher {
    /// Batch policy used while scoring candidates. Full-batch keeps the
    /// comparison deterministic.
    pub batch_size: BatchSize,

    /// Seed for the shuffles of a chunked evaluation policy. Each candidate
    /// starts from a fresh generator with this seed.
    pub seed: u64,
}

impl Default for HyperparameterSearcher {
    fn default() -> Self {
        HyperparameterSearcher {
            batch_size: BatchSize::Full,
            seed: 60,
        }
    }
}

impl HyperparameterSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: BatchSize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Returns the triple with minimum validation MSE together with every
    /// trial. Inputs and every candidate are validated before any training.
    pub fn search(
        &self,
        x_train: ArrayView2<f32>,
        y_train: ArrayView1<f32>,
        x_val: ArrayView2<f32>,
        y_val: ArrayView1<f32>,
        grid: &CandidateGrid,
    ) -> Result<SearchOutcome> {
        if grid.is_empty() {
            return Err(TrainError::EmptyGrid);
        }
        if x_val.nrows() == 0 {
            return Err(TrainError::shape("validation row count", 1, 0));
        }
        if x_val.ncols() != x_train.ncols() {
            return Err(TrainError::shape(
                "validation feature count",
                x_train.ncols(),
                x_val.ncols(),
            ));
        }
        if y_val.len() != x_val.nrows() {
            return Err(TrainError::shape(
                "validation target length",
                x_val.nrows(),
                y_val.len(),
            ));
        }
        check_training_shape(x_train, y_train)?;
        for candidate in grid.iter() {
            TrainingParams::new(*candidate, self.batch_size).validate(x_train.nrows())?;
        }

        let mut trials = Vec::with_capacity(grid.len());
        for (idx, candidate) in grid.iter().enumerate() {
            let trainer = GradientDescentTrainer::new(TrainingParams::new(*candidate, self.batch_size));
            let mut rng = StdRng::seed_from_u64(self.seed);
            let fitted = trainer.fit(x_train, y_train, &mut rng)?;
            let validation_mse = fitted.model.mse(x_val, y_val)?;

            debug!(
                candidate = idx,
                learning_rate = candidate.learning_rate,
                regularization = candidate.regularization,
                epochs = candidate.epochs,
                validation_mse,
                "candidate scored"
            );
            trials.push(Trial {
                hyperparameters: *candidate,
                validation_mse,
            });
        }

        let best_idx = argmin(trials.iter().map(|trial| trial.validation_mse))
            .ok_or(TrainError::EmptyGrid)?;
        let best = trials[best_idx];
        info!(
            learning_rate = best.hyperparameters.learning_rate,
            regularization = best.hyperparameters.regularization,
            epochs = best.hyperparameters.epochs,
            validation_mse = best.validation_mse,
            "best hyperparameters"
        );

        Ok(SearchOutcome {
            best: best.hyperparameters,
            best_validation_mse: best.validation_mse,
            trials,
        })
    }
}

/// Grid search with the default full-batch evaluation policy
pub fn search(
    x_train: ArrayView2<f32>,
    y_train: ArrayView1<f32>,
    x_val: ArrayView2<f32>,
    y_val: ArrayView1<f32>,
    grid: &CandidateGrid,
) -> Result<Hyperparameters> {
    HyperparameterSearcher::default()
        .search(x_train, y_train, x_val, y_val, grid)
        .map(|outcome| outcome.best)
}
