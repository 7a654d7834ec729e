//! Trains one model per batch-size variant with shared hyperparameters and
//! keeps the one with the lowest test error.

use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, TrainError};
use crate::hyperparameters::{BatchSize, Hyperparameters, TrainingParams};
use crate::model::{FitResult, LinearModel};
use crate::trainer::GradientDescentTrainer;
use crate::utils::{argmin, check_training_shape};

/// Evaluation order of the standard comparison
pub const DEFAULT_VARIANTS: [BatchSize; 5] = [
    BatchSize::Rows(1),
    BatchSize::Rows(32),
    BatchSize::Rows(64),
    BatchSize::Rows(128),
    BatchSize::Full,
];

#[derive(Debug, Clone, PartialEq)]
pub struct VariantResult {
    pub batch_size: BatchSize,
    pub fit: FitResult,
    pub test_mse: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Index into `variants` of the winner
    pub best: usize,
    pub variants: Vec<VariantResult>,
}

impl Selection {
    pub fn best_variant(&self) -> &VariantResult {
        &self.variants[self.best]
    }

    pub fn models(&self) -> impl Iterator<Item = &LinearModel> {
        self.variants.iter().map(|variant| &variant.fit.model)
    }

    /// Loss traces in evaluation order, labelled for reporting
    pub fn losses(&self) -> impl Iterator<Item = (BatchSize, &[f32])> {
        self.variants
            .iter()
            .map(|variant| (variant.batch_size, variant.fit.losses.as_slice()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSelector {
    pub variants: Vec<BatchSize>,

    /// Every variant trains with its own generator seeded from this value.
    pub seed: u64,
}

impl Default for ModelSelector {
    fn default() -> Self {
        ModelSelector {
            variants: DEFAULT_VARIANTS.to_vec(),
            seed: 60,
        }
    }
}

impl ModelSelector {
    pub fn new(variants: Vec<BatchSize>) -> Self {
        ModelSelector {
            variants,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Trains every variant on the training split, scores each on the test
    /// split and returns all of them with the arg-min marked. Exact ties go
    /// to the variant listed first.
    pub fn select_best(
        &self,
        x_train: ArrayView2<f32>,
        y_train: ArrayView1<f32>,
        x_test: ArrayView2<f32>,
        y_test: ArrayView1<f32>,
        hyperparameters: Hyperparameters,
    ) -> Result<Selection> {
        if self.variants.is_empty() {
            return Err(TrainError::hyperparameter(
                "variants",
                0,
                "at least one batch size is required",
            ));
        }
        if x_test.nrows() == 0 {
            return Err(TrainError::shape("test row count", 1, 0));
        }
        if x_test.ncols() != x_train.ncols() {
            return Err(TrainError::shape(
                "test feature count",
                x_train.ncols(),
                x_test.ncols(),
            ));
        }
        if y_test.len() != x_test.nrows() {
            return Err(TrainError::shape(
                "test target length",
                x_test.nrows(),
                y_test.len(),
            ));
        }
        check_training_shape(x_train, y_train)?;
        for batch_size in &self.variants {
            TrainingParams::new(hyperparameters, *batch_size).validate(x_train.nrows())?;
        }

        let mut variants = Vec::with_capacity(self.variants.len());
        for batch_size in &self.variants {
            let trainer = GradientDescentTrainer::new(TrainingParams::new(hyperparameters, *batch_size));
            let mut rng = StdRng::seed_from_u64(self.seed);
            let fit = trainer.fit(x_train, y_train, &mut rng)?;
            let test_mse = fit.model.mse(x_test, y_test)?;

            info!(variant = %batch_size, test_mse, "variant trained");
            variants.push(VariantResult {
                batch_size: *batch_size,
                fit,
                test_mse,
            });
        }

        let best = argmin(variants.iter().map(|variant| variant.test_mse)).unwrap_or(0);
        info!(variant = %variants[best].batch_size, test_mse = variants[best].test_mse, "best variant");

        Ok(Selection { best, variants })
    }
}

/// Five-variant comparison with the default seed
pub fn select_best(
    x_train: ArrayView2<f32>,
    y_train: ArrayView1<f32>,
    x_test: ArrayView2<f32>,
    y_test: ArrayView1<f32>,
    learning_rate: f32,
    regularization: f32,
    epochs: usize,
) -> Result<Selection> {
    ModelSelector::default().select_best(
        x_train,
        y_train,
        x_test,
        y_test,
        Hyperparameters::new(learning_rate, regularization, epochs),
    )
}
