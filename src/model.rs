use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::error::{Result, TrainError};
use crate::loss::mean_squared_error;

/// Linear model over a preprocessed design matrix. There is no separate
/// intercept; a bias column, if wanted, is part of the features.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub theta: Array1<f32>,
}

impl LinearModel {
    pub fn new(theta: Array1<f32>) -> Self {
        LinearModel { theta }
    }

    /// Zero weights for `features` columns
    pub fn zeros(features: usize) -> Self {
        LinearModel {
            theta: Array1::zeros(features),
        }
    }

    pub fn features(&self) -> usize {
        self.theta.len()
    }

    pub fn predict(&self, x: ArrayView2<f32>) -> Result<Array1<f32>> {
        if x.ncols() != self.theta.len() {
            return Err(TrainError::shape("feature count", self.theta.len(), x.ncols()));
        }
        Ok(x.dot(&self.theta))
    }

    /// Unregularized mean squared error on `(x, y)`
    pub fn mse(&self, x: ArrayView2<f32>, y: ArrayView1<f32>) -> Result<f32> {
        if y.len() != x.nrows() {
            return Err(TrainError::shape("target length", x.nrows(), y.len()));
        }
        if y.is_empty() {
            return Err(TrainError::shape("row count", 1, 0));
        }
        let prediction = self.predict(x)?;
        Ok(mean_squared_error(prediction.view(), y))
    }
}

/// Output of a training run: final weights and one loss per epoch
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub model: LinearModel,
    pub losses: Vec<f32>,
}

impl FitResult {
    pub fn theta(&self) -> &Array1<f32> {
        &self.model.theta
    }

    pub fn final_loss(&self) -> Option<f32> {
        self.losses.last().copied()
    }

    /// Reports the first epoch whose loss is not finite
    pub fn check_finite(&self) -> Result<()> {
        match self.losses.iter().position(|loss| !loss.is_finite()) {
            Some(epoch) => Err(TrainError::NumericDivergence {
                epoch,
                loss: self.losses[epoch],
            }),
            None => Ok(()),
        }
    }
}
