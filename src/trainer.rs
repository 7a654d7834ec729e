use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use tracing::{debug, warn};

use crate::error::Result;
use crate::hyperparameters::{BatchSize, Hyperparameters, TrainingParams};
use crate::loss::Loss;
use crate::model::{FitResult, LinearModel};
use crate::optimizer::Optimizer;
use crate::utils::{check_training_shape, epoch_chunks};

/// Mini-batch gradient descent on L2-regularized mean squared error.
///
/// Weights start at zero on every call. Each epoch the rows are shuffled
/// (unless full-batch or shuffling is disabled), split into consecutive
/// chunks, and one update is applied per chunk. After the epoch the
/// regularized loss over the whole dataset is appended to the trace.
#[derive(Debug, Clone)]
pub struct GradientDescentTrainer {
    pub params: TrainingParams,
}

impl GradientDescentTrainer {
    pub fn new(params: TrainingParams) -> Self {
        GradientDescentTrainer { params }
    }

    /// Trains on `(x, y)`, drawing the per-epoch shuffles from `rng`.
    ///
    /// All inputs are checked before the first epoch; on error nothing is
    /// trained. Divergence is not an error: non-finite values are left in the
    /// returned loss trace.
    pub fn fit<R: Rng + ?Sized>(
        &self,
        x: ArrayView2<f32>,
        y: ArrayView1<f32>,
        rng: &mut R,
    ) -> Result<FitResult> {
        check_training_shape(x, y)?;
        let (n, d) = x.dim();
        self.params.validate(n)?;

        let hp = self.params.hyperparameters;
        let loss = Loss::regularized(hp.regularization);
        let optimizer = Optimizer::new(hp.learning_rate);
        let chunk_len = self.params.batch_size.chunk_len(n);
        let shuffle = self.params.shuffle && !self.params.batch_size.is_full();

        let mut theta: Array1<f32> = Array1::zeros(d);
        let mut losses = loss_trace(hp.epochs);
        let mut diverged = false;

        for epoch in 0..hp.epochs {
            for chunk in epoch_chunks(n, chunk_len, shuffle, rng) {
                if chunk.len() == n && !shuffle {
                    update(&loss, &optimizer, x, y, &mut theta);
                } else {
                    let x_chunk = x.select(Axis(0), &chunk);
                    let y_chunk = y.select(Axis(0), &chunk);
                    update(&loss, &optimizer, x_chunk.view(), y_chunk.view(), &mut theta);
                }
            }

            let epoch_loss = loss.calculate(x.dot(&theta).view(), y, theta.view());
            debug!(epoch, loss = epoch_loss, batch_size = %self.params.batch_size, "epoch complete");
            if !epoch_loss.is_finite() && !diverged {
                warn!(epoch, loss = epoch_loss, "loss is no longer finite");
                diverged = true;
            }
            losses.push(epoch_loss);
        }

        Ok(FitResult {
            model: LinearModel::new(theta),
            losses,
        })
    }
}

/// Epochs reserved up front; longer runs grow the trace as they go.
const RESERVED_EPOCHS: usize = 4096;

fn loss_trace(epochs: usize) -> Vec<f32> {
    Vec::with_capacity(epochs.min(RESERVED_EPOCHS))
}

fn update(
    loss: &Loss,
    optimizer: &Optimizer,
    x: ArrayView2<f32>,
    y: ArrayView1<f32>,
    theta: &mut Array1<f32>,
) {
    let residual = x.dot(&*theta) - &y;
    let gradient = loss.gradient(x, residual.view(), theta.view());
    optimizer.step(theta, gradient.view());
}

/// Single training run with explicit hyperparameters
pub fn fit<R: Rng + ?Sized>(
    x: ArrayView2<f32>,
    y: ArrayView1<f32>,
    learning_rate: f32,
    epochs: usize,
    batch_size: BatchSize,
    regularization: f32,
    rng: &mut R,
) -> Result<FitResult> {
    let hyperparameters = Hyperparameters::new(learning_rate, regularization, epochs);
    GradientDescentTrainer::new(TrainingParams::new(hyperparameters, batch_size)).fit(x, y, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrainError;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_single_full_batch_step() {
        // One epoch from theta = 0: gradient = -(2/n) x^T y
        let x = array![[1.0, 0.0], [0.0, 1.0]];
        let y = array![2.0, 4.0];
        let mut rng = StdRng::seed_from_u64(0);

        let result = fit(x.view(), y.view(), 0.5, 1, BatchSize::Full, 0.0, &mut rng).unwrap();

        assert_eq!(result.theta(), &array![1.0, 2.0]);
        // residuals [-1, -2] -> mse 2.5
        assert!((result.losses[0] - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_regularization_shrinks_update() {
        let x = array![[1.0], [1.0]];
        let y = array![1.0, 1.0];
        let mut rng = StdRng::seed_from_u64(0);

        let plain = fit(x.view(), y.view(), 0.1, 20, BatchSize::Full, 0.0, &mut rng).unwrap();
        let ridge = fit(x.view(), y.view(), 0.1, 20, BatchSize::Full, 1.0, &mut rng).unwrap();

        assert!(ridge.theta()[0] < plain.theta()[0]);
        // stationary point of (t - 1)^2 + t^2 is 0.5
        assert!((ridge.theta()[0] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_stochastic_updates_per_row() {
        // A single row with batch size 1 behaves exactly like full-batch
        let x = array![[2.0]];
        let y = array![4.0];
        let mut rng = StdRng::seed_from_u64(3);

        let sgd = fit(x.view(), y.view(), 0.05, 5, BatchSize::Rows(1), 0.0, &mut rng).unwrap();
        let full = fit(x.view(), y.view(), 0.05, 5, BatchSize::Full, 0.0, &mut rng).unwrap();

        assert_eq!(sgd.theta(), full.theta());
        assert_eq!(sgd.losses, full.losses);
    }

    #[test]
    fn test_zero_features_rejected() {
        let x = ndarray::Array2::<f32>::zeros((3, 0));
        let y = array![1.0, 2.0, 3.0];
        let mut rng = StdRng::seed_from_u64(0);

        let err = fit(x.view(), y.view(), 0.1, 1, BatchSize::Full, 0.0, &mut rng).unwrap_err();
        assert!(matches!(err, TrainError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_loss_trace_reservation_is_capped() {
        assert!(loss_trace(10).capacity() >= 10);
        assert!(loss_trace(usize::MAX).capacity() <= RESERVED_EPOCHS);
        assert!(loss_trace(usize::MAX).is_empty());
    }

    #[test]
    fn test_batch_larger_than_rows_rejected() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 2.0];
        let mut rng = StdRng::seed_from_u64(0);

        let err = fit(x.view(), y.view(), 0.1, 1, BatchSize::Rows(3), 0.0, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            TrainError::InvalidHyperparameter { name: "batch_size", .. }
        ));
    }
}
