//! Error types for training, search and model selection.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TrainError>;

/// Errors raised by the trainer and the procedures built on top of it.
///
/// Shape and hyperparameter problems are reported before any epoch runs, so a
/// failing call never returns partial results.
#[derive(Debug, Error)]
pub enum TrainError {
    /// Dimension inconsistency between X, y or theta.
    #[error("shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Which input was inconsistent.
        context: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Out-of-range learning rate, regularization, epoch count or batch size.
    #[error("invalid hyperparameter {name} = {value}: {reason}")]
    InvalidHyperparameter {
        /// Parameter name.
        name: &'static str,
        /// Rejected value, rendered.
        value: String,
        /// Accepted range.
        reason: &'static str,
    },

    /// The hyperparameter search was given no candidates.
    #[error("candidate grid is empty")]
    EmptyGrid,

    /// Loss trace contains a non-finite value. Only produced on request.
    #[error("loss diverged at epoch {epoch}: {loss}")]
    NumericDivergence {
        /// First epoch with a non-finite loss.
        epoch: usize,
        /// Loss recorded at that epoch.
        loss: f32,
    },

    /// Train/test fraction out of range or a split leaving one side empty.
    #[error("invalid split: {0}")]
    InvalidSplit(String),

    /// Saved model could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading or writing a saved model failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrainError {
    pub(crate) fn shape(context: &'static str, expected: usize, actual: usize) -> Self {
        TrainError::ShapeMismatch {
            context,
            expected,
            actual,
        }
    }

    pub(crate) fn hyperparameter(
        name: &'static str,
        value: impl ToString,
        reason: &'static str,
    ) -> Self {
        TrainError::InvalidHyperparameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
