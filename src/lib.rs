mod error;
mod hyperparameters;
mod loss;
mod model;
mod optimizer;
mod utils;

pub mod persistence;
pub mod preprocessing;
pub mod search;
pub mod selection;
pub mod trainer;

pub use error::{Result, TrainError};
pub use hyperparameters::{BatchSize, CandidateGrid, Hyperparameters, TrainingParams};
pub use loss::{mean_squared_error, Loss};
pub use model::{FitResult, LinearModel};
pub use optimizer::Optimizer;
pub use persistence::SavedModel;
pub use preprocessing::{train_test_split, PolynomialFeatures, Split, StandardScaler};
pub use search::{HyperparameterSearcher, SearchOutcome, Trial};
pub use selection::{ModelSelector, Selection, VariantResult, DEFAULT_VARIANTS};
pub use trainer::{fit, GradientDescentTrainer};
pub use utils::{argmin, rows_to_matrix};
