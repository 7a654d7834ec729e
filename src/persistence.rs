//! JSON bundle of a selected model and the preprocessing it expects.

use std::io::{Read, Write};

use ndarray::{Array1, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, TrainError};
use crate::hyperparameters::{BatchSize, Hyperparameters};
use crate::model::LinearModel;
use crate::preprocessing::{PolynomialFeatures, StandardScaler};
use crate::selection::Selection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedModel {
    pub theta: Vec<f32>,
    pub batch_size: BatchSize,
    pub hyperparameters: Hyperparameters,
    pub test_mse: f32,
    pub scaler: Option<StandardScaler>,
    pub polynomial: Option<PolynomialFeatures>,

    /// Names of the raw input columns, in the order `predict_raw` expects
    pub feature_names: Vec<String>,
}

impl SavedModel {
    /// Bundles the winner of a selection run
    pub fn from_selection(
        selection: &Selection,
        hyperparameters: Hyperparameters,
        scaler: Option<StandardScaler>,
        polynomial: Option<PolynomialFeatures>,
        feature_names: Vec<String>,
    ) -> Self {
        let best = selection.best_variant();
        SavedModel {
            theta: best.fit.model.theta.to_vec(),
            batch_size: best.batch_size,
            hyperparameters,
            test_mse: best.test_mse,
            scaler,
            polynomial,
            feature_names,
        }
    }

    pub fn model(&self) -> LinearModel {
        LinearModel::new(Array1::from(self.theta.clone()))
    }

    /// Applies the stored scaler and polynomial expansion, then predicts
    pub fn predict_raw(&self, x: ArrayView2<f32>) -> Result<Array1<f32>> {
        if !self.feature_names.is_empty() && x.ncols() != self.feature_names.len() {
            return Err(TrainError::shape(
                "raw feature count",
                self.feature_names.len(),
                x.ncols(),
            ));
        }
        let mut features = x.to_owned();
        if let Some(scaler) = &self.scaler {
            features = scaler.transform(features.view())?;
        }
        if let Some(polynomial) = &self.polynomial {
            features = polynomial.transform(features.view())?;
        }
        self.model().predict(features.view())
    }

    pub fn save<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        info!(batch_size = %self.batch_size, features = self.theta.len(), "model saved");
        Ok(())
    }

    pub fn load<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}
