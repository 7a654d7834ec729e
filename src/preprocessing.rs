//! Numeric preprocessing applied before training: standardization,
//! polynomial expansion and a seeded train/test split.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainError};

/// Columns with a smaller spread than this are left unscaled.
const MIN_SCALE: f32 = 1e-8;

/// Zero-mean, unit-variance scaling fitted on training rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f32>,
    pub scale: Vec<f32>,
}

impl StandardScaler {
    /// Per-column mean and population standard deviation of `x`
    pub fn fit(x: ArrayView2<f32>) -> Result<Self> {
        if x.ncols() == 0 {
            return Err(TrainError::shape("feature count", 1, 0));
        }
        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| TrainError::shape("row count", 1, 0))?;
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|std| if std < MIN_SCALE { 1.0 } else { std });

        Ok(StandardScaler {
            mean: mean.to_vec(),
            scale: scale.to_vec(),
        })
    }

    pub fn transform(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        if self.scale.len() != self.mean.len() {
            return Err(TrainError::shape("scale length", self.mean.len(), self.scale.len()));
        }
        if x.ncols() != self.mean.len() {
            return Err(TrainError::shape("feature count", self.mean.len(), x.ncols()));
        }
        let mean = ArrayView1::from(&self.mean[..]);
        let scale = ArrayView1::from(&self.scale[..]);
        Ok((&x - &mean) / &scale)
    }

    pub fn fit_transform(x: ArrayView2<f32>) -> Result<(Self, Array2<f32>)> {
        let scaler = Self::fit(x)?;
        let scaled = scaler.transform(x)?;
        Ok((scaler, scaled))
    }
}

/// Polynomial and interaction terms up to `degree`, without a bias column.
///
/// For inputs `[a, b]` and degree 2 the output is `[a, b, a^2, a b, b^2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolynomialFeatures {
    pub degree: usize,
}

impl Default for PolynomialFeatures {
    fn default() -> Self {
        PolynomialFeatures { degree: 2 }
    }
}

impl PolynomialFeatures {
    pub fn new(degree: usize) -> Result<Self> {
        if degree == 0 {
            return Err(TrainError::hyperparameter("degree", 0, "must be at least 1"));
        }
        Ok(PolynomialFeatures { degree })
    }

    /// Column index multisets of every output term, in output order
    pub fn terms(&self, n_features: usize) -> Vec<Vec<usize>> {
        let mut terms = Vec::new();
        if n_features == 0 {
            return terms;
        }
        for degree in 1..=self.degree {
            let mut term = vec![0; degree];
            loop {
                terms.push(term.clone());

                let mut pos = degree;
                while pos > 0 && term[pos - 1] == n_features - 1 {
                    pos -= 1;
                }
                if pos == 0 {
                    break;
                }
                term[pos - 1] += 1;
                let next = term[pos - 1];
                for slot in term[pos..].iter_mut() {
                    *slot = next;
                }
            }
        }
        terms
    }

    pub fn n_output_features(&self, n_features: usize) -> usize {
        self.terms(n_features).len()
    }

    pub fn transform(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        if x.ncols() == 0 {
            return Err(TrainError::shape("feature count", 1, 0));
        }
        let terms = self.terms(x.ncols());
        Ok(Array2::from_shape_fn((x.nrows(), terms.len()), |(row, col)| {
            terms[col].iter().map(|&feature| x[[row, feature]]).product()
        }))
    }

    /// Output column names such as `a`, `a^2` and `a b`
    pub fn feature_names(&self, input_names: &[String]) -> Vec<String> {
        self.terms(input_names.len())
            .iter()
            .map(|term| {
                let mut parts = Vec::new();
                let mut idx = 0;
                while idx < term.len() {
                    let feature = term[idx];
                    let power = term[idx..].iter().take_while(|&&f| f == feature).count();
                    if power == 1 {
                        parts.push(input_names[feature].clone());
                    } else {
                        parts.push(format!("{}^{}", input_names[feature], power));
                    }
                    idx += power;
                }
                parts.join(" ")
            })
            .collect()
    }
}

/// Disjoint train and test partitions of the same rows
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub x_train: Array2<f32>,
    pub x_test: Array2<f32>,
    pub y_train: Array1<f32>,
    pub y_test: Array1<f32>,
}

/// Shuffles rows with `seed` and holds out `ceil(n * test_fraction)` of them.
pub fn train_test_split(
    x: ArrayView2<f32>,
    y: ArrayView1<f32>,
    test_fraction: f32,
    seed: u64,
) -> Result<Split> {
    let n = x.nrows();
    if y.len() != n {
        return Err(TrainError::shape("target length", n, y.len()));
    }
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(TrainError::InvalidSplit(format!(
            "test fraction {} is outside (0, 1)",
            test_fraction
        )));
    }
    let n_test = (n as f32 * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(TrainError::InvalidSplit(format!(
            "{} rows cannot be split with test fraction {}",
            n, test_fraction
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));
    let (test, train) = order.split_at(n_test);

    Ok(Split {
        x_train: x.select(Axis(0), train),
        x_test: x.select(Axis(0), test),
        y_train: y.select(Axis(0), train),
        y_test: y.select(Axis(0), test),
    })
}
