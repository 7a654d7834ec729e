use ndarray::{Array1, ArrayView1, ArrayView2};

/// Plain mean squared error, no penalty term
pub fn mean_squared_error(prediction: ArrayView1<f32>, target: ArrayView1<f32>) -> f32 {
    let residual = &prediction - &target;
    residual.dot(&residual) / residual.len() as f32
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Loss {
    MeanSquaredError,
    RegularizedMeanSquaredError { strength: f32 },
}

impl Loss {
    pub fn regularized(strength: f32) -> Self {
        Loss::RegularizedMeanSquaredError { strength }
    }

    /// L2 penalty contributed by `theta`: strength * sum(theta^2)
    pub fn penalty(&self, theta: ArrayView1<f32>) -> f32 {
        match self {
            Loss::MeanSquaredError => 0.0,
            Loss::RegularizedMeanSquaredError { strength } => strength * theta.dot(&theta),
        }
    }

    pub fn calculate(
        &self,
        prediction: ArrayView1<f32>,
        target: ArrayView1<f32>,
        theta: ArrayView1<f32>,
    ) -> f32 {
        mean_squared_error(prediction, target) + self.penalty(theta)
    }

    /// Gradient with respect to theta over one chunk of rows.
    ///
    /// `(2 / rows) * x^T * residual`, plus `2 * strength * theta` when
    /// regularized. Every component is penalized, including any column the
    /// caller uses as an intercept.
    pub fn gradient(
        &self,
        x: ArrayView2<f32>,
        residual: ArrayView1<f32>,
        theta: ArrayView1<f32>,
    ) -> Array1<f32> {
        let scale = 2.0 / x.nrows() as f32;
        let mut gradient = x.t().dot(&residual) * scale;
        if let Loss::RegularizedMeanSquaredError { strength } = self {
            gradient.scaled_add(2.0 * strength, &theta);
        }
        gradient
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_mean_squared_error() {
        let test_cases = vec![
            (array![1.0, 2.0], array![1.0, 2.0], 0.0),
            (array![0.5, 1.0], array![1.0, 1.0], 0.125),
            (array![0.0, 0.0], array![1.0, -1.0], 1.0),
        ];

        for (predicted, target, expected) in test_cases {
            let computed = mean_squared_error(predicted.view(), target.view());
            assert!(
                (computed - expected).abs() < 1e-6,
                "Got {}, expected {}",
                computed,
                expected
            );
        }
    }

    #[test]
    fn test_penalty_grows_with_strength() {
        let theta = array![1.0, -2.0];
        let weak = Loss::regularized(0.1).penalty(theta.view());
        let strong = Loss::regularized(0.2).penalty(theta.view());

        assert!((weak - 0.5).abs() < 1e-6);
        assert!(strong > weak);
        assert_eq!(Loss::MeanSquaredError.penalty(theta.view()), 0.0);
    }

    #[test]
    fn test_regularized_loss_adds_penalty() {
        let prediction = array![1.0, 3.0];
        let target = array![1.0, 1.0];
        let theta = array![1.0, 1.0];

        let plain = Loss::MeanSquaredError.calculate(prediction.view(), target.view(), theta.view());
        let penalized =
            Loss::regularized(0.5).calculate(prediction.view(), target.view(), theta.view());

        assert!((plain - 2.0).abs() < 1e-6);
        assert!((penalized - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_gradient() {
        // x = [[1, 0], [0, 2]], residual = [1, -1], theta = [1, 1]
        let x = array![[1.0, 0.0], [0.0, 2.0]];
        let residual = array![1.0, -1.0];
        let theta = array![1.0, 1.0];

        let plain = Loss::MeanSquaredError.gradient(x.view(), residual.view(), theta.view());
        assert_eq!(plain, array![1.0, -2.0]);

        let penalized = Loss::regularized(0.5).gradient(x.view(), residual.view(), theta.view());
        assert_eq!(penalized, array![2.0, -1.0]);
    }
}
