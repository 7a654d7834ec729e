use ndarray::{Array1, ArrayView1};

/// Plain gradient descent with a constant step size
#[derive(Debug, Clone)]
pub struct Optimizer {
    pub learning_rate: f32,
}

impl Optimizer {
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }

    /// theta <- theta - learning_rate * gradient
    pub fn step(&self, theta: &mut Array1<f32>, gradient: ArrayView1<f32>) {
        theta.scaled_add(-self.learning_rate, &gradient);
    }
}
