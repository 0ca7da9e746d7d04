//! Linear predictor data structure.

use ndarray::{aview1, Array1, ArrayView1};

/// Fitted linear regression (weights + bias).
///
/// Stores one coefficient per input feature plus an intercept. Prediction is
/// a single dot product:
///
/// ```text
/// output = features · weights + bias
/// ```
///
/// # Example
///
/// ```
/// use cropcast::model::LinearModel;
/// use ndarray::array;
///
/// // y = 0.5*x0 + 0.3*x1 + 0.1
/// let model = LinearModel::new(array![0.5, 0.3], 0.1);
///
/// assert_eq!(model.n_features(), 2);
/// assert!((model.predict_row(&[1.0, 2.0]) - 1.2).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    /// Per-feature coefficients, length = n_features.
    weights: Array1<f32>,
    /// Intercept.
    bias: f32,
}

impl LinearModel {
    /// Create a new linear model from a weight vector and bias.
    pub fn new(weights: Array1<f32>, bias: f32) -> Self {
        Self { weights, bias }
    }

    /// Create a linear model from a flat weight slice and bias.
    pub fn from_slice(weights: &[f32], bias: f32) -> Self {
        Self {
            weights: Array1::from_vec(weights.to_vec()),
            bias,
        }
    }

    /// Create a zero-initialized linear model.
    pub fn zeros(n_features: usize) -> Self {
        Self {
            weights: Array1::zeros(n_features),
            bias: 0.0,
        }
    }

    /// Number of input features.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    /// Get the coefficient for a feature.
    #[inline]
    pub fn weight(&self, feature: usize) -> f32 {
        self.weights[feature]
    }

    /// Get the intercept.
    #[inline]
    pub fn bias(&self) -> f32 {
        self.bias
    }

    /// Get the weight vector as a view.
    #[inline]
    pub fn weights(&self) -> ArrayView1<'_, f32> {
        self.weights.view()
    }

    /// Predict for a single row.
    ///
    /// # Panics
    ///
    /// Panics if `features.len() != n_features`. Callers validate the width
    /// before invoking (see the dispatcher).
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        assert_eq!(
            features.len(),
            self.n_features(),
            "feature width {} doesn't match model width {}",
            features.len(),
            self.n_features()
        );
        self.weights.dot(&aview1(features)) + self.bias
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn linear_model_new() {
        let model = LinearModel::new(array![0.5, 0.3], 0.1);

        assert_eq!(model.n_features(), 2);
        assert_eq!(model.weight(0), 0.5);
        assert_eq!(model.weight(1), 0.3);
        assert_eq!(model.bias(), 0.1);
    }

    #[test]
    fn linear_model_from_slice() {
        let model = LinearModel::from_slice(&[1.0, -2.0, 0.5], -10.0);

        assert_eq!(model.n_features(), 3);
        assert_eq!(model.weight(2), 0.5);
        assert_eq!(model.bias(), -10.0);
    }

    #[test]
    fn linear_model_zeros() {
        let model = LinearModel::zeros(4);

        assert_eq!(model.n_features(), 4);
        assert_eq!(model.bias(), 0.0);
        assert!(model.weights().iter().all(|&w| w == 0.0));
    }

    #[test]
    fn predict_row() {
        // y = 0.5*x0 + 0.3*x1 + 0.1
        let model = LinearModel::new(array![0.5, 0.3], 0.1);

        let pred = model.predict_row(&[1.0, 2.0]);
        assert!((pred - 1.2).abs() < 1e-6);

        let pred = model.predict_row(&[0.0, 0.0]);
        assert!((pred - 0.1).abs() < 1e-6);
    }

    #[test]
    fn predict_row_negative_output() {
        let model = LinearModel::new(array![-2.0, 0.05], -10.0);

        // -2*1 + 0.05*100 - 10 = -7
        let pred = model.predict_row(&[1.0, 100.0]);
        assert!((pred - (-7.0)).abs() < 1e-5);
    }

    #[test]
    #[should_panic(expected = "feature width")]
    fn predict_row_wrong_width() {
        let model = LinearModel::new(array![0.5, 0.3], 0.1);
        model.predict_row(&[1.0]);
    }
}
