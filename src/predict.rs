//! Prediction dispatch and result classification.
//!
//! One prediction is one synchronous call: encode, width-check, invoke,
//! classify the scalar by sign. No partial results, no retries.

use thiserror::Error;

use crate::encode::EncodeError;
use crate::model::YieldModel;
use crate::registry::LoadError;

/// Sign classification of a predicted yield change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YieldDirection {
    /// Non-negative change.
    Increase,
    /// Negative change.
    Decrease,
}

impl YieldDirection {
    /// Human phrasing for the direction.
    pub fn phrase(&self) -> &'static str {
        match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
        }
    }
}

/// A predicted yield change percentage.
///
/// Exists only for the duration of a single display render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    change_pct: f32,
}

impl Prediction {
    /// Wrap a raw model output.
    pub fn new(change_pct: f32) -> Self {
        Self { change_pct }
    }

    /// The predicted change, in percent.
    pub fn change_pct(&self) -> f32 {
        self.change_pct
    }

    /// Sign classification: `>= 0` is an increase.
    pub fn direction(&self) -> YieldDirection {
        if self.change_pct >= 0.0 {
            YieldDirection::Increase
        } else {
            YieldDirection::Decrease
        }
    }
}

impl std::fmt::Display for Prediction {
    /// Signed, two-decimal percentage, e.g. `+3.25%` or `-5.00%`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:+.2}%", self.change_pct)
    }
}

/// Errors raised while dispatching a prediction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    /// The target's predictor could not be loaded; the target is disabled.
    #[error("no model available for target {target:?}: {reason}")]
    TargetUnavailable { target: String, reason: LoadError },

    /// The shared preprocessor could not be loaded; every target is disabled.
    #[error("preprocessor unavailable: {reason}")]
    PreprocessorUnavailable { reason: LoadError },

    /// The input row diverges from the artifact's schema.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The encoded vector's width doesn't match the model.
    #[error(
        "feature width mismatch for target {target:?}: model expects {expected}, encoder \
         produced {got}; the input encoding likely diverges from the encoding the model \
         was fit with"
    )]
    FeatureWidth {
        target: String,
        expected: usize,
        got: usize,
    },
}

/// Invoke a predictor on an encoded row, producing exactly one scalar.
///
/// Validates the feature width first so a schema drift surfaces as a typed
/// error rather than a panic inside the dot product.
pub fn run_model(
    model: &YieldModel,
    target: &str,
    features: &[f32],
) -> Result<Prediction, PredictError> {
    if features.len() != model.n_features() {
        return Err(PredictError::FeatureWidth {
            target: target.to_string(),
            expected: model.n_features(),
            got: features.len(),
        });
    }

    Ok(Prediction::new(model.predict_row(features)))
}
