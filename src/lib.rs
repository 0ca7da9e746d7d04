//! cropcast: crop yield change prediction from pre-fit climate regressions.
//!
//! Loads previously-fit regression models from disk, encodes user-selected
//! climate parameters into the feature vectors those models were trained on,
//! and reports the predicted yield change percentage.
//!
//! # Key Types
//!
//! - [`YieldModel`] - A fitted predictor with its metadata, loaded from a `.cyp` artifact
//! - [`ModelRegistry`] - Lazy, caching target-to-predictor lookup
//! - [`OrdinalEncoder`] / [`FittedPipeline`] - The two input encoding strategies
//! - [`Prediction`] - Scalar result with sign classification and display formatting
//!
//! # The Two App Variants
//!
//! [`forms::crop`] predicts per-crop yield change from ordinal-coded inputs;
//! [`forms::commodity`] predicts per-commodity-group yield change through a
//! shared fitted preprocessing pipeline. Each variant owns a session type
//! that wires its encoder, registry and dispatcher together.

// Re-export approx traits for users who want to compare predictions
pub use approx;

pub mod artifact;
pub mod encode;
pub mod forms;
pub mod model;
pub mod predict;
pub mod registry;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// High-level model types
pub use model::{FieldMeta, LinearModel, ModelMeta, YieldModel};

// Encoding types (for preparing inputs)
pub use encode::{
    EncodeError, FieldKind, FieldSpec, FittedPipeline, FormSchema, OrdinalEncoder, RawRow,
    RawValue,
};

// Dispatch types
pub use predict::{run_model, PredictError, Prediction, YieldDirection};

// Registry types
pub use registry::{ArtifactStore, LoadError, ModelRegistry};
