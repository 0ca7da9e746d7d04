//! Input encoding.
//!
//! Converts user-selected field values into the numeric feature vector a
//! predictor was fit against. Two strategies exist and are never mixed:
//!
//! - [`OrdinalEncoder`]: categorical values become integer codes looked up in
//!   the category tables stored with the model artifact; numeric values pass
//!   through unchanged.
//! - [`FittedPipeline`]: the raw row is type-coerced and pushed through a
//!   previously-fit per-column transform (one-hot tables, standardization)
//!   loaded from its own artifact.

mod ordinal;
mod pipeline;
mod schema;

pub use ordinal::OrdinalEncoder;
pub use pipeline::{ColumnTransform, FittedPipeline, PipelineColumn};
pub use schema::{FieldKind, FieldSpec, FormSchema, RawRow, RawValue};

use thiserror::Error;

/// Errors raised while encoding an input row.
///
/// Every variant means the row diverges from the schema the target artifact
/// was fit with; none of them are retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    /// A categorical value is not in the fit-time category table.
    #[error("unknown category {value:?} for field {field:?} (known: {known:?})")]
    UnknownCategory {
        field: String,
        value: String,
        known: Vec<String>,
    },

    /// A field value has the wrong type for its column.
    #[error("type mismatch for field {field:?}: expected {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        got: &'static str,
    },

    /// The row has a different number of fields than the schema.
    #[error("row width mismatch: expected {expected} fields, got {got}")]
    WidthMismatch { expected: usize, got: usize },
}
