//! Fitted preprocessing pipeline.
//!
//! The commodity variant does not encode inputs itself: a previously-fit
//! column pipeline is loaded from its own artifact and applied to the
//! type-coerced raw row. The pipeline memorizes everything it learned at fit
//! time (one-hot category tables, standardization statistics), so the encoded
//! vector is exactly what the downstream predictors were trained on.

use std::path::Path;

use crate::artifact::{
    ArtifactBody, ArtifactCodec, ArtifactKind, ArtifactMetadata, ColumnPayload, DeserializeError,
    FormatFlags, FormatHeader, Payload, PayloadV1, PipelinePayload, SerializeError,
    TransformPayload,
};

use super::schema::{RawRow, RawValue};
use super::EncodeError;

/// Fitted transform for one raw column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnTransform {
    /// One-hot expansion over a memorized category table.
    OneHot {
        /// Fit-time categories, in code order.
        categories: Vec<String>,
    },
    /// Standardization with memorized mean and scale.
    Standardize {
        /// Fit-time mean.
        mean: f32,
        /// Fit-time scale (standard deviation).
        scale: f32,
    },
    /// Numeric passthrough.
    Passthrough,
}

impl ColumnTransform {
    /// Number of output features this transform produces.
    pub fn output_width(&self) -> usize {
        match self {
            Self::OneHot { categories } => categories.len(),
            Self::Standardize { .. } | Self::Passthrough => 1,
        }
    }
}

/// One column of a fitted pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineColumn {
    /// Raw field name.
    pub name: String,
    /// Fitted transform.
    pub transform: ColumnTransform,
}

impl PipelineColumn {
    /// Create a one-hot column.
    pub fn one_hot<S: Into<String>>(
        name: impl Into<String>,
        categories: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            transform: ColumnTransform::OneHot {
                categories: categories.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Create a standardizing column.
    pub fn standardize(name: impl Into<String>, mean: f32, scale: f32) -> Self {
        Self {
            name: name.into(),
            transform: ColumnTransform::Standardize { mean, scale },
        }
    }

    /// Create a passthrough column.
    pub fn passthrough(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: ColumnTransform::Passthrough,
        }
    }

    fn apply(&self, value: &RawValue, out: &mut Vec<f32>) -> Result<(), EncodeError> {
        match (&self.transform, value) {
            (ColumnTransform::OneHot { categories }, RawValue::Text(text)) => {
                let hit = categories.iter().position(|c| c == text).ok_or_else(|| {
                    EncodeError::UnknownCategory {
                        field: self.name.clone(),
                        value: text.clone(),
                        known: categories.clone(),
                    }
                })?;
                for i in 0..categories.len() {
                    out.push(if i == hit { 1.0 } else { 0.0 });
                }
                Ok(())
            }
            (ColumnTransform::OneHot { .. }, RawValue::Number(_)) => {
                Err(EncodeError::TypeMismatch {
                    field: self.name.clone(),
                    expected: "text",
                    got: "number",
                })
            }
            (ColumnTransform::Standardize { mean, scale }, RawValue::Number(n)) => {
                out.push((n - mean) / scale.max(1e-6));
                Ok(())
            }
            (ColumnTransform::Passthrough, RawValue::Number(n)) => {
                out.push(*n);
                Ok(())
            }
            (ColumnTransform::Standardize { .. } | ColumnTransform::Passthrough, RawValue::Text(_)) => {
                Err(EncodeError::TypeMismatch {
                    field: self.name.clone(),
                    expected: "number",
                    got: "text",
                })
            }
        }
    }
}

/// A previously-fit preprocessing pipeline.
///
/// Read-only after load; shared across all predictions in a session.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedPipeline {
    columns: Vec<PipelineColumn>,
}

impl FittedPipeline {
    /// Create a pipeline from fitted columns.
    pub fn new(columns: Vec<PipelineColumn>) -> Self {
        Self { columns }
    }

    /// Number of raw input fields.
    pub fn n_inputs(&self) -> usize {
        self.columns.len()
    }

    /// Width of the encoded vector the pipeline produces.
    pub fn n_outputs(&self) -> usize {
        self.columns.iter().map(|c| c.transform.output_width()).sum()
    }

    /// Get an iterator over columns.
    pub fn iter(&self) -> impl Iterator<Item = &PipelineColumn> {
        self.columns.iter()
    }

    /// Transform a coerced row into the encoded feature vector.
    ///
    /// The row must already be type-coerced (see [`FormSchema::coerce`]);
    /// a value of the wrong type is a typed error, mirroring the numeric
    /// comparison failure an unfitted value would cause downstream.
    ///
    /// [`FormSchema::coerce`]: super::FormSchema::coerce
    pub fn transform(&self, row: &RawRow) -> Result<Vec<f32>, EncodeError> {
        if row.len() != self.columns.len() {
            return Err(EncodeError::WidthMismatch {
                expected: self.columns.len(),
                got: row.len(),
            });
        }

        let mut features = Vec::with_capacity(self.n_outputs());
        for (column, value) in self.columns.iter().zip(row.iter()) {
            column.apply(value, &mut features)?;
        }
        Ok(features)
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// Serialize the pipeline to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializeError> {
        let payload = Payload::V1(PayloadV1 {
            metadata: ArtifactMetadata::default(),
            body: ArtifactBody::Pipeline(PipelinePayload {
                columns: self.columns.iter().map(column_to_payload).collect(),
            }),
        });

        let mut header = FormatHeader::new(
            ArtifactKind::Pipeline,
            self.n_inputs() as u32,
            self.n_outputs() as u32,
        );
        if self
            .columns
            .iter()
            .any(|c| matches!(c.transform, ColumnTransform::OneHot { .. }))
        {
            header.flags.set(FormatFlags::HAS_CATEGORY_TABLES);
        }

        ArtifactCodec::new().serialize(header, &payload)
    }

    /// Deserialize a pipeline from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DeserializeError> {
        let codec = ArtifactCodec::new();
        let (header, payload) = codec.deserialize::<Payload>(bytes, ArtifactKind::Pipeline)?;

        let Payload::V1(v1) = payload;

        let ArtifactBody::Pipeline(pipeline) = v1.body else {
            return Err(DeserializeError::CorruptPayload(
                "header says pipeline but payload is not".into(),
            ));
        };

        let pipeline = Self {
            columns: pipeline.columns.into_iter().map(column_from_payload).collect(),
        };

        if pipeline.n_inputs() != header.n_inputs as usize {
            return Err(DeserializeError::CorruptPayload(format!(
                "header says {} inputs but payload has {} columns",
                header.n_inputs,
                pipeline.n_inputs()
            )));
        }
        if pipeline.n_outputs() != header.n_outputs as usize {
            return Err(DeserializeError::CorruptPayload(format!(
                "header says {} outputs but columns produce {}",
                header.n_outputs,
                pipeline.n_outputs()
            )));
        }

        Ok(pipeline)
    }

    /// Save the pipeline to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SerializeError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load a pipeline from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DeserializeError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

fn column_to_payload(column: &PipelineColumn) -> ColumnPayload {
    let transform = match &column.transform {
        ColumnTransform::OneHot { categories } => TransformPayload::OneHot {
            categories: categories.clone(),
        },
        ColumnTransform::Standardize { mean, scale } => TransformPayload::Standardize {
            mean: *mean,
            scale: *scale,
        },
        ColumnTransform::Passthrough => TransformPayload::Passthrough,
    };
    ColumnPayload {
        name: column.name.clone(),
        transform,
    }
}

fn column_from_payload(column: ColumnPayload) -> PipelineColumn {
    let transform = match column.transform {
        TransformPayload::OneHot { categories } => ColumnTransform::OneHot { categories },
        TransformPayload::Standardize { mean, scale } => {
            ColumnTransform::Standardize { mean, scale }
        }
        TransformPayload::Passthrough => ColumnTransform::Passthrough,
    };
    PipelineColumn {
        name: column.name,
        transform,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_pipeline() -> FittedPipeline {
        FittedPipeline::new(vec![
            PipelineColumn::one_hot("scenario", ["GFDL", "GISS", "UKMO"]),
            PipelineColumn::standardize("co2_ppm", 450.0, 75.0),
            PipelineColumn::passthrough("time_slice"),
        ])
    }

    #[test]
    fn widths() {
        let pipeline = make_pipeline();
        assert_eq!(pipeline.n_inputs(), 3);
        assert_eq!(pipeline.n_outputs(), 5);
    }

    #[test]
    fn transform_encodes_row() {
        let pipeline = make_pipeline();

        let row = RawRow::new(vec![
            RawValue::text("GISS"),
            RawValue::number(525.0),
            RawValue::number(2050.0),
        ]);
        let features = pipeline.transform(&row).unwrap();

        assert_eq!(features, vec![0.0, 1.0, 0.0, 1.0, 2050.0]);
    }

    #[test]
    fn transform_rejects_unknown_category() {
        let pipeline = make_pipeline();

        let row = RawRow::new(vec![
            RawValue::text("HadCM3"),
            RawValue::number(450.0),
            RawValue::number(2050.0),
        ]);
        let err = pipeline.transform(&row).unwrap_err();

        assert!(matches!(err, EncodeError::UnknownCategory { ref field, .. } if field == "scenario"));
    }

    #[test]
    fn transform_rejects_uncoerced_types() {
        let pipeline = make_pipeline();

        // Categorical field left as a number.
        let row = RawRow::new(vec![
            RawValue::number(1.0),
            RawValue::number(450.0),
            RawValue::number(2050.0),
        ]);
        let err = pipeline.transform(&row).unwrap_err();
        assert_eq!(
            err,
            EncodeError::TypeMismatch {
                field: "scenario".into(),
                expected: "text",
                got: "number",
            }
        );

        // Numeric field left as text.
        let row = RawRow::new(vec![
            RawValue::text("GISS"),
            RawValue::text("450"),
            RawValue::number(2050.0),
        ]);
        let err = pipeline.transform(&row).unwrap_err();
        assert_eq!(
            err,
            EncodeError::TypeMismatch {
                field: "co2_ppm".into(),
                expected: "number",
                got: "text",
            }
        );
    }

    #[test]
    fn transform_rejects_wrong_width() {
        let pipeline = make_pipeline();

        let row = RawRow::new(vec![RawValue::text("GISS")]);
        let err = pipeline.transform(&row).unwrap_err();
        assert_eq!(err, EncodeError::WidthMismatch { expected: 3, got: 1 });
    }

    #[test]
    fn standardize_guards_zero_scale() {
        let pipeline = FittedPipeline::new(vec![PipelineColumn::standardize("x", 1.0, 0.0)]);

        let row = RawRow::new(vec![RawValue::number(2.0)]);
        let features = pipeline.transform(&row).unwrap();
        assert!(features[0].is_finite());
    }

    #[test]
    fn bytes_roundtrip() {
        let pipeline = make_pipeline();

        let bytes = pipeline.to_bytes().unwrap();
        let loaded = FittedPipeline::from_bytes(&bytes).unwrap();

        assert_eq!(loaded, pipeline);
    }

    #[test]
    fn save_load_roundtrip() {
        let pipeline = make_pipeline();
        let path = std::env::temp_dir().join("cropcast_pipeline_roundtrip.cyp");

        pipeline.save(&path).unwrap();
        let loaded = FittedPipeline::load(&path).unwrap();

        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, pipeline);
    }

    #[test]
    fn rejects_predictor_artifact() {
        use crate::model::{FieldMeta, LinearModel, ModelMeta, YieldModel};

        let model = YieldModel::from_linear_model(
            LinearModel::from_slice(&[1.0], 0.0),
            ModelMeta::new("wheat", vec![FieldMeta::numeric("co2")]),
        );
        let bytes = model.to_bytes().unwrap();

        let result = FittedPipeline::from_bytes(&bytes);
        assert!(matches!(result, Err(DeserializeError::KindMismatch { .. })));
    }
}
