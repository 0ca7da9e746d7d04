//! Payload structures for the native storage format.
//!
//! These structs are specifically designed for serialization with Postcard.
//! They mirror the runtime types but are kept independent of them so the
//! on-disk layout can evolve without touching the in-memory representations.

use serde::{Deserialize, Serialize};

// ============================================================================
// Top-Level Payload
// ============================================================================

/// Version-tagged payload enum for forward compatibility.
///
/// New format versions add new variants rather than modifying existing ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Payload {
    /// Version 1 payload format.
    V1(PayloadV1),
}

/// Version 1 payload structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadV1 {
    /// Artifact metadata.
    pub metadata: ArtifactMetadata,
    /// Kind-specific body.
    pub body: ArtifactBody,
}

// ============================================================================
// Metadata
// ============================================================================

/// Metadata common to all artifact kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Target identifier the artifact predicts for (predictors only).
    pub target: Option<String>,
    /// Version of the category-table encoding scheme.
    pub encoding_version: u16,
    /// Raw input field descriptions, in feature order.
    pub fields: Vec<FieldPayload>,
    /// Additional key-value attributes.
    pub attributes: Vec<(String, String)>,
}

impl Default for ArtifactMetadata {
    fn default() -> Self {
        Self {
            target: None,
            encoding_version: 1,
            fields: Vec::new(),
            attributes: Vec::new(),
        }
    }
}

/// Description of one raw input field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPayload {
    /// Field name.
    pub name: String,
    /// Fit-time category table for categorical fields, `None` for numeric.
    pub categories: Option<Vec<String>>,
}

// ============================================================================
// Artifact Bodies
// ============================================================================

/// Kind-specific payload variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ArtifactBody {
    /// Fitted linear predictor.
    Linear(LinearPayload),
    /// Fitted preprocessing pipeline.
    Pipeline(PipelinePayload),
}

/// Linear predictor payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearPayload {
    /// Per-feature coefficients.
    pub weights: Vec<f32>,
    /// Intercept.
    pub bias: f32,
}

/// Preprocessing pipeline payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelinePayload {
    /// Per-column transforms, in raw field order.
    pub columns: Vec<ColumnPayload>,
}

/// Single pipeline column payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnPayload {
    /// Raw field name.
    pub name: String,
    /// Fitted transform for the column.
    pub transform: TransformPayload,
}

/// Fitted column transform payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransformPayload {
    /// One-hot expansion over a memorized category table.
    OneHot {
        /// Fit-time categories, in code order.
        categories: Vec<String>,
    },
    /// Standardization with memorized statistics.
    Standardize {
        /// Fit-time mean.
        mean: f32,
        /// Fit-time scale (standard deviation).
        scale: f32,
    },
    /// Numeric passthrough.
    Passthrough,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_payload_roundtrip() {
        let payload = Payload::V1(PayloadV1 {
            metadata: ArtifactMetadata {
                target: Some("wheat".to_string()),
                encoding_version: 1,
                fields: vec![
                    FieldPayload {
                        name: "climate_model".to_string(),
                        categories: Some(vec!["GFDL".into(), "GISS".into()]),
                    },
                    FieldPayload {
                        name: "co2".to_string(),
                        categories: None,
                    },
                ],
                attributes: vec![],
            },
            body: ArtifactBody::Linear(LinearPayload {
                weights: vec![0.1, 0.2],
                bias: -3.0,
            }),
        });

        let bytes = postcard::to_allocvec(&payload).unwrap();
        assert!(!bytes.is_empty());

        let decoded: Payload = postcard::from_bytes(&bytes).unwrap();
        match decoded {
            Payload::V1(v1) => {
                assert_eq!(v1.metadata.target.as_deref(), Some("wheat"));
                assert_eq!(v1.metadata.fields.len(), 2);
                match v1.body {
                    ArtifactBody::Linear(linear) => {
                        assert_eq!(linear.weights, vec![0.1, 0.2]);
                        assert_eq!(linear.bias, -3.0);
                    }
                    _ => panic!("wrong artifact body"),
                }
            }
        }
    }

    #[test]
    fn pipeline_payload_roundtrip() {
        let pipeline = PipelinePayload {
            columns: vec![
                ColumnPayload {
                    name: "scenario".to_string(),
                    transform: TransformPayload::OneHot {
                        categories: vec!["GFDL".into(), "GISS".into(), "UKMO".into()],
                    },
                },
                ColumnPayload {
                    name: "co2_ppm".to_string(),
                    transform: TransformPayload::Standardize {
                        mean: 450.0,
                        scale: 75.0,
                    },
                },
                ColumnPayload {
                    name: "time_slice".to_string(),
                    transform: TransformPayload::Passthrough,
                },
            ],
        };

        let bytes = postcard::to_allocvec(&pipeline).unwrap();
        let decoded: PipelinePayload = postcard::from_bytes(&bytes).unwrap();

        assert_eq!(decoded.columns.len(), 3);
        assert_eq!(decoded.columns[0].name, "scenario");
        assert_eq!(
            decoded.columns[1].transform,
            TransformPayload::Standardize {
                mean: 450.0,
                scale: 75.0,
            }
        );
    }

    #[test]
    fn metadata_default() {
        let meta = ArtifactMetadata::default();
        assert!(meta.target.is_none());
        assert_eq!(meta.encoding_version, 1);
        assert!(meta.fields.is_empty());
    }
}
