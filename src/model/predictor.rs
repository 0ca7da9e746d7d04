//! High-level yield predictor.
//!
//! Wraps the linear representation with metadata and artifact serialization.

use std::path::Path;

use crate::artifact::{
    ArtifactBody, ArtifactCodec, ArtifactKind, ArtifactMetadata, DeserializeError, FieldPayload,
    FormatFlags, FormatHeader, LinearPayload, Payload, PayloadV1, SerializeError,
};
use crate::model::linear::LinearModel;
use crate::model::meta::{FieldMeta, ModelMeta, ENCODING_VERSION};

/// A fitted yield predictor for one target.
///
/// Immutable once loaded: prediction never mutates the model, so a loaded
/// instance can be shared freely behind an `Arc`.
///
/// # Example
///
/// ```ignore
/// use cropcast::model::YieldModel;
///
/// let model = YieldModel::load("models/wheat_model.cyp")?;
/// let change_pct = model.predict_row(&[1.0, 400.0, 2.0, 1.0]);
/// ```
pub struct YieldModel {
    /// The underlying linear regression.
    model: LinearModel,
    /// Field descriptions and category tables from fit time.
    meta: ModelMeta,
}

impl YieldModel {
    /// Create a predictor from an existing linear model and metadata.
    ///
    /// # Panics
    ///
    /// Panics if the metadata field count doesn't match the model width.
    pub fn from_linear_model(model: LinearModel, meta: ModelMeta) -> Self {
        assert_eq!(
            meta.n_features(),
            model.n_features(),
            "metadata describes {} fields but model has {} weights",
            meta.n_features(),
            model.n_features()
        );
        Self { model, meta }
    }

    /// Get reference to the underlying linear model.
    pub fn linear_model(&self) -> &LinearModel {
        &self.model
    }

    /// Get reference to model metadata.
    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    /// Target identifier this model predicts for.
    pub fn target(&self) -> &str {
        &self.meta.target
    }

    /// Number of input features.
    pub fn n_features(&self) -> usize {
        self.model.n_features()
    }

    /// Predict the yield change percentage for a single encoded row.
    ///
    /// # Panics
    ///
    /// Panics if `features.len() != n_features`. The dispatcher validates
    /// the width first and reports a typed error instead.
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        self.model.predict_row(features)
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// Serialize the model to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializeError> {
        let payload = Payload::V1(PayloadV1 {
            metadata: ArtifactMetadata {
                target: Some(self.meta.target.clone()),
                encoding_version: self.meta.encoding_version,
                fields: self.meta.iter().map(field_to_payload).collect(),
                attributes: Vec::new(),
            },
            body: ArtifactBody::Linear(LinearPayload {
                weights: self.model.weights().to_vec(),
                bias: self.model.bias(),
            }),
        });

        let mut header = FormatHeader::new(ArtifactKind::Linear, self.n_features() as u32, 1);
        if self.meta.has_categorical() {
            header.flags.set(FormatFlags::HAS_CATEGORY_TABLES);
        }

        ArtifactCodec::new().serialize(header, &payload)
    }

    /// Deserialize a model from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DeserializeError> {
        let codec = ArtifactCodec::new();
        let (header, payload) = codec.deserialize::<Payload>(bytes, ArtifactKind::Linear)?;

        let Payload::V1(v1) = payload;

        let target = v1
            .metadata
            .target
            .ok_or_else(|| DeserializeError::CorruptPayload("predictor has no target".into()))?;

        if v1.metadata.encoding_version > ENCODING_VERSION {
            return Err(DeserializeError::CorruptPayload(format!(
                "unknown category-table version {}",
                v1.metadata.encoding_version
            )));
        }

        let ArtifactBody::Linear(linear) = v1.body else {
            return Err(DeserializeError::CorruptPayload(
                "header says predictor but payload is not".into(),
            ));
        };

        if linear.weights.len() != v1.metadata.fields.len() {
            return Err(DeserializeError::CorruptPayload(format!(
                "{} weights for {} fields",
                linear.weights.len(),
                v1.metadata.fields.len()
            )));
        }
        if linear.weights.len() != header.n_inputs as usize {
            return Err(DeserializeError::CorruptPayload(format!(
                "header says {} inputs but payload has {} weights",
                header.n_inputs,
                linear.weights.len()
            )));
        }

        let meta = ModelMeta {
            target,
            fields: v1.metadata.fields.into_iter().map(field_from_payload).collect(),
            encoding_version: v1.metadata.encoding_version,
        };
        let model = LinearModel::from_slice(&linear.weights, linear.bias);

        Ok(Self { model, meta })
    }

    /// Save the model to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SerializeError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load a model from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DeserializeError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

impl std::fmt::Debug for YieldModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YieldModel")
            .field("target", &self.target())
            .field("n_features", &self.n_features())
            .finish()
    }
}

fn field_to_payload(field: &FieldMeta) -> FieldPayload {
    FieldPayload {
        name: field.name.clone(),
        categories: field.categories.clone(),
    }
}

fn field_from_payload(field: FieldPayload) -> FieldMeta {
    FieldMeta {
        name: field.name,
        categories: field.categories,
    }
}
