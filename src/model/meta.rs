//! Model metadata.
//!
//! Every predictor artifact carries the field descriptions it was fit with,
//! including the category-to-code tables for categorical fields. Encoders are
//! derived from this metadata at prediction time, so the code assignment can
//! never drift from what the model saw during fitting.

use serde::{Deserialize, Serialize};

/// Version of the category-table encoding scheme.
pub const ENCODING_VERSION: u16 = 1;

/// Description of one raw input field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMeta {
    /// Field name.
    pub name: String,
    /// Fit-time category table, in code order. `None` for numeric fields.
    pub categories: Option<Vec<String>>,
}

impl FieldMeta {
    /// Create metadata for a numeric field.
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            categories: None,
        }
    }

    /// Create metadata for a categorical field with an explicit code order.
    pub fn categorical<S: Into<String>>(
        name: impl Into<String>,
        categories: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            categories: Some(categories.into_iter().map(Into::into).collect()),
        }
    }

    /// Create metadata for a categorical field, sorting the candidates into
    /// code order first.
    ///
    /// This is how the crop models assign codes: the candidate list is sorted
    /// lexicographically and each value's position becomes its code.
    pub fn categorical_sorted<S: Into<String>>(
        name: impl Into<String>,
        categories: impl IntoIterator<Item = S>,
    ) -> Self {
        let mut cats: Vec<String> = categories.into_iter().map(Into::into).collect();
        cats.sort();
        Self {
            name: name.into(),
            categories: Some(cats),
        }
    }

    /// Returns true if this is a categorical field.
    pub fn is_categorical(&self) -> bool {
        self.categories.is_some()
    }
}

/// Metadata carried by every predictor artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Target identifier the model predicts yield change for.
    pub target: String,
    /// Raw input fields, in feature order.
    pub fields: Vec<FieldMeta>,
    /// Version of the category-table encoding scheme.
    pub encoding_version: u16,
}

impl ModelMeta {
    /// Create metadata for a target with the given fields.
    pub fn new(target: impl Into<String>, fields: Vec<FieldMeta>) -> Self {
        Self {
            target: target.into(),
            fields,
            encoding_version: ENCODING_VERSION,
        }
    }

    /// Number of input features.
    pub fn n_features(&self) -> usize {
        self.fields.len()
    }

    /// Get metadata for a field by index.
    pub fn field(&self, index: usize) -> Option<&FieldMeta> {
        self.fields.get(index)
    }

    /// Check if any field is categorical.
    pub fn has_categorical(&self) -> bool {
        self.fields.iter().any(|f| f.is_categorical())
    }

    /// Get an iterator over field metadata.
    pub fn iter(&self) -> impl Iterator<Item = &FieldMeta> {
        self.fields.iter()
    }
}
