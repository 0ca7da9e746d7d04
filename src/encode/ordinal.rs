//! Ordinal-code encoding.

use crate::model::ModelMeta;

use super::schema::{RawRow, RawValue};
use super::EncodeError;

/// Encoder that maps categorical values to the integer codes a model was
/// fit with.
///
/// The category tables are read from the model's metadata, so the code
/// assignment always matches fit time. Positional encodings that re-derive
/// codes from whatever candidate list the UI happens to show break silently
/// the moment the lists drift; here a value outside the table is a typed
/// [`EncodeError::UnknownCategory`] instead of a wrong code.
///
/// # Example
///
/// ```
/// use cropcast::encode::{OrdinalEncoder, RawRow, RawValue};
/// use cropcast::model::{FieldMeta, ModelMeta};
///
/// let meta = ModelMeta::new(
///     "wheat",
///     vec![
///         FieldMeta::categorical_sorted("region", ["Asia", "Europe", "Africa"]),
///         FieldMeta::numeric("co2"),
///     ],
/// );
/// let encoder = OrdinalEncoder::from_meta(&meta);
///
/// let row = RawRow::new(vec![RawValue::text("Asia"), RawValue::number(400.0)]);
/// assert_eq!(encoder.encode(&row).unwrap(), vec![1.0, 400.0]);
/// ```
#[derive(Debug, Clone)]
pub struct OrdinalEncoder {
    columns: Vec<OrdinalColumn>,
}

#[derive(Debug, Clone)]
struct OrdinalColumn {
    name: String,
    /// Fit-time category table in code order, `None` for numeric passthrough.
    table: Option<Vec<String>>,
}

impl OrdinalEncoder {
    /// Build an encoder from the category tables stored in model metadata.
    pub fn from_meta(meta: &ModelMeta) -> Self {
        let columns = meta
            .iter()
            .map(|field| OrdinalColumn {
                name: field.name.clone(),
                table: field.categories.clone(),
            })
            .collect();
        Self { columns }
    }

    /// Number of features the encoder produces (one per field).
    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    /// Encode a coerced row into the model's feature vector.
    pub fn encode(&self, row: &RawRow) -> Result<Vec<f32>, EncodeError> {
        if row.len() != self.columns.len() {
            return Err(EncodeError::WidthMismatch {
                expected: self.columns.len(),
                got: row.len(),
            });
        }

        let mut features = Vec::with_capacity(self.columns.len());
        for (column, value) in self.columns.iter().zip(row.iter()) {
            features.push(column.encode(value)?);
        }
        Ok(features)
    }
}

impl OrdinalColumn {
    fn encode(&self, value: &RawValue) -> Result<f32, EncodeError> {
        match (&self.table, value) {
            (Some(table), RawValue::Text(text)) => {
                let code = table.iter().position(|c| c == text).ok_or_else(|| {
                    EncodeError::UnknownCategory {
                        field: self.name.clone(),
                        value: text.clone(),
                        known: table.clone(),
                    }
                })?;
                Ok(code as f32)
            }
            (Some(_), RawValue::Number(_)) => Err(EncodeError::TypeMismatch {
                field: self.name.clone(),
                expected: "text",
                got: "number",
            }),
            (None, RawValue::Number(n)) => Ok(*n),
            (None, RawValue::Text(_)) => Err(EncodeError::TypeMismatch {
                field: self.name.clone(),
                expected: "number",
                got: "text",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldMeta;

    fn crop_meta() -> ModelMeta {
        ModelMeta::new(
            "wheat",
            vec![
                FieldMeta::categorical_sorted("climate_model", ["GISS", "GFDL", "UKMO", "HadCM3"]),
                FieldMeta::numeric("co2"),
                FieldMeta::categorical_sorted("adaptation", ["none", "level1", "level2"]),
                FieldMeta::categorical_sorted("region", ["Asia", "Europe", "Africa"]),
            ],
        )
    }

    fn row(climate: &str, co2: f32, adaptation: &str, region: &str) -> RawRow {
        RawRow::new(vec![
            RawValue::text(climate),
            RawValue::number(co2),
            RawValue::text(adaptation),
            RawValue::text(region),
        ])
    }

    #[test]
    fn encodes_sorted_codes() {
        let encoder = OrdinalEncoder::from_meta(&crop_meta());
        assert_eq!(encoder.n_features(), 4);

        // Sorted tables: GFDL=0 GISS=1 HadCM3=2 UKMO=3; level1=0 level2=1
        // none=2; Africa=0 Asia=1 Europe=2.
        let features = encoder.encode(&row("GISS", 400.0, "none", "Asia")).unwrap();
        assert_eq!(features, vec![1.0, 400.0, 2.0, 1.0]);

        let features = encoder.encode(&row("HadCM3", 330.0, "level1", "Europe")).unwrap();
        assert_eq!(features, vec![2.0, 330.0, 0.0, 2.0]);
    }

    #[test]
    fn unknown_category_is_an_error() {
        let encoder = OrdinalEncoder::from_meta(&crop_meta());

        let err = encoder.encode(&row("CCSM4", 400.0, "none", "Asia")).unwrap_err();
        match err {
            EncodeError::UnknownCategory { field, value, known } => {
                assert_eq!(field, "climate_model");
                assert_eq!(value, "CCSM4");
                assert_eq!(known.len(), 4);
            }
            other => panic!("expected UnknownCategory, got {other:?}"),
        }
    }

    #[test]
    fn wrong_type_is_an_error() {
        let encoder = OrdinalEncoder::from_meta(&crop_meta());

        let mixed = RawRow::new(vec![
            RawValue::number(1.0),
            RawValue::number(400.0),
            RawValue::text("none"),
            RawValue::text("Asia"),
        ]);
        let err = encoder.encode(&mixed).unwrap_err();
        assert_eq!(
            err,
            EncodeError::TypeMismatch {
                field: "climate_model".into(),
                expected: "text",
                got: "number",
            }
        );
    }

    #[test]
    fn width_mismatch_is_an_error() {
        let encoder = OrdinalEncoder::from_meta(&crop_meta());

        let short = RawRow::new(vec![RawValue::text("GISS")]);
        let err = encoder.encode(&short).unwrap_err();
        assert_eq!(err, EncodeError::WidthMismatch { expected: 4, got: 1 });
    }
}
