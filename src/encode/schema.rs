//! Form schemas and raw input rows.
//!
//! A [`FormSchema`] describes the fields one app variant presents: each field
//! is either a select with a fixed option set or a bounded numeric entry.
//! [`FormSchema::coerce`] applies the per-field type coercion that must happen
//! before any encoding: select values become text (numeric-looking site codes
//! included), numeric values become `f32`.

use super::EncodeError;

/// A single raw field value, before encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Generic text value (categorical fields).
    Text(String),
    /// Floating-point value (numeric fields).
    Number(f32),
}

impl RawValue {
    /// Create a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Create a numeric value.
    pub fn number(value: f32) -> Self {
        Self::Number(value)
    }

    /// Name of the value's type, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Number(_) => "number",
        }
    }
}

/// One user-selected record, positionally aligned with its schema.
///
/// Created fresh per prediction request and discarded after use.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    values: Vec<RawValue>,
}

impl RawRow {
    /// Create a row from field values.
    pub fn new(values: Vec<RawValue>) -> Self {
        Self { values }
    }

    /// Number of field values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the row has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a field value by position.
    pub fn get(&self, index: usize) -> Option<&RawValue> {
        self.values.get(index)
    }

    /// Get an iterator over field values.
    pub fn iter(&self) -> impl Iterator<Item = &RawValue> {
        self.values.iter()
    }
}

impl From<Vec<RawValue>> for RawRow {
    fn from(values: Vec<RawValue>) -> Self {
        Self::new(values)
    }
}

/// Input widget semantics for a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Selection over a fixed option set.
    Select {
        /// The options presented, in display order.
        options: Vec<String>,
    },
    /// Bounded numeric entry.
    Number {
        /// Minimum accepted value.
        min: f32,
        /// Maximum accepted value.
        max: f32,
    },
}

/// One field of an input form.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Field name.
    pub name: String,
    /// Input widget semantics.
    pub kind: FieldKind,
}

impl FieldSpec {
    /// Create a select field with a fixed option set.
    pub fn select<S: Into<String>>(
        name: impl Into<String>,
        options: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Select {
                options: options.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Create a bounded numeric field.
    pub fn number(name: impl Into<String>, min: f32, max: f32) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Number { min, max },
        }
    }

    /// Returns true for select fields.
    pub fn is_select(&self) -> bool {
        matches!(self.kind, FieldKind::Select { .. })
    }
}

/// Schema describing one app variant's input form.
///
/// The two variants' schemas are distinct values with different field sets
/// and are not interchangeable.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSchema {
    fields: Vec<FieldSpec>,
}

impl FormSchema {
    /// Create a schema from field specs.
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Number of fields.
    pub fn n_fields(&self) -> usize {
        self.fields.len()
    }

    /// Get a field spec by position.
    pub fn field(&self, index: usize) -> Option<&FieldSpec> {
        self.fields.get(index)
    }

    /// Get an iterator over field specs.
    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    /// Apply per-field type coercion, producing a row ready for encoding.
    ///
    /// Select fields become text (numbers are rendered, so a site code
    /// entered as `913` coerces to `"913"`); numeric fields must already be
    /// numbers. A text value in a numeric field is a [`EncodeError::TypeMismatch`].
    pub fn coerce(&self, values: &[RawValue]) -> Result<RawRow, EncodeError> {
        if values.len() != self.fields.len() {
            return Err(EncodeError::WidthMismatch {
                expected: self.fields.len(),
                got: values.len(),
            });
        }

        let mut coerced = Vec::with_capacity(values.len());
        for (spec, value) in self.fields.iter().zip(values) {
            let value = match (&spec.kind, value) {
                (FieldKind::Select { .. }, RawValue::Text(text)) => RawValue::Text(text.clone()),
                (FieldKind::Select { .. }, RawValue::Number(n)) => {
                    RawValue::Text(render_number(*n))
                }
                (FieldKind::Number { .. }, RawValue::Number(n)) => RawValue::Number(*n),
                (FieldKind::Number { .. }, RawValue::Text(_)) => {
                    return Err(EncodeError::TypeMismatch {
                        field: spec.name.clone(),
                        expected: "number",
                        got: "text",
                    });
                }
            };
            coerced.push(value);
        }

        Ok(RawRow::new(coerced))
    }
}

/// Render a numeric value the way a select option would display it.
///
/// Integral values drop the fraction, so `913.0` renders as `"913"`.
fn render_number(value: f32) -> String {
    if value.fract() == 0.0 && value.abs() < 1e9 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::select("bls_code", ["913", "914", "915"]),
            FieldSpec::select("scenario", ["GISS", "GFDL", "UKMO"]),
            FieldSpec::number("co2_ppm", 300.0, 600.0),
        ])
    }

    #[test]
    fn schema_accessors() {
        let schema = schema();
        assert_eq!(schema.n_fields(), 3);
        assert!(schema.field(0).unwrap().is_select());
        assert!(!schema.field(2).unwrap().is_select());
        assert!(schema.field(3).is_none());
    }

    #[test]
    fn coerce_passes_matching_types() {
        let schema = schema();
        let row = schema
            .coerce(&[
                RawValue::text("913"),
                RawValue::text("GISS"),
                RawValue::number(450.0),
            ])
            .unwrap();

        assert_eq!(row.get(0), Some(&RawValue::text("913")));
        assert_eq!(row.get(2), Some(&RawValue::number(450.0)));
    }

    #[test]
    fn coerce_renders_numeric_selects_as_text() {
        let schema = schema();
        let row = schema
            .coerce(&[
                RawValue::number(913.0),
                RawValue::text("GISS"),
                RawValue::number(450.0),
            ])
            .unwrap();

        assert_eq!(row.get(0), Some(&RawValue::text("913")));
    }

    #[test]
    fn coerce_rejects_text_in_numeric_field() {
        let schema = schema();
        let err = schema
            .coerce(&[
                RawValue::text("913"),
                RawValue::text("GISS"),
                RawValue::text("450"),
            ])
            .unwrap_err();

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
    fn coerce_rejects_wrong_width() {
        let schema = schema();
        let err = schema.coerce(&[RawValue::text("913")]).unwrap_err();

        assert_eq!(err, EncodeError::WidthMismatch { expected: 3, got: 1 });
    }

    #[test]
    fn render_number_drops_integral_fraction() {
        assert_eq!(render_number(913.0), "913");
        assert_eq!(render_number(2025.0), "2025");
        assert_eq!(render_number(2.5), "2.5");
    }
}
