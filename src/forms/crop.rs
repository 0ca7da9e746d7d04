//! Crop variant: ordinal-coded inputs, one model per crop.

use clap::ValueEnum;
use tracing::debug;

use crate::encode::{EncodeError, FieldSpec, FormSchema, OrdinalEncoder, RawRow, RawValue};
use crate::model::FieldMeta;
use crate::predict::{run_model, PredictError, Prediction};
use crate::registry::{ArtifactStore, ModelRegistry};

/// CO2 ppm entry bounds.
pub const CO2_MIN: f32 = 300.0;
/// CO2 ppm entry bounds.
pub const CO2_MAX: f32 = 600.0;

/// Crop whose yield change is predicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Crop {
    Wheat,
    Rice,
    Coarse,
    Soybean,
}

impl Crop {
    /// All crops, in display order.
    pub const ALL: [Crop; 4] = [Crop::Wheat, Crop::Rice, Crop::Coarse, Crop::Soybean];

    /// Lowercase crop name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wheat => "wheat",
            Self::Rice => "rice",
            Self::Coarse => "coarse",
            Self::Soybean => "soybean",
        }
    }

    /// Artifact stem of the crop's model file.
    pub fn model_stem(&self) -> String {
        format!("{}_model", self.as_str())
    }
}

/// Climate model scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClimateModel {
    #[value(name = "GISS")]
    Giss,
    #[value(name = "GFDL")]
    Gfdl,
    #[value(name = "UKMO")]
    Ukmo,
    #[value(name = "HadCM3")]
    HadCm3,
}

impl ClimateModel {
    /// All climate models, in display order.
    pub const ALL: [ClimateModel; 4] = [
        ClimateModel::Giss,
        ClimateModel::Gfdl,
        ClimateModel::Ukmo,
        ClimateModel::HadCm3,
    ];

    /// Scenario label as it appears in the study data.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Giss => "GISS",
            Self::Gfdl => "GFDL",
            Self::Ukmo => "UKMO",
            Self::HadCm3 => "HadCM3",
        }
    }
}

/// Adaptation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Adaptation {
    None,
    Level1,
    Level2,
}

impl Adaptation {
    /// All adaptation levels, in display order.
    pub const ALL: [Adaptation; 3] = [Adaptation::None, Adaptation::Level1, Adaptation::Level2];

    /// Level label as it appears in the study data.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Level1 => "level1",
            Self::Level2 => "level2",
        }
    }
}

/// World region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Region {
    Asia,
    Europe,
    Africa,
}

impl Region {
    /// All regions, in display order.
    pub const ALL: [Region; 3] = [Region::Asia, Region::Europe, Region::Africa];

    /// Region label as it appears in the study data.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asia => "Asia",
            Self::Europe => "Europe",
            Self::Africa => "Africa",
        }
    }
}

/// One set of user selections for a crop prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropInputs {
    pub climate_model: ClimateModel,
    pub co2: f32,
    pub adaptation: Adaptation,
    pub region: Region,
}

impl CropInputs {
    /// Build the coerced raw row for this selection, in feature order.
    pub fn to_row(&self) -> Result<RawRow, EncodeError> {
        schema().coerce(&[
            RawValue::text(self.climate_model.as_str()),
            RawValue::number(self.co2),
            RawValue::text(self.adaptation.as_str()),
            RawValue::text(self.region.as_str()),
        ])
    }
}

/// The crop variant's input form, in feature order.
pub fn schema() -> FormSchema {
    FormSchema::new(vec![
        FieldSpec::select("climate_model", ClimateModel::ALL.map(|c| c.as_str())),
        FieldSpec::number("co2", CO2_MIN, CO2_MAX),
        FieldSpec::select("adaptation", Adaptation::ALL.map(|a| a.as_str())),
        FieldSpec::select("region", Region::ALL.map(|r| r.as_str())),
    ])
}

/// Field metadata the crop models are fit with.
///
/// Category tables hold the candidate options in sorted order; each value's
/// position is its code. Artifact producers embed these tables so encoders
/// reconstruct the same assignment at prediction time.
pub fn model_fields() -> Vec<FieldMeta> {
    vec![
        FieldMeta::categorical_sorted("climate_model", ClimateModel::ALL.map(|c| c.as_str())),
        FieldMeta::numeric("co2"),
        FieldMeta::categorical_sorted("adaptation", Adaptation::ALL.map(|a| a.as_str())),
        FieldMeta::categorical_sorted("region", Region::ALL.map(|r| r.as_str())),
    ]
}

/// One interactive crop-prediction session.
///
/// Owns the model registry; predictors load lazily on first use and stay
/// cached for the session lifetime.
#[derive(Debug)]
pub struct CropSession {
    registry: ModelRegistry,
}

impl CropSession {
    /// Open a session over an artifact store.
    pub fn new(store: ArtifactStore) -> Self {
        Self {
            registry: ModelRegistry::new(store),
        }
    }

    /// Predict the yield change for a crop under the given selections.
    pub fn predict(
        &mut self,
        crop: Crop,
        inputs: &CropInputs,
    ) -> Result<Prediction, PredictError> {
        debug!(crop = crop.as_str(), "crop prediction requested");

        let model = self
            .registry
            .get(&crop.model_stem())
            .map_err(|reason| PredictError::TargetUnavailable {
                target: crop.as_str().to_string(),
                reason,
            })?;

        let encoder = OrdinalEncoder::from_meta(model.meta());
        let row = inputs.to_row()?;
        let features = encoder.encode(&row)?;

        run_model(&model, crop.as_str(), &features)
    }

    /// Check whether a crop's model is available.
    pub fn available(&mut self, crop: Crop) -> bool {
        self.registry.is_available(&crop.model_stem())
    }

    /// The session's registry.
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_stems() {
        assert_eq!(Crop::Wheat.model_stem(), "wheat_model");
        assert_eq!(Crop::Coarse.model_stem(), "coarse_model");
    }

    #[test]
    fn schema_matches_feature_order() {
        let schema = schema();
        assert_eq!(schema.n_fields(), 4);
        assert_eq!(schema.field(0).unwrap().name, "climate_model");
        assert_eq!(schema.field(1).unwrap().name, "co2");
        assert_eq!(schema.field(2).unwrap().name, "adaptation");
        assert_eq!(schema.field(3).unwrap().name, "region");
    }

    #[test]
    fn model_fields_use_sorted_tables() {
        let fields = model_fields();
        assert_eq!(
            fields[0].categories.as_deref(),
            Some(
                &[
                    "GFDL".to_string(),
                    "GISS".to_string(),
                    "HadCM3".to_string(),
                    "UKMO".to_string(),
                ][..]
            )
        );
        assert!(!fields[1].is_categorical());
    }

    #[test]
    fn inputs_to_row() {
        let inputs = CropInputs {
            climate_model: ClimateModel::Giss,
            co2: 400.0,
            adaptation: Adaptation::None,
            region: Region::Asia,
        };
        let row = inputs.to_row().unwrap();

        assert_eq!(row.len(), 4);
        assert_eq!(row.get(0), Some(&RawValue::text("GISS")));
        assert_eq!(row.get(1), Some(&RawValue::number(400.0)));
    }

    #[test]
    fn encoder_width_matches_model_fields() {
        use crate::model::ModelMeta;

        let meta = ModelMeta::new("wheat", model_fields());
        let encoder = OrdinalEncoder::from_meta(&meta);

        // Every valid selection encodes to the model's width.
        for climate in ClimateModel::ALL {
            for adaptation in Adaptation::ALL {
                for region in Region::ALL {
                    let inputs = CropInputs {
                        climate_model: climate,
                        co2: 450.0,
                        adaptation,
                        region,
                    };
                    let features = encoder.encode(&inputs.to_row().unwrap()).unwrap();
                    assert_eq!(features.len(), meta.n_features());
                }
            }
        }
    }
}
