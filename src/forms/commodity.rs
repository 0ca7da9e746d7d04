//! Commodity variant: preprocessor-pipeline inputs, one model per group.

use std::sync::Arc;

use clap::ValueEnum;
use tracing::debug;

use crate::encode::{EncodeError, FieldSpec, FittedPipeline, FormSchema, RawRow, RawValue};
use crate::predict::{run_model, PredictError, Prediction};
use crate::registry::{load_preprocessor, ArtifactStore, LoadError, ModelRegistry};

/// Artifact stem of the shared preprocessor.
pub const PREPROCESSOR_STEM: &str = "preprocessor";

/// Time slice entry bounds.
pub const TIME_SLICE_MIN: f32 = 1990.0;
/// Time slice entry bounds.
pub const TIME_SLICE_MAX: f32 = 2100.0;
/// CO2 ppm entry bounds.
pub const CO2_PPM_MIN: f32 = 300.0;
/// CO2 ppm entry bounds.
pub const CO2_PPM_MAX: f32 = 600.0;

/// Commodity group whose yield change is predicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CommodityGroup {
    Wheat,
    Rice,
    CoarseGrains,
    ProteinFeed,
}

impl CommodityGroup {
    /// All commodity groups, in display order.
    pub const ALL: [CommodityGroup; 4] = [
        CommodityGroup::Wheat,
        CommodityGroup::Rice,
        CommodityGroup::CoarseGrains,
        CommodityGroup::ProteinFeed,
    ];

    /// Group label as it appears in the study data.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wheat => "Wheat",
            Self::Rice => "Rice",
            Self::CoarseGrains => "Coarse Grains",
            Self::ProteinFeed => "Protein Feed",
        }
    }

    /// Artifact stem of the group's model file.
    pub fn model_stem(&self) -> String {
        let slug = match self {
            Self::Wheat => "wheat",
            Self::Rice => "rice",
            Self::CoarseGrains => "coarse_grains",
            Self::ProteinFeed => "protein_feed",
        };
        format!("{slug}_group_model")
    }
}

/// BLS site code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BlsCode {
    #[value(name = "913")]
    Site913,
    #[value(name = "914")]
    Site914,
    #[value(name = "915")]
    Site915,
    #[value(name = "916")]
    Site916,
    #[value(name = "917")]
    Site917,
}

impl BlsCode {
    /// All site codes, in display order.
    pub const ALL: [BlsCode; 5] = [
        BlsCode::Site913,
        BlsCode::Site914,
        BlsCode::Site915,
        BlsCode::Site916,
        BlsCode::Site917,
    ];

    /// Numeric site code.
    pub fn code(&self) -> u16 {
        match self {
            Self::Site913 => 913,
            Self::Site914 => 914,
            Self::Site915 => 915,
            Self::Site916 => 916,
            Self::Site917 => 917,
        }
    }

    /// Site code as the preprocessor's category label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Site913 => "913",
            Self::Site914 => "914",
            Self::Site915 => "915",
            Self::Site916 => "916",
            Self::Site917 => "917",
        }
    }
}

/// Climate scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    #[value(name = "GISS")]
    Giss,
    #[value(name = "GFDL")]
    Gfdl,
    #[value(name = "UKMO")]
    Ukmo,
}

impl Scenario {
    /// All scenarios, in display order.
    pub const ALL: [Scenario; 3] = [Scenario::Giss, Scenario::Gfdl, Scenario::Ukmo];

    /// Scenario label as it appears in the study data.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Giss => "GISS",
            Self::Gfdl => "GFDL",
            Self::Ukmo => "UKMO",
        }
    }
}

/// Whether direct CO2 effects are included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Co2Effects {
    #[value(name = "EquilibriuYes")]
    Yes,
    #[value(name = "EquilibriuNo")]
    No,
}

impl Co2Effects {
    /// All options, in display order.
    pub const ALL: [Co2Effects; 2] = [Co2Effects::Yes, Co2Effects::No];

    /// Option label as it appears in the study data (truncated spelling
    /// included).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "EquilibriuYes",
            Self::No => "EquilibriuNo",
        }
    }
}

/// Adaptation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CommodityAdaptation {
    No,
    Level1,
    Level2,
}

impl CommodityAdaptation {
    /// All adaptation levels, in display order.
    pub const ALL: [CommodityAdaptation; 3] = [
        CommodityAdaptation::No,
        CommodityAdaptation::Level1,
        CommodityAdaptation::Level2,
    ];

    /// Level label as it appears in the study data.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::No => "No",
            Self::Level1 => "Level 1",
            Self::Level2 => "Level 2",
        }
    }
}

/// One set of user selections for a commodity prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommodityInputs {
    pub bls_code: BlsCode,
    pub scenario: Scenario,
    pub time_slice: f32,
    pub co2_effects: Co2Effects,
    pub co2_ppm: f32,
    pub adaptation: CommodityAdaptation,
}

impl CommodityInputs {
    /// Build the coerced raw row for this selection, in raw column order.
    ///
    /// The site code enters as a number and coerces to text, since the
    /// preprocessor treats it as a categorical label.
    pub fn to_row(&self) -> Result<RawRow, EncodeError> {
        schema().coerce(&[
            RawValue::number(f32::from(self.bls_code.code())),
            RawValue::text(self.scenario.as_str()),
            RawValue::number(self.time_slice),
            RawValue::text(self.co2_effects.as_str()),
            RawValue::number(self.co2_ppm),
            RawValue::text(self.adaptation.as_str()),
        ])
    }
}

/// The commodity variant's input form, in raw column order.
pub fn schema() -> FormSchema {
    FormSchema::new(vec![
        FieldSpec::select("bls_code", BlsCode::ALL.map(|c| c.as_str())),
        FieldSpec::select("scenario", Scenario::ALL.map(|s| s.as_str())),
        FieldSpec::number("time_slice", TIME_SLICE_MIN, TIME_SLICE_MAX),
        FieldSpec::select("co2_effects", Co2Effects::ALL.map(|c| c.as_str())),
        FieldSpec::number("co2_ppm", CO2_PPM_MIN, CO2_PPM_MAX),
        FieldSpec::select("adaptation", CommodityAdaptation::ALL.map(|a| a.as_str())),
    ])
}

/// One interactive commodity-prediction session.
///
/// The shared preprocessor is loaded once when the session opens; its load
/// outcome is held for the session lifetime. Predictors load lazily through
/// the registry.
#[derive(Debug)]
pub struct CommoditySession {
    registry: ModelRegistry,
    preprocessor: Result<Arc<FittedPipeline>, LoadError>,
}

impl CommoditySession {
    /// Open a session over an artifact store.
    pub fn open(store: ArtifactStore) -> Self {
        let preprocessor = load_preprocessor(&store, PREPROCESSOR_STEM).map(Arc::new);
        Self {
            registry: ModelRegistry::new(store),
            preprocessor,
        }
    }

    /// Predict the yield change for a commodity group under the given
    /// selections.
    pub fn predict(
        &mut self,
        group: CommodityGroup,
        inputs: &CommodityInputs,
    ) -> Result<Prediction, PredictError> {
        debug!(group = group.as_str(), "commodity prediction requested");

        let preprocessor = match &self.preprocessor {
            Ok(pipeline) => Arc::clone(pipeline),
            Err(reason) => {
                return Err(PredictError::PreprocessorUnavailable {
                    reason: reason.clone(),
                });
            }
        };

        let model = self
            .registry
            .get(&group.model_stem())
            .map_err(|reason| PredictError::TargetUnavailable {
                target: group.as_str().to_string(),
                reason,
            })?;

        let row = inputs.to_row()?;
        let features = preprocessor.transform(&row)?;

        run_model(&model, group.as_str(), &features)
    }

    /// The shared preprocessor's load outcome.
    pub fn preprocessor(&self) -> &Result<Arc<FittedPipeline>, LoadError> {
        &self.preprocessor
    }

    /// Check whether a group's model (and the preprocessor) are available.
    pub fn available(&mut self, group: CommodityGroup) -> bool {
        self.preprocessor.is_ok() && self.registry.is_available(&group.model_stem())
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
    fn group_stems() {
        assert_eq!(CommodityGroup::Wheat.model_stem(), "wheat_group_model");
        assert_eq!(
            CommodityGroup::CoarseGrains.model_stem(),
            "coarse_grains_group_model"
        );
    }

    #[test]
    fn schema_matches_column_order() {
        let schema = schema();
        assert_eq!(schema.n_fields(), 6);
        assert_eq!(schema.field(0).unwrap().name, "bls_code");
        assert_eq!(schema.field(2).unwrap().name, "time_slice");
        assert_eq!(schema.field(5).unwrap().name, "adaptation");
    }

    #[test]
    fn inputs_to_row_coerces_site_code() {
        let inputs = CommodityInputs {
            bls_code: BlsCode::Site913,
            scenario: Scenario::Giss,
            time_slice: 2025.0,
            co2_effects: Co2Effects::Yes,
            co2_ppm: 450.0,
            adaptation: CommodityAdaptation::No,
        };
        let row = inputs.to_row().unwrap();

        assert_eq!(row.get(0), Some(&RawValue::text("913")));
        assert_eq!(row.get(1), Some(&RawValue::text("GISS")));
        assert_eq!(row.get(2), Some(&RawValue::number(2025.0)));
        assert_eq!(row.get(3), Some(&RawValue::text("EquilibriuYes")));
        assert_eq!(row.get(5), Some(&RawValue::text("No")));
    }

    #[test]
    fn site_codes() {
        assert_eq!(BlsCode::Site913.code(), 913);
        assert_eq!(BlsCode::Site917.as_str(), "917");
        assert_eq!(BlsCode::ALL.len(), 5);
    }

    #[test]
    fn study_data_labels() {
        assert_eq!(Co2Effects::Yes.as_str(), "EquilibriuYes");
        assert_eq!(CommodityAdaptation::Level1.as_str(), "Level 1");
        assert_eq!(CommodityGroup::ProteinFeed.as_str(), "Protein Feed");
    }
}
