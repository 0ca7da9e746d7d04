//! The two prediction app variants.
//!
//! [`crop`] is the ordinal-code variant: four crops, one model file per crop,
//! categorical fields coded from the tables stored with each model.
//! [`commodity`] is the pipeline variant: commodity groups, one model file per
//! group plus a shared preprocessor artifact that owns all input encoding.
//!
//! The variants' input schemas are distinct and not interchangeable.

pub mod commodity;
pub mod crop;
