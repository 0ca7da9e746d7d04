//! Yield predictor types.
//!
//! [`LinearModel`] is the raw representation, [`ModelMeta`] describes the
//! fields and category tables a model was fit with, and [`YieldModel`] ties
//! the two together with artifact serialization.

mod linear;
mod meta;
mod predictor;

pub use linear::LinearModel;
pub use meta::{FieldMeta, ModelMeta, ENCODING_VERSION};
pub use predictor::YieldModel;
