//! Artifact serialization and deserialization.
//!
//! Models and preprocessors are stored as `.cyp` files: a fixed-size header
//! (magic, version, kind, checksum) followed by a Postcard-encoded payload.

pub mod native;
pub mod payload;

pub use native::{
    compute_checksum, ArtifactCodec, ArtifactKind, DeserializeError, FormatFlags, FormatHeader,
    SerializeError, CURRENT_VERSION_MAJOR, CURRENT_VERSION_MINOR, HEADER_SIZE, MAGIC,
};

pub use payload::{
    ArtifactBody, ArtifactMetadata, ColumnPayload, FieldPayload, LinearPayload, Payload, PayloadV1,
    PipelinePayload, TransformPayload,
};
