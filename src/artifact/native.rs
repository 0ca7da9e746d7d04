//! Native `.cyp` storage format for cropcast artifacts.
//!
//! The format consists of a 32-byte header followed by a Postcard-encoded
//! payload. Both predictor and preprocessor artifacts share this container;
//! the header's kind byte tells them apart before the payload is touched.
//!
//! # Format Structure
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Header (32 bytes)                        │
//! ├────────────────────────────────────────────────────────────┤
//! │                    Payload (variable)                       │
//! └────────────────────────────────────────────────────────────┘
//! ```

use std::io::{Read, Write};

use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Magic bytes identifying a cropcast artifact file.
pub const MAGIC: &[u8; 4] = b"CYLD";

/// Current format version (major).
pub const CURRENT_VERSION_MAJOR: u8 = 1;

/// Current format version (minor).
pub const CURRENT_VERSION_MINOR: u8 = 0;

/// Size of the format header in bytes.
pub const HEADER_SIZE: usize = 32;

// ============================================================================
// Artifact Kind
// ============================================================================

/// Artifact kind identifier stored in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ArtifactKind {
    /// Fitted linear yield predictor.
    Linear = 0,
    /// Fitted preprocessing pipeline.
    Pipeline = 1,
}

impl ArtifactKind {
    /// Convert from u8, returning None for unknown values.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Linear),
            1 => Some(Self::Pipeline),
            _ => None,
        }
    }
}

// ============================================================================
// Format Flags
// ============================================================================

/// Bitfield flags for format features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatFlags(u16);

impl FormatFlags {
    /// Artifact carries fit-time category tables.
    pub const HAS_CATEGORY_TABLES: u16 = 1 << 0;

    /// Create empty flags.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Create flags from raw value.
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Get raw bits.
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Check if a flag is set.
    pub const fn contains(self, flag: u16) -> bool {
        (self.0 & flag) != 0
    }

    /// Set a flag.
    pub fn set(&mut self, flag: u16) {
        self.0 |= flag;
    }

    /// Clear a flag.
    pub fn clear(&mut self, flag: u16) {
        self.0 &= !flag;
    }
}

// ============================================================================
// Format Header
// ============================================================================

/// 32-byte header for the native storage format.
///
/// # Layout
///
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     Magic ("CYLD")
/// 4       1     Version major
/// 5       1     Version minor
/// 6       1     Artifact kind
/// 7       1     Reserved (padding)
/// 8       2     Flags (bitfield)
/// 10      2     Reserved
/// 12      4     Payload size (bytes)
/// 16      4     CRC32 checksum of payload
/// 20      4     Number of raw inputs
/// 24      4     Number of outputs
/// 28      4     Reserved
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatHeader {
    /// Format version (major).
    pub version_major: u8,
    /// Format version (minor).
    pub version_minor: u8,
    /// Artifact kind.
    pub kind: ArtifactKind,
    /// Feature flags.
    pub flags: FormatFlags,
    /// Size of the payload in bytes.
    pub payload_size: u32,
    /// CRC32 checksum of the payload.
    pub checksum: u32,
    /// Number of raw input fields the artifact consumes.
    pub n_inputs: u32,
    /// Number of values the artifact produces per row.
    pub n_outputs: u32,
}

impl FormatHeader {
    /// Create a new header with current version.
    pub fn new(kind: ArtifactKind, n_inputs: u32, n_outputs: u32) -> Self {
        Self {
            version_major: CURRENT_VERSION_MAJOR,
            version_minor: CURRENT_VERSION_MINOR,
            kind,
            flags: FormatFlags::empty(),
            payload_size: 0,
            checksum: 0,
            n_inputs,
            n_outputs,
        }
    }

    /// Serialize header to 32 bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];

        buf[0..4].copy_from_slice(MAGIC);
        buf[4] = self.version_major;
        buf[5] = self.version_minor;
        buf[6] = self.kind as u8;
        buf[7] = 0;
        buf[8..10].copy_from_slice(&self.flags.bits().to_le_bytes());
        buf[10..12].copy_from_slice(&[0, 0]);
        buf[12..16].copy_from_slice(&self.payload_size.to_le_bytes());
        buf[16..20].copy_from_slice(&self.checksum.to_le_bytes());
        buf[20..24].copy_from_slice(&self.n_inputs.to_le_bytes());
        buf[24..28].copy_from_slice(&self.n_outputs.to_le_bytes());
        buf[28..32].copy_from_slice(&[0, 0, 0, 0]);

        buf
    }

    /// Parse header from 32 bytes.
    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Result<Self, DeserializeError> {
        if &buf[0..4] != MAGIC {
            return Err(DeserializeError::NotAnArtifact);
        }

        let version_major = buf[4];
        let version_minor = buf[5];

        if version_major > CURRENT_VERSION_MAJOR {
            return Err(DeserializeError::UnsupportedVersion {
                major: version_major,
                minor: version_minor,
            });
        }

        let kind = ArtifactKind::from_u8(buf[6])
            .ok_or(DeserializeError::CorruptPayload("invalid artifact kind".into()))?;

        let flags = FormatFlags::from_bits(u16::from_le_bytes([buf[8], buf[9]]));
        let payload_size = u32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]);
        let checksum = u32::from_le_bytes([buf[16], buf[17], buf[18], buf[19]]);
        let n_inputs = u32::from_le_bytes([buf[20], buf[21], buf[22], buf[23]]);
        let n_outputs = u32::from_le_bytes([buf[24], buf[25], buf[26], buf[27]]);

        Ok(Self {
            version_major,
            version_minor,
            kind,
            flags,
            payload_size,
            checksum,
            n_inputs,
            n_outputs,
        })
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during serialization.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Postcard encoding error.
    #[error("encoding error: {0}")]
    Encoding(#[from] postcard::Error),
}

/// Errors that can occur during deserialization.
#[derive(Debug, Error)]
pub enum DeserializeError {
    /// File is not a cropcast artifact (wrong magic).
    #[error("not a cropcast artifact file")]
    NotAnArtifact,

    /// Artifact requires a newer version of cropcast.
    #[error("artifact requires cropcast format {major}.{minor} or later", major = .major, minor = .minor)]
    UnsupportedVersion { major: u8, minor: u8 },

    /// Payload checksum doesn't match.
    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// File was truncated or incomplete.
    #[error("file truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// Payload is corrupt or malformed.
    #[error("corrupt payload: {0}")]
    CorruptPayload(String),

    /// Artifact kind mismatch (e.g., expected a predictor but got a pipeline).
    #[error("artifact kind mismatch: expected {expected:?}, got {actual:?}")]
    KindMismatch {
        expected: ArtifactKind,
        actual: ArtifactKind,
    },

    /// I/O error during reading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Postcard decoding error.
    #[error("decoding error: {0}")]
    Decoding(#[from] postcard::Error),
}

// ============================================================================
// CRC32 Helper
// ============================================================================

/// Compute CRC32 checksum of data.
pub fn compute_checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

// ============================================================================
// Artifact Codec
// ============================================================================

/// Codec for serializing/deserializing artifacts in native format.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactCodec;

impl ArtifactCodec {
    /// Create a new codec.
    pub fn new() -> Self {
        Self
    }

    /// Write header and payload to a writer.
    pub fn write_to<W: Write>(
        &self,
        writer: &mut W,
        header: &mut FormatHeader,
        payload: &[u8],
    ) -> Result<(), SerializeError> {
        header.payload_size = payload.len() as u32;
        header.checksum = compute_checksum(payload);

        writer.write_all(&header.to_bytes())?;
        writer.write_all(payload)?;

        Ok(())
    }

    /// Read header and payload from a reader.
    pub fn read_from<R: Read>(
        &self,
        reader: &mut R,
    ) -> Result<(FormatHeader, Vec<u8>), DeserializeError> {
        let mut header_buf = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header_buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                DeserializeError::Truncated {
                    expected: HEADER_SIZE,
                    actual: 0,
                }
            } else {
                DeserializeError::Io(e)
            }
        })?;

        let header = FormatHeader::from_bytes(&header_buf)?;

        let mut payload = vec![0u8; header.payload_size as usize];
        reader.read_exact(&mut payload).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                DeserializeError::Truncated {
                    expected: header.payload_size as usize,
                    actual: payload.len(),
                }
            } else {
                DeserializeError::Io(e)
            }
        })?;

        let actual_checksum = compute_checksum(&payload);
        if actual_checksum != header.checksum {
            return Err(DeserializeError::ChecksumMismatch {
                expected: header.checksum,
                actual: actual_checksum,
            });
        }

        Ok((header, payload))
    }

    /// Serialize a payload to bytes with header.
    pub fn serialize<T: serde::Serialize>(
        &self,
        mut header: FormatHeader,
        payload: &T,
    ) -> Result<Vec<u8>, SerializeError> {
        let payload_bytes = postcard::to_allocvec(payload)?;

        let mut output = Vec::with_capacity(HEADER_SIZE + payload_bytes.len());
        self.write_to(&mut output, &mut header, &payload_bytes)?;
        Ok(output)
    }

    /// Deserialize a payload from bytes, checking the expected artifact kind.
    pub fn deserialize<T: for<'de> serde::Deserialize<'de>>(
        &self,
        bytes: &[u8],
        expected: ArtifactKind,
    ) -> Result<(FormatHeader, T), DeserializeError> {
        use std::io::Cursor;
        let mut cursor = Cursor::new(bytes);
        let (header, payload_bytes) = self.read_from(&mut cursor)?;

        if header.kind != expected {
            return Err(DeserializeError::KindMismatch {
                expected,
                actual: header.kind,
            });
        }

        let payload = postcard::from_bytes(&payload_bytes)?;
        Ok((header, payload))
    }
}

// ============================================================================
// Tests
// ============================================================================
