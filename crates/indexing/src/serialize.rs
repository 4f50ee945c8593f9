//! Cache formats for `IndexFile`.
//!
//! Two formats share a versioned envelope. The textual JSON format is
//! tolerant: unknown fields are ignored and missing fields defaulted, so
//! field additions stay compatible in both directions and only a major
//! version bump rejects. The compact binary format makes no such effort:
//! both version numbers must match exactly. Diagnostics and file contents
//! are never serialized.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{IndexFile, MAJOR_VERSION, MINOR_VERSION};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache version {found_major}.{found_minor} is incompatible with {MAJOR_VERSION}.{MINOR_VERSION}")]
    VersionMismatch { found_major: i32, found_minor: i32 },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Binary(#[from] bincode::Error),
}

#[derive(Serialize)]
struct Envelope<'a> {
    major: i32,
    minor: i32,
    file: &'a IndexFile,
}

#[derive(Deserialize)]
#[serde(default)]
struct OwnedEnvelope {
    major: i32,
    minor: i32,
    file: IndexFile,
}

impl Default for OwnedEnvelope {
    fn default() -> OwnedEnvelope {
        OwnedEnvelope { major: -1, minor: -1, file: IndexFile::default() }
    }
}

pub fn to_json_string(file: &IndexFile) -> Result<String, CacheError> {
    let envelope = Envelope { major: MAJOR_VERSION, minor: MINOR_VERSION, file };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

pub fn from_json_str(text: &str) -> Result<IndexFile, CacheError> {
    let envelope: OwnedEnvelope = serde_json::from_str(text)?;
    if envelope.major != MAJOR_VERSION {
        return Err(CacheError::VersionMismatch {
            found_major: envelope.major,
            found_minor: envelope.minor,
        });
    }
    let mut file = envelope.file;
    file.rebuild_cache();
    Ok(file)
}

pub fn to_binary(file: &IndexFile) -> Result<Vec<u8>, CacheError> {
    let envelope = Envelope { major: MAJOR_VERSION, minor: MINOR_VERSION, file };
    Ok(bincode::serialize(&envelope)?)
}

pub fn from_binary(bytes: &[u8]) -> Result<IndexFile, CacheError> {
    let envelope: OwnedEnvelope = bincode::deserialize(bytes)?;
    if envelope.major != MAJOR_VERSION || envelope.minor != MINOR_VERSION {
        return Err(CacheError::VersionMismatch {
            found_major: envelope.major,
            found_minor: envelope.minor,
        });
    }
    let mut file = envelope.file;
    file.rebuild_cache();
    Ok(file)
}
