//! Versioned JSON encoding of snapshots.

use grid_conquest_core::{GameSnapshot, SnapshotError};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::wire::StoredSnapshot;

/// Schema version written by [`encode`].
pub const SAVE_VERSION: u64 = 2;
/// Version assumed for saves that carry no version marker.
const LEGACY_VERSION: u64 = 1;

#[derive(Serialize)]
struct Envelope {
    version: u64,
    state: StoredSnapshot,
}

/// Errors raised while encoding or decoding a saved snapshot.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The bytes were not valid JSON or did not match the stored schema.
    #[error("save is not readable: {0}")]
    Json(#[from] serde_json::Error),
    /// The top-level JSON value was not an object.
    #[error("save does not hold a JSON object")]
    NotAnObject,
    /// The version marker was not an unsigned integer.
    #[error("save carries a malformed version marker")]
    MalformedVersion,
    /// The save was written by a newer schema.
    #[error("save version {0} is newer than {SAVE_VERSION}")]
    UnsupportedVersion(u64),
    /// Neither a grid size nor any cell was stored.
    #[error("save does not describe a board")]
    UnknownGridSize,
    /// The stored grid size lies outside the supported range.
    #[error("saved grid size {0} is outside the supported range")]
    InvalidGridSize(u32),
    /// The upgraded snapshot failed validation.
    #[error("saved snapshot is inconsistent: {0}")]
    Inconsistent(#[from] SnapshotError),
}

/// Encodes `snapshot` as a versioned JSON envelope.
pub fn encode(snapshot: &GameSnapshot) -> Result<Vec<u8>, CodecError> {
    let envelope = Envelope {
        version: SAVE_VERSION,
        state: StoredSnapshot::capture(snapshot),
    };
    Ok(serde_json::to_vec(&envelope)?)
}

/// Decodes a save, upgrading older schemas on the way.
///
/// Accepts the versioned envelope, a slot record of the form
/// `{ id, state, updatedAt }`, or a bare snapshot object. Balances missing
/// from older saves default to `starting_resources` for both factions.
pub fn try_decode(bytes: &[u8], starting_resources: u32) -> Result<GameSnapshot, CodecError> {
    let value: Value = serde_json::from_slice(bytes)?;
    let (version, state) = unwrap_envelope(value)?;
    if version > SAVE_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }
    if version < SAVE_VERSION {
        tracing::info!(version, "upgrading saved snapshot");
    }

    let stored: StoredSnapshot = serde_json::from_value(state)?;
    stored.restore(starting_resources)
}

/// Decodes a save, treating anything unreadable as absent.
#[must_use]
pub fn decode(bytes: &[u8], starting_resources: u32) -> Option<GameSnapshot> {
    match try_decode(bytes, starting_resources) {
        Ok(snapshot) => Some(snapshot),
        Err(error) => {
            tracing::warn!(%error, "discarding unreadable save");
            None
        }
    }
}

fn unwrap_envelope(value: Value) -> Result<(u64, Value), CodecError> {
    let Value::Object(mut fields) = value else {
        return Err(CodecError::NotAnObject);
    };
    let version = match fields.get("version") {
        None => LEGACY_VERSION,
        Some(marker) => marker.as_u64().ok_or(CodecError::MalformedVersion)?,
    };
    let state = fields.remove("state").unwrap_or(Value::Object(fields));
    Ok((version, state))
}
