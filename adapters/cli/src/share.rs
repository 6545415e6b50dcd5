//! Single-line share codes carrying a whole match.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use grid_conquest_core::GameSnapshot;
use grid_conquest_persistence::{encode, try_decode, CodecError};
use thiserror::Error;

const SHARE_DOMAIN: &str = "grid";
const SHARE_VERSION: &str = "v2";

/// Identifier prefix emitted before the encoded match payload.
pub(crate) const SHARE_HEADER: &str = "grid:v2";
/// Delimiter used to separate the prefix, version and payload.
const FIELD_DELIMITER: char = ':';

/// Errors that can occur while reading share codes.
#[derive(Debug, Error)]
pub(crate) enum ShareError {
    /// The provided string was empty or contained only whitespace.
    #[error("share code was empty")]
    EmptyPayload,
    /// The share code did not contain a version segment.
    #[error("share code is missing the version")]
    MissingVersion,
    /// The share code did not include the payload segment.
    #[error("share code is missing the payload")]
    MissingPayload,
    /// The share code used an unexpected prefix segment.
    #[error("share code prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The share code used an unsupported version identifier.
    #[error("share code version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode share code payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The decoded payload did not describe a valid match.
    #[error("could not read the shared match: {0}")]
    InvalidPayload(#[from] CodecError),
}

/// Encodes `snapshot` into a single line suitable for copy and paste.
pub(crate) fn encode_share_code(snapshot: &GameSnapshot) -> Result<String, ShareError> {
    let json = encode(snapshot)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!("{SHARE_HEADER}{FIELD_DELIMITER}{encoded}"))
}

/// Decodes a share code back into a validated snapshot.
pub(crate) fn decode_share_code(
    value: &str,
    starting_resources: u32,
) -> Result<GameSnapshot, ShareError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ShareError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts.next().unwrap_or_default();
    let version = parts.next().ok_or(ShareError::MissingVersion)?;
    let payload = parts.next().ok_or(ShareError::MissingPayload)?;

    if domain != SHARE_DOMAIN {
        return Err(ShareError::InvalidPrefix(domain.to_owned()));
    }
    if version != SHARE_VERSION {
        return Err(ShareError::UnsupportedVersion(version.to_owned()));
    }

    let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
    Ok(try_decode(&bytes, starting_resources)?)
}
