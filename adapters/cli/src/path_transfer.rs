use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use pacific_command_core::PathData;

/// Identifier emitted before the encoded path payload.
const TRANSFER_DOMAIN: &str = "path";
const TRANSFER_VERSION: &str = "v1";
/// Delimiter used to separate the prefix, version and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes persisted path data into a single-line string suitable for copy and paste.
#[must_use]
pub(crate) fn encode(data: &PathData) -> String {
    let json = serde_json::to_vec(data).expect("path data serialization never fails");
    let encoded = STANDARD_NO_PAD.encode(json);
    format!("{TRANSFER_DOMAIN}{FIELD_DELIMITER}{TRANSFER_VERSION}{FIELD_DELIMITER}{encoded}")
}

/// Decodes persisted path data from its transfer string.
pub(crate) fn decode(value: &str) -> Result<PathData, PathTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PathTransferError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts.next().unwrap_or_default();
    let version = parts.next().ok_or(PathTransferError::MissingVersion)?;
    let payload = parts.next().ok_or(PathTransferError::MissingPayload)?;

    if domain != TRANSFER_DOMAIN {
        return Err(PathTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(PathTransferError::UnsupportedVersion(version.to_owned()));
    }

    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(PathTransferError::InvalidEncoding)?;
    serde_json::from_slice(&bytes).map_err(PathTransferError::InvalidPayload)
}

/// Errors that can occur while decoding path transfer strings.
#[derive(Debug, thiserror::Error)]
pub(crate) enum PathTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("path transfer string was empty")]
    EmptyPayload,
    /// The encoded path did not contain a version segment.
    #[error("path transfer string is missing the version")]
    MissingVersion,
    /// The encoded path did not include the payload segment.
    #[error("path transfer string is missing the payload")]
    MissingPayload,
    /// The encoded path used an unexpected prefix segment.
    #[error("path prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded path used an unsupported version identifier.
    #[error("path version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode path payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse path payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}
