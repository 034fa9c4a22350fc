//! HTTP header form of the signature envelope.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use shp_core::SignatureEnvelope;
use shp_keys::{KeyId, SignatureAlgorithm};

use crate::errors::CodecError;

/// Base64 signature bytes.
pub const HEADER_SIGNATURE: &str = "X-SHP-Signature";
/// Algorithm name.
pub const HEADER_ALGORITHM: &str = "X-SHP-Algorithm";
/// Signing key identifier.
pub const HEADER_KEY_ID: &str = "X-SHP-Key-Id";
/// Signing time, integer seconds since the Unix epoch.
pub const HEADER_TIMESTAMP: &str = "X-SHP-Timestamp";
/// Comma-joined names of headers bound into the signature.
pub const HEADER_SIGNED_HEADERS: &str = "X-SHP-Signed-Headers";

/// Renders an envelope as `(name, value)` header tuples.
pub fn to_header_map(envelope: &SignatureEnvelope) -> Vec<(String, String)> {
    let mut headers = vec![
        (
            HEADER_SIGNATURE.to_string(),
            STANDARD.encode(&envelope.signature),
        ),
        (
            HEADER_ALGORITHM.to_string(),
            envelope.algorithm.as_str().to_string(),
        ),
        (HEADER_KEY_ID.to_string(), envelope.key_id.to_string()),
    ];
    if let Some(ts) = envelope.timestamp {
        headers.push((HEADER_TIMESTAMP.to_string(), ts.to_string()));
    }
    if let Some(names) = &envelope.signed_header_names {
        headers.push((HEADER_SIGNED_HEADERS.to_string(), names.join(",")));
    }
    headers
}

/// Parses an envelope from received headers.
///
/// Header-name lookup is ASCII-case-insensitive. Returns `Ok(None)`
/// when no SHP headers are present at all (unsigned response); a
/// partial or undecodable set is a [`CodecError`].
pub fn from_header_map<'a, I>(headers: I) -> Result<Option<SignatureEnvelope>, CodecError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut signature = None;
    let mut algorithm = None;
    let mut key_id = None;
    let mut timestamp = None;
    let mut signed_headers = None;

    for (name, value) in headers {
        if name.eq_ignore_ascii_case(HEADER_SIGNATURE) {
            signature = Some(value);
        } else if name.eq_ignore_ascii_case(HEADER_ALGORITHM) {
            algorithm = Some(value);
        } else if name.eq_ignore_ascii_case(HEADER_KEY_ID) {
            key_id = Some(value);
        } else if name.eq_ignore_ascii_case(HEADER_TIMESTAMP) {
            timestamp = Some(value);
        } else if name.eq_ignore_ascii_case(HEADER_SIGNED_HEADERS) {
            signed_headers = Some(value);
        }
    }

    if signature.is_none()
        && algorithm.is_none()
        && key_id.is_none()
        && timestamp.is_none()
        && signed_headers.is_none()
    {
        return Ok(None);
    }

    let signature = signature.ok_or(CodecError::MissingField(HEADER_SIGNATURE))?;
    let algorithm = algorithm.ok_or(CodecError::MissingField(HEADER_ALGORITHM))?;
    let key_id = key_id.ok_or(CodecError::MissingField(HEADER_KEY_ID))?;

    let signature = STANDARD
        .decode(signature.trim())
        .map_err(|e| CodecError::InvalidBase64 {
            field: HEADER_SIGNATURE,
            reason: e.to_string(),
        })?;
    let algorithm = SignatureAlgorithm::parse(algorithm.trim())
        .ok_or_else(|| CodecError::UnknownAlgorithm(algorithm.trim().to_string()))?;
    let key_id = KeyId::parse(key_id.trim())?;
    let timestamp = timestamp
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map_err(|_| CodecError::InvalidTimestamp(value.to_string()))
        })
        .transpose()?;
    let signed_header_names = signed_headers.map(|value| {
        value
            .split(',')
            .map(|name| name.trim().to_ascii_lowercase())
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
    });

    Ok(Some(SignatureEnvelope {
        signature,
        algorithm,
        key_id,
        timestamp,
        signed_header_names,
    }))
}
