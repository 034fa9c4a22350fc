use thiserror::Error;

/// Structural envelope decode failure.
///
/// These are hard errors: a malformed envelope is a protocol violation,
/// never silently degraded to "unsigned".
#[derive(Debug, Error)]
pub enum CodecError {
    /// A required envelope field is absent.
    #[error("malformed envelope: missing {0}")]
    MissingField(&'static str),
    /// A field that must be base64 did not decode.
    #[error("malformed envelope: invalid base64 in {field}: {reason}")]
    InvalidBase64 {
        /// Field name holding the offending value.
        field: &'static str,
        /// Decoder failure description.
        reason: String,
    },
    /// The declared algorithm name is not supported.
    #[error("malformed envelope: unknown algorithm '{0}'")]
    UnknownAlgorithm(String),
    /// The timestamp field is not a decimal integer.
    #[error("malformed envelope: invalid timestamp '{0}'")]
    InvalidTimestamp(String),
    /// The key id does not conform to the identifier grammar.
    #[error("malformed envelope: invalid key id: {0}")]
    InvalidKeyId(#[from] shp_keys::ValidationError),
    /// The JSON body did not parse as an envelope.
    #[error("malformed envelope: {0}")]
    InvalidJson(#[from] serde_json::Error),
    /// An embedded public key could not be handled.
    #[error("malformed envelope: {0}")]
    Key(#[from] shp_keys::KeyMaterialError),
}
