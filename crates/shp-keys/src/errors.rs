use thiserror::Error;

/// Errors from key table operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyStoreError {
    /// A key with this id is already registered.
    #[error("duplicate key id: {0}")]
    DuplicateKeyId(String),
    /// No key with this id is registered.
    #[error("unknown key id: {0}")]
    UnknownKeyId(String),
    /// The key was revoked and is permanently unusable.
    #[error("revoked key: {0}")]
    RevokedKey(String),
    /// No identity is currently active for signing.
    #[error("no active signing key")]
    NoActiveKey,
    /// The key has no private material and cannot be activated for signing.
    #[error("key {0} has no private material")]
    NotSignable(String),
}

/// Errors from key material handling.
#[derive(Debug, Error)]
pub enum KeyMaterialError {
    /// Public or private key bytes could not be decoded.
    #[error("invalid key encoding: {0}")]
    InvalidEncoding(String),
    /// Key generation failed.
    #[error("key generation failed: {0}")]
    Generation(String),
    /// The underlying signing primitive failed (e.g., corrupt private
    /// key material).
    #[error("signing failed: {0}")]
    Signing(String),
    /// The supplied material does not match the declared algorithm.
    #[error("key material is {actual}, expected {expected}")]
    AlgorithmMismatch {
        /// Algorithm the material actually carries.
        actual: &'static str,
        /// Algorithm the caller declared.
        expected: &'static str,
    },
}

/// Validation errors for identifier newtypes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// When a value does not match the required pattern.
    #[error("{field} ('{value}') is not allowed")]
    PatternMismatch {
        /// Field name that failed validation.
        field: &'static str,
        /// Offending value.
        value: String,
    },
}
