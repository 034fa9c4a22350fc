//! Key identities, rotation, and revocation for SHP signing.
//!
//! This crate provides:
//! - The supported signature algorithms (Ed25519, RSASSA-PKCS1-v1_5/SHA-256)
//! - Key material types with SPKI import/export and generation
//! - [`KeyStore`]: the key table with exactly one active signing key,
//!   any number of retained verify keys, and irreversible revocation
//!
//! Core invariants:
//! - At most one identity is active for signing at a time
//! - Any non-revoked registered key can verify previously issued
//!   signatures, so rotation never invalidates old content
//! - Revocation is permanent within a process lifetime
//! - The key table is single-writer, multi-reader; lookups never observe
//!   a torn rotation
//!
#![deny(missing_docs)]

/// Signature algorithm variants.
pub mod algorithm;
/// Error types for key operations.
pub mod errors;
/// Validated identifier newtypes.
pub mod identifiers;
/// Key identity records.
pub mod identity;
/// Key material (generation, SPKI codec, sign/verify primitives).
pub mod material;
/// The key table with rotation and revocation.
pub mod store;

pub use algorithm::SignatureAlgorithm;
pub use errors::{KeyMaterialError, KeyStoreError, ValidationError};
pub use identifiers::KeyId;
pub use identity::KeyIdentity;
pub use material::{PrivateKeyMaterial, PublicKeyMaterial};
pub use store::KeyStore;
