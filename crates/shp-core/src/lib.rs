//! Signing and verification engine for SHP.
//!
//! This crate provides:
//! - [`SignatureEnvelope`]: the signature plus metadata accompanying
//!   signed content
//! - [`Signer`]: canonicalizes content and signs with the store's
//!   active key
//! - [`Verifier`]: the per-call verification state machine
//!   (missing-signature policy, key resolution, recanonicalization,
//!   cryptographic check, freshness check)
//! - [`SecurityEvent`]: structured descriptor of failed verifications
//!   for an external security-event collector
//!
//! Core invariants:
//! - An envelope is meaningful only with the exact canonical bytes it
//!   was computed over; the verifier always recomputes those bytes from
//!   the received content and never trusts a pre-rendered form
//! - Verification outcomes are result values, not errors; only
//!   structural failures (canonicalization, key decoding) are errors
//! - Neither signing nor verifying mutates the key store
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::BTreeMap;
//!
//! use shp_canonical::Content;
//! use shp_core::{SignOptions, Signer, Verifier, VerifyConfig};
//! use shp_keys::{KeyId, KeyIdentity, KeyStore, PrivateKeyMaterial, SignatureAlgorithm};
//!
//! // One store, one active signing key
//! let store = KeyStore::new();
//! store.register(
//!     KeyIdentity::signing(
//!         KeyId::parse("key-2024-01")?,
//!         PrivateKeyMaterial::generate(SignatureAlgorithm::Ed25519)?,
//!         1_700_000_000,
//!     )
//!     .activated(),
//! )?;
//!
//! // Sign on the origin side
//! let content = Content::json(r#"{"message":"This content is signed!"}"#)?;
//! let signer = Signer::new(&store);
//! let envelope = signer.sign(&content, &SignOptions::default())?;
//!
//! // Verify on the receiving side
//! let verifier = Verifier::new(&store);
//! let result = verifier.verify(
//!     Some(&envelope),
//!     &content,
//!     &BTreeMap::new(),
//!     &VerifyConfig::default(),
//! )?;
//! assert!(result.is_valid);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
#![deny(missing_docs)]

/// Signature envelope type.
pub mod envelope;
/// Security-event descriptors for failed verifications.
pub mod events;
/// Content signing.
pub mod signer;
/// Verification state machine and result types.
pub mod verifier;

pub use envelope::SignatureEnvelope;
pub use events::SecurityEvent;
pub use signer::{SignError, SignOptions, Signer};
pub use verifier::{
    VerificationErrorKind, VerificationResult, Verifier, VerifyConfig, VerifyError,
};

/// Current time, seconds since the Unix epoch.
pub(crate) fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
