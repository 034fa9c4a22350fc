//! Canonical content representation for SHP signing and verification.
//!
//! Signing and verification must operate on identical bytes regardless of
//! how the content was constructed or transported. This crate owns that
//! guarantee:
//! - JSON content is emitted as RFC 8785 canonical bytes (key order is
//!   fixed, construction order never matters)
//! - Markup content has non-content regions (script elements, comments)
//!   removed by a total, deterministic scanner before hashing
//! - Signed headers and the optional timestamp are bound into a single
//!   length-prefixed signing input that no adversarial content can forge
//!   a delimiter collision against
//!
#![deny(missing_docs)]

/// Canonicalization engine and its error type.
pub mod canonicalizer;
/// Content and canonical-form value types.
pub mod content;
/// Signing-input construction from canonical sections.
pub mod preimage;
/// Markup stripping scanner.
pub mod strip;

pub use canonicalizer::{CanonicalizationError, Canonicalizer};
pub use content::{CanonicalForm, Content};
pub use strip::strip_non_content;
