//! Wire representations for SHP signature envelopes.
//!
//! The engine produces and accepts three forms, consumed by the
//! transport layer outside this workspace:
//! - HTTP header tuples (`X-SHP-Signature`, `X-SHP-Algorithm`,
//!   `X-SHP-Key-Id`, `X-SHP-Timestamp`, `X-SHP-Signed-Headers`)
//! - Embedded `<meta name="shp-*">` tags for markup documents
//! - A JSON envelope carrying content and signature together in one body
//!
//! Decode failures here are structural, surfaced as hard
//! [`CodecError`]s; an *absent* envelope is `Ok(None)` so the verifier
//! owns the missing-signature policy decision.
//!
#![deny(missing_docs)]

/// Codec error types.
pub mod errors;
/// HTTP header form.
pub mod headers;
/// JSON envelope form.
pub mod json;
/// Embedded meta-tag form for markup documents.
pub mod meta;

pub use errors::CodecError;
pub use headers::{from_header_map, to_header_map};
pub use json::{from_json, to_json, JsonEnvelope};
pub use meta::{extract_meta, inject_meta, strip_meta, MetaEnvelope, MetaKeyRef};
