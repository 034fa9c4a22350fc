use canonical_json::to_string;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::content::{CanonicalForm, Content};
use crate::preimage;
use crate::strip::strip_non_content;

/// Error returned when canonicalization fails.
#[derive(thiserror::Error, Debug)]
pub enum CanonicalizationError {
    /// Provided JSON could not be canonicalized.
    #[error("invalid JSON structure: {0}")]
    InvalidStructure(String),
    /// Non-finite number (NaN/Infinity) detected.
    #[error("non-finite number detected at {0}")]
    NonFiniteNumber(String),
    /// A header named for signing has no supplied value.
    #[error("signed header '{0}' has no value")]
    MissingHeader(String),
    /// Generic failure.
    #[error("other error: {0}")]
    Other(String),
}

/// Helper for building JSON paths during validation.
#[derive(Debug, Clone)]
struct Path {
    segments: Vec<String>,
}

impl Path {
    fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    fn push_field(&self, field: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(field.to_string());
        Self { segments }
    }

    fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(format!("[{}]", index));
        Self { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "root")
        } else {
            write!(f, "{}", self.segments.join("."))
        }
    }
}

/// Canonicalizer that emits deterministic bytes.
///
/// Stateless; one instance may serve any number of sign/verify calls.
#[derive(Debug, Clone, Default)]
pub struct Canonicalizer;

impl Canonicalizer {
    /// Creates a new canonicalizer.
    pub fn new() -> Self {
        Self
    }

    /// Produces the canonical bytes for content alone.
    ///
    /// JSON content is validated (non-finite numbers rejected with the
    /// offending path) and emitted per RFC 8785; markup content is
    /// stripped of non-content regions; raw bytes pass through.
    pub fn canonicalize(&self, content: &Content) -> Result<CanonicalForm, CanonicalizationError> {
        match content {
            Content::Json(value) => {
                self.validate(value, Path::root())?;
                let canonical =
                    to_string(value).map_err(|err| CanonicalizationError::Other(format!("{err:?}")))?;
                Ok(CanonicalForm::new(canonical.into_bytes()))
            }
            Content::Markup(document) => {
                Ok(CanonicalForm::new(strip_non_content(document).into_bytes()))
            }
            Content::Bytes(bytes) => Ok(CanonicalForm::new(bytes.clone())),
        }
    }

    /// Builds the signing input binding canonical content, the named
    /// headers (case-normalized, in caller order), and the optional
    /// timestamp.
    ///
    /// Both signing and verification must call this with identical
    /// arguments to obtain identical bytes.
    pub fn signing_input(
        &self,
        content: &Content,
        include_headers: &[String],
        header_values: &BTreeMap<String, String>,
        timestamp: Option<u64>,
    ) -> Result<CanonicalForm, CanonicalizationError> {
        let canonical = self.canonicalize(content)?;
        self.signing_input_from(&canonical, include_headers, header_values, timestamp)
    }

    /// As [`signing_input`](Self::signing_input), starting from
    /// already-canonical content bytes.
    pub fn signing_input_from(
        &self,
        canonical: &CanonicalForm,
        include_headers: &[String],
        header_values: &BTreeMap<String, String>,
        timestamp: Option<u64>,
    ) -> Result<CanonicalForm, CanonicalizationError> {
        let mut headers = Vec::with_capacity(include_headers.len());
        for name in include_headers {
            let normalized = name.to_ascii_lowercase();
            let value = lookup_header(header_values, &normalized)
                .ok_or_else(|| CanonicalizationError::MissingHeader(normalized.clone()))?;
            headers.push((normalized, value.to_string()));
        }
        Ok(CanonicalForm::new(preimage::build(
            canonical.as_bytes(),
            &headers,
            timestamp,
        )))
    }

    /// Validates a JSON value for canonical emission.
    fn validate(&self, value: &Value, path: Path) -> Result<(), CanonicalizationError> {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    self.validate(child, path.push_field(key))?;
                }
                Ok(())
            }
            Value::Array(items) => {
                for (idx, item) in items.iter().enumerate() {
                    self.validate(item, path.push_index(idx))?;
                }
                Ok(())
            }
            Value::Number(num) => {
                if num.is_f64() {
                    let f = num.as_f64().unwrap();
                    if !f.is_finite() {
                        return Err(CanonicalizationError::NonFiniteNumber(format!("{}", path)));
                    }
                }
                Ok(())
            }
            Value::String(_) | Value::Bool(_) | Value::Null => Ok(()),
        }
    }
}

/// Case-insensitive header lookup; `normalized` is already lowercase.
fn lookup_header<'a>(values: &'a BTreeMap<String, String>, normalized: &str) -> Option<&'a str> {
    values
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(normalized))
        .map(|(_, value)| value.as_str())
}
