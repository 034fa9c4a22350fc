use serde_json::Value;

/// Content accepted by the canonicalizer.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Structured JSON content; canonicalized per RFC 8785.
    Json(Value),
    /// Markup document; non-content regions are stripped before hashing.
    Markup(String),
    /// Opaque bytes; canonical form is the bytes themselves.
    Bytes(Vec<u8>),
}

impl Content {
    /// Parses a JSON string into JSON content.
    pub fn json(input: &str) -> Result<Self, serde_json::Error> {
        Ok(Content::Json(serde_json::from_str(input)?))
    }
}

impl From<Value> for Content {
    fn from(value: Value) -> Self {
        Content::Json(value)
    }
}

/// Deterministic byte encoding of content, the cryptographic signing input.
///
/// Two semantically-equal inputs canonicalize to byte-identical values.
/// Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalForm(Vec<u8>);

impl CanonicalForm {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Byte length of the canonical form.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical form is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the form, yielding the canonical bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for CanonicalForm {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
