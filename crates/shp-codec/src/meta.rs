//! Embedded meta-tag form for markup documents.
//!
//! A signed page carries its envelope in `<meta name="shp-*">` tags:
//! `shp-signature`, `shp-algorithm`, `shp-pubkey` (base64 SPKI or a key
//! id resolvable via the key store), `shp-timestamp`. Tags are located
//! with the same scanner discipline as the canonicalizer (single pass,
//! no regex, total on any input).
//!
//! Signatures cover the canonical form of the document *with the shp
//! tags removed* ([`strip_meta`]), so tags are injected after signing
//! and stripped back out before recanonicalization; the signature never
//! has to cover its own encoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use shp_core::SignatureEnvelope;
use shp_keys::{KeyId, PublicKeyMaterial, SignatureAlgorithm};

use crate::errors::CodecError;

const META_SIGNATURE: &str = "shp-signature";
const META_ALGORITHM: &str = "shp-algorithm";
const META_PUBKEY: &str = "shp-pubkey";
const META_TIMESTAMP: &str = "shp-timestamp";

/// How the document references its verification key.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaKeyRef {
    /// The key travels with the document as SPKI material.
    Inline(PublicKeyMaterial),
    /// The key is resolved through the key store.
    KeyId(KeyId),
}

/// Envelope extracted from a markup document's meta tags.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaEnvelope {
    /// Raw signature bytes.
    pub signature: Vec<u8>,
    /// Declared algorithm.
    pub algorithm: SignatureAlgorithm,
    /// Verification key reference.
    pub key: MetaKeyRef,
    /// Signing time, seconds since the Unix epoch.
    pub timestamp: Option<u64>,
}

impl MetaEnvelope {
    /// Converts to the engine envelope. Inline keys are identified by
    /// their SPKI thumbprint.
    pub fn to_envelope(&self) -> Result<SignatureEnvelope, CodecError> {
        let key_id = match &self.key {
            MetaKeyRef::KeyId(id) => id.clone(),
            MetaKeyRef::Inline(key) => KeyId::new(key.thumbprint()?),
        };
        Ok(SignatureEnvelope {
            signature: self.signature.clone(),
            algorithm: self.algorithm,
            key_id,
            timestamp: self.timestamp,
            signed_header_names: None,
        })
    }
}

/// One scanned `<meta>` tag: its attributes of interest and byte span.
#[derive(Debug)]
struct MetaTag {
    name: Option<String>,
    content: Option<String>,
    start: usize,
    end: usize,
}

/// Extracts the SHP envelope from a markup document.
///
/// Returns `Ok(None)` when the document carries no `shp-signature` tag
/// (legacy, unsigned page). A signature without a key reference is a
/// [`CodecError::MissingField`]. An absent `shp-algorithm` defaults to
/// Ed25519, the documented default.
pub fn extract_meta(document: &str) -> Result<Option<MetaEnvelope>, CodecError> {
    let mut signature = None;
    let mut algorithm = None;
    let mut pubkey = None;
    let mut timestamp = None;

    for tag in scan_meta_tags(document) {
        let (Some(name), Some(content)) = (tag.name, tag.content) else {
            continue;
        };
        match name.as_str() {
            META_SIGNATURE => signature = Some(content),
            META_ALGORITHM => algorithm = Some(content),
            META_PUBKEY => pubkey = Some(content),
            META_TIMESTAMP => timestamp = Some(content),
            _ => {}
        }
    }

    let Some(signature) = signature else {
        return Ok(None);
    };
    let pubkey = pubkey.ok_or(CodecError::MissingField("shp-pubkey"))?;

    let algorithm = match algorithm {
        Some(value) => SignatureAlgorithm::parse(value.trim())
            .ok_or(CodecError::UnknownAlgorithm(value))?,
        None => SignatureAlgorithm::Ed25519,
    };
    let signature = STANDARD
        .decode(signature.trim())
        .map_err(|e| CodecError::InvalidBase64 {
            field: "shp-signature",
            reason: e.to_string(),
        })?;
    let timestamp = timestamp
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map_err(|_| CodecError::InvalidTimestamp(value.clone()))
        })
        .transpose()?;
    let key = parse_key_ref(algorithm, pubkey.trim())?;

    Ok(Some(MetaEnvelope {
        signature,
        algorithm,
        key,
        timestamp,
    }))
}

/// `shp-pubkey` is inline material exactly when it base64-decodes to
/// bytes that parse as SPKI for the declared algorithm; otherwise it is
/// a key id.
fn parse_key_ref(
    algorithm: SignatureAlgorithm,
    value: &str,
) -> Result<MetaKeyRef, CodecError> {
    if let Ok(key) = PublicKeyMaterial::from_spki_base64(algorithm, value) {
        return Ok(MetaKeyRef::Inline(key));
    }
    Ok(MetaKeyRef::KeyId(KeyId::parse(value)?))
}

/// Removes the four `shp-*` meta tags from a document, yielding the
/// bytes the signature covers (after canonicalization).
pub fn strip_meta(document: &str) -> String {
    let mut out = String::with_capacity(document.len());
    let mut cursor = 0;
    for tag in scan_meta_tags(document) {
        let is_shp = matches!(
            tag.name.as_deref(),
            Some(META_SIGNATURE) | Some(META_ALGORITHM) | Some(META_PUBKEY)
                | Some(META_TIMESTAMP)
        );
        if is_shp {
            out.push_str(&document[cursor..tag.start]);
            cursor = tag.end;
        }
    }
    out.push_str(&document[cursor..]);
    out
}

/// Injects SHP meta tags into a document after signing.
///
/// `pubkey` is rendered verbatim (base64 SPKI or a key id). Tags land
/// directly after the opening `<head>` tag, or at the front of the
/// document when there is none.
pub fn inject_meta(document: &str, envelope: &SignatureEnvelope, pubkey: &str) -> String {
    let mut tags = String::new();
    push_meta_tag(&mut tags, META_SIGNATURE, &STANDARD.encode(&envelope.signature));
    push_meta_tag(&mut tags, META_ALGORITHM, envelope.algorithm.as_str());
    push_meta_tag(&mut tags, META_PUBKEY, pubkey);
    if let Some(ts) = envelope.timestamp {
        push_meta_tag(&mut tags, META_TIMESTAMP, &ts.to_string());
    }

    match find_head_insertion_point(document) {
        Some(at) => {
            let mut out = String::with_capacity(document.len() + tags.len());
            out.push_str(&document[..at]);
            out.push_str(&tags);
            out.push_str(&document[at..]);
            out
        }
        None => {
            let mut out = tags;
            out.push_str(document);
            out
        }
    }
}

fn push_meta_tag(out: &mut String, name: &str, content: &str) {
    out.push_str("<meta name=\"");
    out.push_str(name);
    out.push_str("\" content=\"");
    out.push_str(&escape_attribute(content));
    out.push_str("\">");
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);
        rest = &rest[at..];
        let mut replaced = false;
        for (entity, ch) in [
            ("&amp;", '&'),
            ("&lt;", '<'),
            ("&gt;", '>'),
            ("&quot;", '"'),
            ("&#39;", '\''),
        ] {
            if rest.starts_with(entity) {
                out.push(ch);
                rest = &rest[entity.len()..];
                replaced = true;
                break;
            }
        }
        if !replaced {
            out.push('&');
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Offset just past the first opening `<head...>` tag, if any.
fn find_head_insertion_point(document: &str) -> Option<usize> {
    let bytes = document.as_bytes();
    let mut i = 0;
    while i + 5 <= bytes.len() {
        if bytes[i] == b'<' && bytes[i + 1..i + 5].eq_ignore_ascii_case(b"head") {
            let after = i + 5;
            let next = bytes.get(after).copied();
            if matches!(next, Some(b'>') | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r')) {
                // Skip to the end of the opening tag.
                let mut j = after;
                while j < bytes.len() && bytes[j] != b'>' {
                    j += 1;
                }
                if j < bytes.len() {
                    return Some(j + 1);
                }
                return None;
            }
        }
        i += 1;
    }
    None
}

/// Scans all `<meta ...>` tags in document order.
///
/// Total on any input: an unterminated tag extends to end of input.
fn scan_meta_tags(document: &str) -> Vec<MetaTag> {
    let bytes = document.as_bytes();
    let mut tags = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'<'
            && i + 5 <= bytes.len()
            && bytes[i + 1..i + 5].eq_ignore_ascii_case(b"meta")
            && matches!(
                bytes.get(i + 5).copied(),
                None | Some(b'>') | Some(b'/') | Some(b' ') | Some(b'\t') | Some(b'\n')
                    | Some(b'\r')
            )
        {
            let (tag, end) = parse_meta_tag(document, i, i + 5);
            tags.push(tag);
            i = end;
        } else {
            i += 1;
        }
    }
    tags
}

/// Parses one meta tag starting at `start`; `cursor` sits just past
/// `<meta`. Returns the tag and the offset past its closing `>`.
fn parse_meta_tag(document: &str, start: usize, mut cursor: usize) -> (MetaTag, usize) {
    let bytes = document.as_bytes();
    let mut name = None;
    let mut content = None;

    loop {
        while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
            cursor += 1;
        }
        if cursor >= bytes.len() {
            break;
        }
        match bytes[cursor] {
            b'>' => {
                cursor += 1;
                break;
            }
            b'/' => {
                cursor += 1;
            }
            _ => {
                let attr_start = cursor;
                while cursor < bytes.len()
                    && !bytes[cursor].is_ascii_whitespace()
                    && !matches!(bytes[cursor], b'=' | b'>' | b'/')
                {
                    cursor += 1;
                }
                let attr_name = document[attr_start..cursor].to_ascii_lowercase();

                while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
                    cursor += 1;
                }
                let value = if cursor < bytes.len() && bytes[cursor] == b'=' {
                    cursor += 1;
                    while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
                        cursor += 1;
                    }
                    if cursor < bytes.len() && matches!(bytes[cursor], b'"' | b'\'') {
                        let quote = bytes[cursor];
                        cursor += 1;
                        let value_start = cursor;
                        while cursor < bytes.len() && bytes[cursor] != quote {
                            cursor += 1;
                        }
                        let value = &document[value_start..cursor];
                        if cursor < bytes.len() {
                            cursor += 1; // closing quote
                        }
                        Some(unescape_attribute(value))
                    } else {
                        let value_start = cursor;
                        while cursor < bytes.len()
                            && !bytes[cursor].is_ascii_whitespace()
                            && bytes[cursor] != b'>'
                        {
                            cursor += 1;
                        }
                        Some(unescape_attribute(&document[value_start..cursor]))
                    }
                } else {
                    None
                };

                match attr_name.as_str() {
                    "name" => name = value,
                    "content" => content = value,
                    _ => {}
                }
            }
        }
    }

    (
        MetaTag {
            name: name.map(|n| n.trim().to_ascii_lowercase()),
            content,
            start,
            end: cursor,
        },
        cursor,
    )
}
