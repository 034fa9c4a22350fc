//! Signing-input construction.
//!
//! The signature covers content, any signed headers, and the embedded
//! timestamp as one byte sequence. Sections are length-prefixed so the
//! encoding is injective: no header value or content byte can collide
//! with a section boundary, and moving bytes between sections always
//! changes the preimage.
//!
//! ```text
//! preimage = "SHPv1" SP count SP len(s1) SP s1 [SP len(si) SP si]*
//! s1       = canonical content bytes
//! s2..     = "hdr:" name ":" value        (per signed header, in order)
//! s_last   = "ts:" decimal-seconds        (iff a timestamp is embedded)
//! ```

/// Domain prefix for SHP signing inputs.
const DOMAIN: &[u8] = b"SHPv1";

/// Builds the signing input from canonical content bytes, normalized
/// `(name, value)` header pairs in signing order, and the optional
/// timestamp.
pub fn build(content: &[u8], headers: &[(String, String)], timestamp: Option<u64>) -> Vec<u8> {
    let mut sections: Vec<Vec<u8>> = Vec::with_capacity(2 + headers.len());
    sections.push(content.to_vec());
    for (name, value) in headers {
        sections.push(format!("hdr:{}:{}", name, value).into_bytes());
    }
    if let Some(ts) = timestamp {
        sections.push(format!("ts:{}", ts).into_bytes());
    }

    let mut out = Vec::with_capacity(
        DOMAIN.len() + sections.iter().map(|s| s.len() + 16).sum::<usize>(),
    );
    out.extend_from_slice(DOMAIN);
    out.extend_from_slice(format!(" {}", sections.len()).as_bytes());
    for section in &sections {
        out.extend_from_slice(format!(" {} ", section.len()).as_bytes());
        out.extend_from_slice(section);
    }
    out
}
