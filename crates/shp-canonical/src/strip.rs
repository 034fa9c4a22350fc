//! Markup stripping: removal of non-content regions before hashing.
//!
//! A signature over a markup document must not cover the script that
//! would verify it, so script elements are excluded from the canonical
//! form. The original pattern-based strip was a signature-bypass vector;
//! this scanner is its replacement and is total and deterministic:
//!
//! - A script element opens at `<script` (ASCII case-insensitive)
//!   followed by whitespace, `>`, or `/`. Near-misses like `<scripty>`
//!   are content.
//! - Inside a script element all bytes are raw text until the first
//!   `</script` (case-insensitive) followed by optional whitespace and
//!   `>`. The whole element, tags included, is dropped.
//! - An HTML comment opens at `<!--` and closes at the first `-->`;
//!   the whole comment is dropped.
//! - An unterminated script element or comment strips to end of input,
//!   so truncation cannot smuggle raw text past the scanner.
//! - Everything else is copied verbatim. One left-to-right pass, no
//!   backtracking; output is a pure function of the input bytes.

/// Removes script elements and comments from a markup document.
pub fn strip_non_content(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if let Some(after) = comment_open(bytes, i) {
            i = comment_close(bytes, after);
        } else if let Some(after) = script_open(bytes, i) {
            i = script_close(bytes, after);
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    // Only whole UTF-8 sequences are ever removed: every stripped region
    // starts at `<` and ends after `>` or at end of input.
    String::from_utf8(out).expect("stripping preserved UTF-8 boundaries")
}

/// Matches `<!--` at `i`; returns the offset just past it.
fn comment_open(bytes: &[u8], i: usize) -> Option<usize> {
    if bytes[i..].starts_with(b"<!--") {
        Some(i + 4)
    } else {
        None
    }
}

/// Scans from `i` to just past the first `-->`, or to end of input.
fn comment_close(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() {
        if bytes[i..].starts_with(b"-->") {
            return i + 3;
        }
        i += 1;
    }
    bytes.len()
}

/// Matches a script opening tag at `i`; returns the offset just past
/// `<script`. The next byte must be whitespace, `>`, or `/` for the
/// match to count, but it is not consumed here: the raw-text scan below
/// owns everything after the tag name.
fn script_open(bytes: &[u8], i: usize) -> Option<usize> {
    if bytes.len() < i + 8 {
        return None;
    }
    if bytes[i] != b'<' || !bytes[i + 1..i + 7].eq_ignore_ascii_case(b"script") {
        return None;
    }
    match bytes[i + 7] {
        b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' => Some(i + 7),
        _ => None,
    }
}

/// Scans from `i` to just past the closing `</script[ws]*>`, or to end
/// of input when the element is unterminated.
fn script_close(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() {
        if bytes[i] == b'<'
            && i + 8 <= bytes.len()
            && bytes[i + 1] == b'/'
            && bytes[i + 2..i + 8].eq_ignore_ascii_case(b"script")
        {
            let mut j = i + 8;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if j < bytes.len() && bytes[j] == b'>' {
                return j + 1;
            }
            // `</scriptfoo` is raw text, keep scanning past the `<`.
        }
        i += 1;
    }
    bytes.len()
}
