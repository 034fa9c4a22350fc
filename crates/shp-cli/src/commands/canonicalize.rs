//! Canonicalize command implementation.

use shp_canonical::{Canonicalizer, Content};

use super::read_input;

pub fn run(input: Option<String>, markup: bool) -> Result<(), Box<dyn std::error::Error>> {
    let raw = read_input(input.as_deref())?;
    let content = if markup {
        Content::Markup(raw)
    } else {
        Content::json(&raw).map_err(|e| format!("Input is not valid JSON: {}", e))?
    };

    let canonicalizer = Canonicalizer::new();
    let canonical = canonicalizer.canonicalize(&content)?;
    println!("{}", String::from_utf8_lossy(canonical.as_bytes()));
    Ok(())
}
