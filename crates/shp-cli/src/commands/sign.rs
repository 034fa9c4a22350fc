//! Sign command implementation.

use std::collections::BTreeMap;

use shp_canonical::Content;
use shp_codec::{inject_meta, to_header_map, to_json};
use shp_core::{SignOptions, Signer};
use shp_keys::{KeyId, KeyIdentity, KeyStore, PrivateKeyMaterial, SignatureAlgorithm};

use super::read_input;
use crate::output;

#[allow(clippy::too_many_arguments)]
pub fn run(
    input: Option<String>,
    key_dir: String,
    key_id: String,
    algorithm: String,
    markup: bool,
    headers: Vec<String>,
    no_timestamp: bool,
    format: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let algorithm = SignatureAlgorithm::parse(&algorithm)
        .ok_or_else(|| format!("Unknown algorithm: {}", algorithm))?;
    let key_id = KeyId::parse(key_id).map_err(|e| format!("Invalid key id: {}", e))?;

    let key_path = std::path::Path::new(&key_dir).join(format!("{}.key", key_id));
    let encoded = std::fs::read_to_string(&key_path)
        .map_err(|e| format!("Failed to read {}: {}", key_path.display(), e))?;
    let private = PrivateKeyMaterial::from_pkcs8_base64(algorithm, &encoded)?;
    let pubkey_b64 = private.public().to_spki_base64()?;

    let store = KeyStore::new();
    store.register(KeyIdentity::signing(key_id, private, now_secs()).activated())?;
    let signer = Signer::new(&store);

    let raw = read_input(input.as_deref())?;
    let content = if markup {
        Content::Markup(raw.clone())
    } else {
        Content::json(&raw).map_err(|e| format!("Input is not valid JSON: {}", e))?
    };

    let (names, values) = parse_headers(&headers)?;
    let mut options = SignOptions::default().with_headers(names, values);
    if no_timestamp {
        options = options.without_timestamp();
    }

    let envelope = signer.sign(&content, &options)?;

    match format.as_str() {
        "headers" => {
            for (name, value) in to_header_map(&envelope) {
                println!("{}: {}", name, value);
            }
        }
        "json" => {
            let value = serde_json::from_str(&raw)?;
            println!("{}", output::format_json(&serde_json::to_value(to_json(&envelope, value))?));
        }
        "meta" => {
            if !markup {
                return Err("--format meta requires --markup input".into());
            }
            print!("{}", inject_meta(&raw, &envelope, &pubkey_b64));
        }
        other => return Err(format!("Unknown format: {}", other).into()),
    }
    Ok(())
}

/// Parses repeated `name=value` header flags into signing order and a
/// value map.
fn parse_headers(
    headers: &[String],
) -> Result<(Vec<String>, BTreeMap<String, String>), Box<dyn std::error::Error>> {
    let mut names = Vec::with_capacity(headers.len());
    let mut values = BTreeMap::new();
    for header in headers {
        let (name, value) = header
            .split_once('=')
            .ok_or_else(|| format!("Header must be name=value: {}", header))?;
        names.push(name.to_string());
        values.insert(name.to_ascii_lowercase(), value.to_string());
    }
    Ok((names, values))
}

fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
