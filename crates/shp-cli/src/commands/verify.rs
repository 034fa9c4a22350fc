//! Verify command implementation.

use std::collections::BTreeMap;
use std::time::Duration;

use shp_canonical::Content;
use shp_codec::{extract_meta, from_json, strip_meta, MetaKeyRef};
use shp_core::{SecurityEvent, VerificationResult, Verifier, VerifyConfig};
use shp_keys::{KeyIdentity, KeyStore, PublicKeyMaterial, SignatureAlgorithm};

use crate::output;

pub fn run(
    input: String,
    pubkey: Option<String>,
    algorithm: String,
    format: String,
    legacy: bool,
    max_age: Option<u64>,
    strict_exit: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let algorithm = SignatureAlgorithm::parse(&algorithm)
        .ok_or_else(|| format!("Unknown algorithm: {}", algorithm))?;

    let mut config = if legacy {
        VerifyConfig::legacy()
    } else {
        VerifyConfig::default()
    };
    if let Some(secs) = max_age {
        config.max_age = Some(Duration::from_secs(secs));
    }

    let body = std::fs::read_to_string(&input)
        .map_err(|e| format!("Failed to read {}: {}", input, e))?;

    let now = now_secs();
    let (result, event) = match format.as_str() {
        "json" => verify_json(&body, pubkey.as_deref(), algorithm, &config, now)?,
        "meta" => verify_meta(&body, pubkey.as_deref(), algorithm, &config, now)?,
        other => return Err(format!("Unknown format: {}", other).into()),
    };

    output::print_verification(&result, event.as_ref(), now);

    if strict_exit && !result.is_valid {
        std::process::exit(1);
    }
    Ok(())
}

/// Verifies a JSON envelope body against a public key file.
fn verify_json(
    body: &str,
    pubkey: Option<&str>,
    algorithm: SignatureAlgorithm,
    config: &VerifyConfig,
    now: u64,
) -> Result<(VerificationResult, Option<SecurityEvent>), Box<dyn std::error::Error>> {
    let (envelope, content) = from_json(body)?;
    let public = load_pubkey(
        pubkey.ok_or("--pubkey is required for json verification")?,
        algorithm,
    )?;

    let store = KeyStore::new();
    store.register(KeyIdentity::verify_only(
        envelope.key_id.clone(),
        public,
        now,
    ))?;
    let verifier = Verifier::new(&store);
    let result = verifier.verify_at(Some(&envelope), &content, &BTreeMap::new(), config, now)?;
    let event = SecurityEvent::from_verification(&result, Some(&envelope), now);
    Ok((result, event))
}

/// Verifies a markup document carrying embedded meta tags.
fn verify_meta(
    document: &str,
    pubkey: Option<&str>,
    algorithm: SignatureAlgorithm,
    config: &VerifyConfig,
    now: u64,
) -> Result<(VerificationResult, Option<SecurityEvent>), Box<dyn std::error::Error>> {
    let store = KeyStore::new();
    let verifier = Verifier::new(&store);

    // The signature covers the document with the shp tags removed.
    let content = Content::Markup(strip_meta(document));

    let Some(meta) = extract_meta(document)? else {
        let result = verifier.verify_at(None, &content, &BTreeMap::new(), config, now)?;
        let event = SecurityEvent::from_verification(&result, None, now);
        return Ok((result, event));
    };

    let envelope = meta.to_envelope()?;
    let public = match &meta.key {
        MetaKeyRef::Inline(key) => key.clone(),
        MetaKeyRef::KeyId(_) => load_pubkey(
            pubkey.ok_or("--pubkey is required when the page references a key id")?,
            algorithm,
        )?,
    };

    let result =
        verifier.verify_with_key_at(&envelope, &public, &content, &BTreeMap::new(), config, now)?;
    let event = SecurityEvent::from_verification(&result, Some(&envelope), now);
    Ok((result, event))
}

fn load_pubkey(
    path: &str,
    algorithm: SignatureAlgorithm,
) -> Result<PublicKeyMaterial, Box<dyn std::error::Error>> {
    let encoded = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path, e))?;
    Ok(PublicKeyMaterial::from_spki_base64(algorithm, &encoded)?)
}

fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
