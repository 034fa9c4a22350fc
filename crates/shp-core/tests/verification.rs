use std::collections::BTreeMap;
use std::time::Duration;

use shp_canonical::Content;
use shp_core::{
    SecurityEvent, SignOptions, Signer, VerificationErrorKind, Verifier, VerifyConfig,
};
use shp_keys::{
    KeyId, KeyIdentity, KeyStore, PrivateKeyMaterial, PublicKeyMaterial, SignatureAlgorithm,
};

fn store_with_active(id: &str, algorithm: SignatureAlgorithm) -> KeyStore {
    let store = KeyStore::new();
    store
        .register(
            KeyIdentity::signing(
                KeyId::parse(id).unwrap(),
                PrivateKeyMaterial::generate(algorithm).unwrap(),
                1_700_000_000,
            )
            .activated(),
        )
        .unwrap();
    store
}

fn no_headers() -> BTreeMap<String, String> {
    BTreeMap::new()
}

#[test]
fn round_trip_ed25519() {
    let store = store_with_active("k1", SignatureAlgorithm::Ed25519);
    let signer = Signer::new(&store);
    let verifier = Verifier::new(&store);

    let content = Content::json(r#"{"message":"This content is signed!"}"#).unwrap();
    let envelope = signer.sign(&content, &SignOptions::default()).unwrap();

    let result = verifier
        .verify(Some(&envelope), &content, &no_headers(), &VerifyConfig::default())
        .unwrap();
    assert!(result.is_valid);
    assert!(result.content.is_some());
    assert!(result.age.is_some());
    assert_eq!(result.error_kind, None);
}

#[test]
fn round_trip_rsa() {
    let store = store_with_active("rsa1", SignatureAlgorithm::RsaPkcs1Sha256);
    let signer = Signer::new(&store);
    let verifier = Verifier::new(&store);

    let content = Content::Markup("<html><body>signed page</body></html>".into());
    let envelope = signer.sign(&content, &SignOptions::default()).unwrap();
    assert_eq!(envelope.algorithm, SignatureAlgorithm::RsaPkcs1Sha256);

    let result = verifier
        .verify(Some(&envelope), &content, &no_headers(), &VerifyConfig::default())
        .unwrap();
    assert!(result.is_valid);
}

#[test]
fn tampered_content_is_a_signature_mismatch() {
    let store = store_with_active("k1", SignatureAlgorithm::Ed25519);
    let signer = Signer::new(&store);
    let verifier = Verifier::new(&store);

    let content = Content::json(r#"{"user":"alice"}"#).unwrap();
    let envelope = signer.sign(&content, &SignOptions::default()).unwrap();

    let tampered = Content::json(r#"{"user":"mallory"}"#).unwrap();
    let result = verifier
        .verify(Some(&envelope), &tampered, &no_headers(), &VerifyConfig::default())
        .unwrap();
    assert!(!result.is_valid);
    assert_eq!(result.error_kind, Some(VerificationErrorKind::SignatureMismatch));
    assert_eq!(result.content, None);
}

#[test]
fn tampered_envelope_timestamp_invalidates_the_signature() {
    let store = store_with_active("k1", SignatureAlgorithm::Ed25519);
    let signer = Signer::new(&store);
    let verifier = Verifier::new(&store);

    let content = Content::json(r#"{"user":"alice"}"#).unwrap();
    let mut envelope = signer.sign_at(&content, &SignOptions::default(), 1000).unwrap();
    // Rewinding the stamp to dodge a freshness check must break the
    // signature, since the timestamp is part of the signed bytes.
    envelope.timestamp = Some(2000);

    let result = verifier
        .verify_at(Some(&envelope), &content, &no_headers(), &VerifyConfig::default(), 2010)
        .unwrap();
    assert!(!result.is_valid);
    assert_eq!(result.error_kind, Some(VerificationErrorKind::SignatureMismatch));
}

#[test]
fn signed_headers_detect_header_manipulation() {
    let store = store_with_active("k1", SignatureAlgorithm::Ed25519);
    let signer = Signer::new(&store);
    let verifier = Verifier::new(&store);

    let content = Content::json(r#"{"ok":true}"#).unwrap();
    let mut values = BTreeMap::new();
    values.insert("content-type".to_string(), "application/json".to_string());
    values.insert("cache-control".to_string(), "no-store".to_string());

    let options = SignOptions::default().with_headers(
        vec!["Content-Type".to_string(), "Cache-Control".to_string()],
        values.clone(),
    );
    let envelope = signer.sign(&content, &options).unwrap();
    assert_eq!(
        envelope.signed_headers(),
        ["content-type", "cache-control"]
    );

    // Unmodified headers verify.
    let ok = verifier
        .verify(Some(&envelope), &content, &values, &VerifyConfig::default())
        .unwrap();
    assert!(ok.is_valid);

    // A proxy rewriting a signed header is detected.
    let mut rewritten = values.clone();
    rewritten.insert("cache-control".to_string(), "public, max-age=3600".to_string());
    let bad = verifier
        .verify(Some(&envelope), &content, &rewritten, &VerifyConfig::default())
        .unwrap();
    assert!(!bad.is_valid);
    assert_eq!(bad.error_kind, Some(VerificationErrorKind::SignatureMismatch));
}

#[test]
fn strict_mode_rejects_missing_signature() {
    let store = KeyStore::new();
    let verifier = Verifier::new(&store);
    let content = Content::Bytes(b"unsigned".to_vec());

    let result = verifier
        .verify(None, &content, &no_headers(), &VerifyConfig::default())
        .unwrap();
    assert!(!result.is_valid);
    assert_eq!(result.error_kind, Some(VerificationErrorKind::MissingSignature));
}

#[test]
fn legacy_mode_passes_unsigned_content_through_unverified() {
    let store = KeyStore::new();
    let verifier = Verifier::new(&store);
    let content = Content::Bytes(b"unsigned".to_vec());

    let result = verifier
        .verify(None, &content, &no_headers(), &VerifyConfig::legacy())
        .unwrap();
    assert!(!result.is_valid);
    assert_eq!(result.error_kind, None);
}

#[test]
fn unknown_key_id_is_reported() {
    let store = store_with_active("k1", SignatureAlgorithm::Ed25519);
    let signer = Signer::new(&store);
    let content = Content::json(r#"{"user":"alice"}"#).unwrap();
    let mut envelope = signer.sign(&content, &SignOptions::default()).unwrap();
    envelope.key_id = KeyId::parse("k-gone").unwrap();

    let verifier = Verifier::new(&store);
    let result = verifier
        .verify(Some(&envelope), &content, &no_headers(), &VerifyConfig::default())
        .unwrap();
    assert!(!result.is_valid);
    assert_eq!(result.error_kind, Some(VerificationErrorKind::UnknownOrRevokedKey));
}

#[test]
fn rotation_keeps_old_signatures_valid() {
    let store = store_with_active("k1", SignatureAlgorithm::Ed25519);
    let signer = Signer::new(&store);
    let verifier = Verifier::new(&store);
    let content = Content::json(r#"{"user":"alice"}"#).unwrap();

    let old_envelope = signer.sign(&content, &SignOptions::default()).unwrap();
    assert_eq!(old_envelope.key_id, KeyId::parse("k1").unwrap());

    // Rotate to k2; k1 stays registered and non-revoked.
    store
        .register(KeyIdentity::signing(
            KeyId::parse("k2").unwrap(),
            PrivateKeyMaterial::generate(SignatureAlgorithm::Ed25519).unwrap(),
            1_700_000_100,
        ))
        .unwrap();
    store.activate(&KeyId::parse("k2").unwrap()).unwrap();

    // Old signature still verifies; new signatures come from k2.
    let old_result = verifier
        .verify(Some(&old_envelope), &content, &no_headers(), &VerifyConfig::default())
        .unwrap();
    assert!(old_result.is_valid);

    let new_envelope = signer.sign(&content, &SignOptions::default()).unwrap();
    assert_eq!(new_envelope.key_id, KeyId::parse("k2").unwrap());
    let new_result = verifier
        .verify(Some(&new_envelope), &content, &no_headers(), &VerifyConfig::default())
        .unwrap();
    assert!(new_result.is_valid);
}

#[test]
fn revoked_key_fails_even_when_cryptographically_well_formed() {
    let store = store_with_active("k1", SignatureAlgorithm::Ed25519);
    let signer = Signer::new(&store);
    let verifier = Verifier::new(&store);
    let content = Content::json(r#"{"user":"alice"}"#).unwrap();
    let envelope = signer.sign(&content, &SignOptions::default()).unwrap();

    store.revoke(&KeyId::parse("k1").unwrap()).unwrap();

    let result = verifier
        .verify(Some(&envelope), &content, &no_headers(), &VerifyConfig::default())
        .unwrap();
    assert!(!result.is_valid);
    assert_eq!(result.error_kind, Some(VerificationErrorKind::UnknownOrRevokedKey));
}

#[test]
fn freshness_boundary_at_max_age() {
    let store = store_with_active("k1", SignatureAlgorithm::Ed25519);
    let signer = Signer::new(&store);
    let verifier = Verifier::new(&store);
    let content = Content::json(r#"{"user":"alice"}"#).unwrap();
    let config = VerifyConfig::default().with_max_age(Duration::from_secs(300));

    let t = 10_000;
    let envelope = signer.sign_at(&content, &SignOptions::default(), t).unwrap();

    let fresh = verifier
        .verify_at(Some(&envelope), &content, &no_headers(), &config, t + 299)
        .unwrap();
    assert!(fresh.is_valid);
    assert_eq!(fresh.age, Some(Duration::from_secs(299)));

    let stale = verifier
        .verify_at(Some(&envelope), &content, &no_headers(), &config, t + 301)
        .unwrap();
    assert!(!stale.is_valid);
    assert_eq!(stale.error_kind, Some(VerificationErrorKind::StaleSignature));
    assert_eq!(stale.age, Some(Duration::from_secs(301)));
}

#[test]
fn future_dated_signature_beyond_skew_is_stale() {
    let store = store_with_active("k1", SignatureAlgorithm::Ed25519);
    let signer = Signer::new(&store);
    let verifier = Verifier::new(&store);
    let content = Content::json(r#"{"user":"alice"}"#).unwrap();
    let config = VerifyConfig::default().with_max_age(Duration::from_secs(300));

    let envelope = signer.sign_at(&content, &SignOptions::default(), 10_000).unwrap();

    // 30 s ahead sits inside the default 60 s tolerance.
    let skewed = verifier
        .verify_at(Some(&envelope), &content, &no_headers(), &config, 9_970)
        .unwrap();
    assert!(skewed.is_valid);

    // 5 minutes ahead does not.
    let untrusted = verifier
        .verify_at(Some(&envelope), &content, &no_headers(), &config, 9_700)
        .unwrap();
    assert!(!untrusted.is_valid);
    assert_eq!(untrusted.error_kind, Some(VerificationErrorKind::StaleSignature));
}

#[test]
fn no_timestamp_skips_the_freshness_check() {
    let store = store_with_active("k1", SignatureAlgorithm::Ed25519);
    let signer = Signer::new(&store);
    let verifier = Verifier::new(&store);
    let content = Content::json(r#"{"user":"alice"}"#).unwrap();

    let envelope = signer
        .sign(&content, &SignOptions::default().without_timestamp())
        .unwrap();
    assert_eq!(envelope.timestamp, None);

    let result = verifier
        .verify_at(
            Some(&envelope),
            &content,
            &no_headers(),
            &VerifyConfig::default().with_max_age(Duration::from_secs(1)),
            u64::MAX,
        )
        .unwrap();
    assert!(result.is_valid);
    assert_eq!(result.age, None);
}

#[test]
fn out_of_band_public_key_verifies_without_store_lookup() {
    let signing_store = store_with_active("k1", SignatureAlgorithm::Ed25519);
    let signer = Signer::new(&signing_store);
    let content = Content::Markup("<p>page</p>".into());
    let envelope = signer.sign_at(&content, &SignOptions::default(), 500).unwrap();

    // The verifying side knows nothing but the SPKI key from the page.
    let spki = signing_store
        .active_key()
        .unwrap()
        .public
        .to_spki_base64()
        .unwrap();
    let imported =
        PublicKeyMaterial::from_spki_base64(SignatureAlgorithm::Ed25519, &spki).unwrap();

    let empty_store = KeyStore::new();
    let verifier = Verifier::new(&empty_store);
    let result = verifier
        .verify_with_key_at(
            &envelope,
            &imported,
            &content,
            &no_headers(),
            &VerifyConfig::default(),
            510,
        )
        .unwrap();
    assert!(result.is_valid);
    assert_eq!(result.age, Some(Duration::from_secs(10)));
}

#[test]
fn end_to_end_eddsa_scenario() {
    // Sign {"user":"alice"} under k1 (EdDSA) at t=1000.
    let store = store_with_active("k1", SignatureAlgorithm::Ed25519);
    let signer = Signer::new(&store);
    let verifier = Verifier::new(&store);
    let content = Content::json(r#"{"user":"alice"}"#).unwrap();
    let envelope = signer.sign_at(&content, &SignOptions::default(), 1000).unwrap();
    let config = VerifyConfig::default().with_max_age(Duration::from_secs(60));

    // Verifying at now=1010 with maxAge=60: valid, age 10.
    let fresh = verifier
        .verify_at(Some(&envelope), &content, &no_headers(), &config, 1010)
        .unwrap();
    assert!(fresh.is_valid);
    assert_eq!(fresh.age, Some(Duration::from_secs(10)));
    assert_eq!(
        fresh.content.as_deref(),
        Some(br#"{"user":"alice"}"#.as_slice())
    );

    // Verifying at now=1100: stale, age 100.
    let stale = verifier
        .verify_at(Some(&envelope), &content, &no_headers(), &config, 1100)
        .unwrap();
    assert!(!stale.is_valid);
    assert_eq!(stale.error_kind, Some(VerificationErrorKind::StaleSignature));
    assert_eq!(stale.age, Some(Duration::from_secs(100)));

    // The failure yields a security-event descriptor; the success none.
    let event = SecurityEvent::from_verification(&stale, Some(&envelope), 1100).unwrap();
    assert_eq!(event.outcome, VerificationErrorKind::StaleSignature);
    assert_eq!(event.key_id.as_deref(), Some("k1"));
    assert_eq!(event.age_secs, Some(100));
    assert!(SecurityEvent::from_verification(&fresh, Some(&envelope), 1100).is_none());
}

#[test]
fn signing_with_no_active_key_fails() {
    let store = KeyStore::new();
    let signer = Signer::new(&store);
    let err = signer
        .sign(&Content::Bytes(b"x".to_vec()), &SignOptions::default())
        .unwrap_err();
    assert!(err.to_string().contains("no active signing key"));
}

#[test]
fn script_injection_into_markup_still_verifies_but_byte_tamper_does_not() {
    let store = store_with_active("k1", SignatureAlgorithm::Ed25519);
    let signer = Signer::new(&store);
    let verifier = Verifier::new(&store);

    let original = Content::Markup("<html><body><p>news</p></body></html>".into());
    let envelope = signer.sign(&original, &SignOptions::default()).unwrap();

    // Script elements sit outside the signed canonical form; the
    // rendered content is what the signature covers.
    let with_script = Content::Markup(
        "<html><body><p>news</p><script>steal()</script></body></html>".into(),
    );
    let result = verifier
        .verify(Some(&envelope), &with_script, &no_headers(), &VerifyConfig::default())
        .unwrap();
    assert!(result.is_valid);

    // Changing rendered content is detected.
    let reworded = Content::Markup("<html><body><p>fake news</p></body></html>".into());
    let bad = verifier
        .verify(Some(&envelope), &reworded, &no_headers(), &VerifyConfig::default())
        .unwrap();
    assert!(!bad.is_valid);
    assert_eq!(bad.error_kind, Some(VerificationErrorKind::SignatureMismatch));
}
