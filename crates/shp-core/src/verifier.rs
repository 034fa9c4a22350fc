use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shp_canonical::{CanonicalizationError, Canonicalizer, Content};
use shp_keys::{KeyMaterialError, KeyStore, PublicKeyMaterial};

use crate::envelope::SignatureEnvelope;
use crate::now_secs;

/// Default maximum signature age, matching the documented client
/// default of 300 seconds.
const DEFAULT_MAX_AGE: Duration = Duration::from_secs(300);

/// Default tolerance for verifier/signer clock skew.
const DEFAULT_CLOCK_SKEW_TOLERANCE: Duration = Duration::from_secs(60);

/// Structural error during verification.
///
/// These are hard failures of the verification *machinery*; an invalid
/// signature is not an error but a [`VerificationResult`].
#[derive(thiserror::Error, Debug)]
pub enum VerifyError {
    /// Received content could not be canonicalized.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
    /// An out-of-band supplied public key could not be decoded.
    #[error("key material error: {0}")]
    Key(#[from] KeyMaterialError),
}

/// Non-success verification outcomes, in check order.
///
/// These are normal result values: failed verification is an expected,
/// frequent, handleable outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerificationErrorKind {
    /// No signature was presented and strict mode is on.
    MissingSignature,
    /// The envelope references a key the store does not know, or one
    /// that has been revoked.
    UnknownOrRevokedKey,
    /// The signature does not match the recomputed canonical bytes.
    SignatureMismatch,
    /// The signature is older than the configured maximum age, or
    /// future-dated beyond the clock-skew tolerance.
    StaleSignature,
}

/// Outcome of one verification call. Constructed once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResult {
    /// Whether the signature verified.
    pub is_valid: bool,
    /// Canonical content bytes; populated only when `is_valid` is true.
    pub content: Option<Vec<u8>>,
    /// Failure kind; `None` on success and in the legacy
    /// (non-strict, unsigned) pass-through.
    pub error_kind: Option<VerificationErrorKind>,
    /// Signature age, when a timestamp was present.
    pub age: Option<Duration>,
}

impl VerificationResult {
    fn success(content: Vec<u8>, age: Option<Duration>) -> Self {
        Self {
            is_valid: true,
            content: Some(content),
            error_kind: None,
            age,
        }
    }

    fn failure(kind: VerificationErrorKind, age: Option<Duration>) -> Self {
        Self {
            is_valid: false,
            content: None,
            error_kind: Some(kind),
            age,
        }
    }

    /// Legacy pass-through: unsigned content accepted unverified.
    fn unverified() -> Self {
        Self {
            is_valid: false,
            content: None,
            error_kind: None,
            age: None,
        }
    }
}

/// Verification policy for a single call.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// Maximum acceptable signature age; `None` disables the freshness
    /// check.
    pub max_age: Option<Duration>,
    /// Strict mode treats absent signatures as failures; legacy mode
    /// passes unsigned content through unverified.
    pub strict: bool,
    /// How far in the future a timestamp may sit before it is treated
    /// as untrusted.
    pub clock_skew_tolerance: Duration,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            max_age: Some(DEFAULT_MAX_AGE),
            strict: true,
            clock_skew_tolerance: DEFAULT_CLOCK_SKEW_TOLERANCE,
        }
    }
}

impl VerifyConfig {
    /// Legacy-mode config: unsigned content degrades gracefully.
    pub fn legacy() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }

    /// Sets the maximum acceptable signature age.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Disables the freshness check.
    pub fn without_max_age(mut self) -> Self {
        self.max_age = None;
        self
    }
}

/// Verifies signature envelopes against received content.
///
/// Each call is an independent, terminal state machine; the verifier
/// keeps no state across calls and never mutates the key store.
#[derive(Debug)]
pub struct Verifier<'ks> {
    keys: &'ks KeyStore,
    canonicalizer: Canonicalizer,
}

impl<'ks> Verifier<'ks> {
    /// Creates a verifier over the given key store.
    pub fn new(keys: &'ks KeyStore) -> Self {
        Self {
            keys,
            canonicalizer: Canonicalizer::new(),
        }
    }

    /// Verifies `envelope` against `content` at the current time.
    pub fn verify(
        &self,
        envelope: Option<&SignatureEnvelope>,
        content: &Content,
        header_values: &BTreeMap<String, String>,
        config: &VerifyConfig,
    ) -> Result<VerificationResult, VerifyError> {
        self.verify_at(envelope, content, header_values, config, now_secs())
    }

    /// Verifies `envelope` against `content` with an explicit clock.
    ///
    /// Checks run in order and the first failing check is terminal:
    /// missing signature, key resolution, recanonicalization,
    /// cryptographic verification, freshness.
    pub fn verify_at(
        &self,
        envelope: Option<&SignatureEnvelope>,
        content: &Content,
        header_values: &BTreeMap<String, String>,
        config: &VerifyConfig,
        now: u64,
    ) -> Result<VerificationResult, VerifyError> {
        // 1. MissingSignature
        let Some(envelope) = envelope else {
            return Ok(if config.strict {
                VerificationResult::failure(VerificationErrorKind::MissingSignature, None)
            } else {
                VerificationResult::unverified()
            });
        };

        // 2. KeyResolution
        let key = match self.keys.resolve(&envelope.key_id) {
            Ok(identity) => identity.public,
            Err(_) => {
                return Ok(VerificationResult::failure(
                    VerificationErrorKind::UnknownOrRevokedKey,
                    None,
                ))
            }
        };

        self.check_signature(envelope, &key, content, header_values, config, now)
    }

    /// Verifies against an out-of-band supplied public key (e.g. a key
    /// carried in the document itself), bypassing store resolution.
    pub fn verify_with_key(
        &self,
        envelope: &SignatureEnvelope,
        public_key: &PublicKeyMaterial,
        content: &Content,
        header_values: &BTreeMap<String, String>,
        config: &VerifyConfig,
    ) -> Result<VerificationResult, VerifyError> {
        self.verify_with_key_at(envelope, public_key, content, header_values, config, now_secs())
    }

    /// As [`verify_with_key`](Self::verify_with_key), with an explicit
    /// clock.
    pub fn verify_with_key_at(
        &self,
        envelope: &SignatureEnvelope,
        public_key: &PublicKeyMaterial,
        content: &Content,
        header_values: &BTreeMap<String, String>,
        config: &VerifyConfig,
        now: u64,
    ) -> Result<VerificationResult, VerifyError> {
        self.check_signature(envelope, public_key, content, header_values, config, now)
    }

    /// Steps 3-6: recanonicalize, crypto-verify, freshness-check.
    fn check_signature(
        &self,
        envelope: &SignatureEnvelope,
        key: &PublicKeyMaterial,
        content: &Content,
        header_values: &BTreeMap<String, String>,
        config: &VerifyConfig,
        now: u64,
    ) -> Result<VerificationResult, VerifyError> {
        // 3. Recanonicalization: rebuild the bytes the signature should
        // cover from the received content, never from anything the
        // sender pre-rendered.
        let canonical = self.canonicalizer.canonicalize(content)?;
        let include_headers: Vec<String> = envelope.signed_headers().to_vec();
        let input = self.canonicalizer.signing_input_from(
            &canonical,
            &include_headers,
            header_values,
            envelope.timestamp,
        )?;

        let age = envelope
            .timestamp
            .map(|ts| Duration::from_secs(now.saturating_sub(ts)));

        // 4. CryptoVerify. An algorithm mismatch between envelope and
        // key cannot validate and reports as a mismatch.
        let algorithm_matches = key.algorithm() == envelope.algorithm;
        if !algorithm_matches || !key.verify(input.as_bytes(), &envelope.signature) {
            return Ok(VerificationResult::failure(
                VerificationErrorKind::SignatureMismatch,
                age,
            ));
        }

        // 5. FreshnessCheck
        if let (Some(max_age), Some(ts)) = (config.max_age, envelope.timestamp) {
            let future_by = ts.saturating_sub(now);
            if future_by > config.clock_skew_tolerance.as_secs() {
                return Ok(VerificationResult::failure(
                    VerificationErrorKind::StaleSignature,
                    age,
                ));
            }
            if now.saturating_sub(ts) > max_age.as_secs() {
                return Ok(VerificationResult::failure(
                    VerificationErrorKind::StaleSignature,
                    age,
                ));
            }
        }

        // 6. Success
        Ok(VerificationResult::success(canonical.into_bytes(), age))
    }
}
