use serde::{Deserialize, Serialize};
use shp_keys::SignatureAlgorithm;

use crate::envelope::SignatureEnvelope;
use crate::verifier::{VerificationErrorKind, VerificationResult};

/// Structured descriptor of a failed verification, for an external
/// security-event collector.
///
/// The engine emits the descriptor; it performs no logging I/O itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// What failed.
    pub outcome: VerificationErrorKind,
    /// Key id the envelope referenced, when one was presented.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    /// Algorithm the envelope declared, when one was presented.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<SignatureAlgorithm>,
    /// When the verification ran, seconds since the Unix epoch.
    pub timestamp: u64,
    /// Signature age in seconds, when the envelope carried a timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_secs: Option<u64>,
}

impl SecurityEvent {
    /// Builds the event for a failed verification; `None` for successes
    /// and for the legacy unsigned pass-through (which reports no
    /// outcome kind).
    pub fn from_verification(
        result: &VerificationResult,
        envelope: Option<&SignatureEnvelope>,
        now: u64,
    ) -> Option<Self> {
        let outcome = result.error_kind?;
        Some(Self {
            outcome,
            key_id: envelope.map(|e| e.key_id.to_string()),
            algorithm: envelope.map(|e| e.algorithm),
            timestamp: now,
            age_secs: result.age.map(|age| age.as_secs()),
        })
    }
}
