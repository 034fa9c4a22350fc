use serde::{Deserialize, Serialize};

/// Supported asymmetric signature algorithms.
///
/// Signer and Verifier stay uniform over the active variant; adding an
/// algorithm means adding a variant here and arms in the material types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureAlgorithm {
    /// Ed25519 (EdDSA over Curve25519).
    Ed25519,
    /// RSASSA-PKCS1-v1_5 with SHA-256.
    RsaPkcs1Sha256,
}

impl SignatureAlgorithm {
    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureAlgorithm::Ed25519 => "ed25519",
            SignatureAlgorithm::RsaPkcs1Sha256 => "rsa-pkcs1-sha256",
        }
    }

    /// Parses a wire name. Accepts the canonical names plus the aliases
    /// used in the public documentation (`Ed25519`, `RSA`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ed25519" | "Ed25519" | "ED25519" => Some(SignatureAlgorithm::Ed25519),
            "rsa-pkcs1-sha256" | "RSA" | "rsa" | "RSASSA-PKCS1-v1_5" => {
                Some(SignatureAlgorithm::RsaPkcs1Sha256)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
