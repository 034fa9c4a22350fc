use crate::algorithm::SignatureAlgorithm;
use crate::identifiers::KeyId;
use crate::material::{PrivateKeyMaterial, PublicKeyMaterial};

/// A key identity held by the [`KeyStore`](crate::KeyStore).
///
/// Identities with private material can sign; verify-only identities
/// (imported public keys) can only verify. At most one identity per
/// store is active for signing.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyIdentity {
    /// Key identifier, referenced by envelopes.
    pub id: KeyId,
    /// Signature algorithm this key belongs to.
    pub algorithm: SignatureAlgorithm,
    /// Public key material.
    pub public: PublicKeyMaterial,
    /// Private key material; absent for verify-only identities.
    pub private: Option<PrivateKeyMaterial>,
    /// Whether this identity should be activated for signing on
    /// registration.
    pub active: bool,
    /// Creation time, seconds since the Unix epoch.
    pub created_at: u64,
}

impl KeyIdentity {
    /// Creates a signing identity from private material.
    pub fn signing(id: KeyId, private: PrivateKeyMaterial, created_at: u64) -> Self {
        let public = private.public();
        Self {
            id,
            algorithm: private.algorithm(),
            public,
            private: Some(private),
            active: false,
            created_at,
        }
    }

    /// Creates a verify-only identity from an imported public key.
    pub fn verify_only(id: KeyId, public: PublicKeyMaterial, created_at: u64) -> Self {
        Self {
            id,
            algorithm: public.algorithm(),
            public,
            private: None,
            active: false,
            created_at,
        }
    }

    /// Marks the identity for activation on registration.
    pub fn activated(mut self) -> Self {
        self.active = true;
        self
    }

    /// Whether the identity carries private material.
    pub fn can_sign(&self) -> bool {
        self.private.is_some()
    }
}
