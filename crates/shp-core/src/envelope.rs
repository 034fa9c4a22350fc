use shp_keys::{KeyId, SignatureAlgorithm};

/// The signature plus metadata accompanying signed content.
///
/// Created by the [`Signer`](crate::Signer), consumed by the
/// [`Verifier`](crate::Verifier); immutable once produced. Wire
/// representations live in the codec crate.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureEnvelope {
    /// Raw signature bytes over the signing input.
    pub signature: Vec<u8>,
    /// Algorithm the signature was produced under.
    pub algorithm: SignatureAlgorithm,
    /// Identifier of the signing key.
    pub key_id: KeyId,
    /// Signing time, seconds since the Unix epoch. Part of the signed
    /// bytes when present, so it cannot be altered post-signature.
    pub timestamp: Option<u64>,
    /// Case-normalized names of the headers bound into the signature,
    /// in signing order.
    pub signed_header_names: Option<Vec<String>>,
}

impl SignatureEnvelope {
    /// The header names bound into the signature, empty when none.
    pub fn signed_headers(&self) -> &[String] {
        self.signed_header_names.as_deref().unwrap_or(&[])
    }
}
