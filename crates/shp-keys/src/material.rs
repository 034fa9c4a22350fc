use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use ed25519_dalek as ed25519;
use pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rand::rngs::OsRng;
use rsa::pkcs1v15;
use sha2::{Digest, Sha256};
use signature::{SignatureEncoding, Signer, Verifier};

use crate::algorithm::SignatureAlgorithm;
use crate::errors::KeyMaterialError;

/// RSA modulus size for generated keys.
const RSA_BITS: usize = 2048;

/// Public key material, tagged by algorithm.
///
/// Interchange format is SPKI DER, base64 (standard alphabet) in text
/// contexts.
#[derive(Debug, Clone, PartialEq)]
pub enum PublicKeyMaterial {
    /// Ed25519 verifying key.
    Ed25519(ed25519::VerifyingKey),
    /// RSA public key, used with PKCS1v1.5/SHA-256.
    Rsa(rsa::RsaPublicKey),
}

impl PublicKeyMaterial {
    /// The algorithm this material belongs to.
    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            PublicKeyMaterial::Ed25519(_) => SignatureAlgorithm::Ed25519,
            PublicKeyMaterial::Rsa(_) => SignatureAlgorithm::RsaPkcs1Sha256,
        }
    }

    /// Imports a public key from SPKI DER for the declared algorithm.
    pub fn from_spki_der(
        algorithm: SignatureAlgorithm,
        der: &[u8],
    ) -> Result<Self, KeyMaterialError> {
        match algorithm {
            SignatureAlgorithm::Ed25519 => ed25519::VerifyingKey::from_public_key_der(der)
                .map(PublicKeyMaterial::Ed25519)
                .map_err(|e| KeyMaterialError::InvalidEncoding(e.to_string())),
            SignatureAlgorithm::RsaPkcs1Sha256 => rsa::RsaPublicKey::from_public_key_der(der)
                .map(PublicKeyMaterial::Rsa)
                .map_err(|e| KeyMaterialError::InvalidEncoding(e.to_string())),
        }
    }

    /// Imports a public key from base64-encoded SPKI DER.
    pub fn from_spki_base64(
        algorithm: SignatureAlgorithm,
        encoded: &str,
    ) -> Result<Self, KeyMaterialError> {
        let der = STANDARD
            .decode(encoded.trim())
            .map_err(|e| KeyMaterialError::InvalidEncoding(e.to_string()))?;
        Self::from_spki_der(algorithm, &der)
    }

    /// Exports the key as SPKI DER.
    pub fn to_spki_der(&self) -> Result<Vec<u8>, KeyMaterialError> {
        let doc = match self {
            PublicKeyMaterial::Ed25519(key) => key.to_public_key_der(),
            PublicKeyMaterial::Rsa(key) => key.to_public_key_der(),
        }
        .map_err(|e| KeyMaterialError::InvalidEncoding(e.to_string()))?;
        Ok(doc.as_bytes().to_vec())
    }

    /// Exports the key as base64-encoded SPKI DER.
    pub fn to_spki_base64(&self) -> Result<String, KeyMaterialError> {
        Ok(STANDARD.encode(self.to_spki_der()?))
    }

    /// Stable thumbprint: base64url-no-pad SHA-256 of the SPKI DER.
    pub fn thumbprint(&self) -> Result<String, KeyMaterialError> {
        let der = self.to_spki_der()?;
        Ok(URL_SAFE_NO_PAD.encode(Sha256::digest(&der)))
    }

    /// Verifies a signature over `message`.
    ///
    /// Any failure, malformed signature bytes included, is a mismatch.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        match self {
            PublicKeyMaterial::Ed25519(key) => match ed25519::Signature::from_slice(signature) {
                Ok(sig) => key.verify(message, &sig).is_ok(),
                Err(_) => false,
            },
            PublicKeyMaterial::Rsa(key) => {
                let verifying_key = pkcs1v15::VerifyingKey::<Sha256>::new(key.clone());
                match pkcs1v15::Signature::try_from(signature) {
                    Ok(sig) => verifying_key.verify(message, &sig).is_ok(),
                    Err(_) => false,
                }
            }
        }
    }
}

/// Private key material, tagged by algorithm.
#[derive(Clone, PartialEq)]
pub enum PrivateKeyMaterial {
    /// Ed25519 signing key.
    Ed25519(ed25519::SigningKey),
    /// RSA private key, used with PKCS1v1.5/SHA-256.
    Rsa(Box<rsa::RsaPrivateKey>),
}

/// Secret material never appears in debug output.
impl std::fmt::Debug for PrivateKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrivateKeyMaterial::Ed25519(_) => f.write_str("PrivateKeyMaterial::Ed25519(..)"),
            PrivateKeyMaterial::Rsa(_) => f.write_str("PrivateKeyMaterial::Rsa(..)"),
        }
    }
}

impl PrivateKeyMaterial {
    /// Generates fresh key material for the algorithm.
    pub fn generate(algorithm: SignatureAlgorithm) -> Result<Self, KeyMaterialError> {
        match algorithm {
            SignatureAlgorithm::Ed25519 => Ok(PrivateKeyMaterial::Ed25519(
                ed25519::SigningKey::generate(&mut OsRng),
            )),
            SignatureAlgorithm::RsaPkcs1Sha256 => {
                let key = rsa::RsaPrivateKey::new(&mut OsRng, RSA_BITS)
                    .map_err(|e| KeyMaterialError::Generation(e.to_string()))?;
                Ok(PrivateKeyMaterial::Rsa(Box::new(key)))
            }
        }
    }

    /// The algorithm this material belongs to.
    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            PrivateKeyMaterial::Ed25519(_) => SignatureAlgorithm::Ed25519,
            PrivateKeyMaterial::Rsa(_) => SignatureAlgorithm::RsaPkcs1Sha256,
        }
    }

    /// The corresponding public key material.
    pub fn public(&self) -> PublicKeyMaterial {
        match self {
            PrivateKeyMaterial::Ed25519(key) => PublicKeyMaterial::Ed25519(key.verifying_key()),
            PrivateKeyMaterial::Rsa(key) => PublicKeyMaterial::Rsa(key.to_public_key()),
        }
    }

    /// Signs `message`, returning raw signature bytes.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, KeyMaterialError> {
        match self {
            PrivateKeyMaterial::Ed25519(key) => key
                .try_sign(message)
                .map(|sig| sig.to_bytes().to_vec())
                .map_err(|e| KeyMaterialError::Signing(e.to_string())),
            PrivateKeyMaterial::Rsa(key) => {
                let signing_key = pkcs1v15::SigningKey::<Sha256>::new((**key).clone());
                signing_key
                    .try_sign(message)
                    .map(|sig| sig.to_vec())
                    .map_err(|e| KeyMaterialError::Signing(e.to_string()))
            }
        }
    }

    /// Imports a private key from PKCS#8 DER for the declared algorithm.
    pub fn from_pkcs8_der(
        algorithm: SignatureAlgorithm,
        der: &[u8],
    ) -> Result<Self, KeyMaterialError> {
        match algorithm {
            SignatureAlgorithm::Ed25519 => ed25519::SigningKey::from_pkcs8_der(der)
                .map(PrivateKeyMaterial::Ed25519)
                .map_err(|e| KeyMaterialError::InvalidEncoding(e.to_string())),
            SignatureAlgorithm::RsaPkcs1Sha256 => rsa::RsaPrivateKey::from_pkcs8_der(der)
                .map(|key| PrivateKeyMaterial::Rsa(Box::new(key)))
                .map_err(|e| KeyMaterialError::InvalidEncoding(e.to_string())),
        }
    }

    /// Imports a private key from base64-encoded PKCS#8 DER.
    pub fn from_pkcs8_base64(
        algorithm: SignatureAlgorithm,
        encoded: &str,
    ) -> Result<Self, KeyMaterialError> {
        let der = STANDARD
            .decode(encoded.trim())
            .map_err(|e| KeyMaterialError::InvalidEncoding(e.to_string()))?;
        Self::from_pkcs8_der(algorithm, &der)
    }

    /// Exports the key as PKCS#8 DER.
    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>, KeyMaterialError> {
        let doc = match self {
            PrivateKeyMaterial::Ed25519(key) => key.to_pkcs8_der(),
            PrivateKeyMaterial::Rsa(key) => key.to_pkcs8_der(),
        }
        .map_err(|e| KeyMaterialError::InvalidEncoding(e.to_string()))?;
        Ok(doc.as_bytes().to_vec())
    }

    /// Exports the key as base64-encoded PKCS#8 DER.
    pub fn to_pkcs8_base64(&self) -> Result<String, KeyMaterialError> {
        Ok(STANDARD.encode(self.to_pkcs8_der()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ed25519_sign_verify_round_trip() {
        let private = PrivateKeyMaterial::generate(SignatureAlgorithm::Ed25519).unwrap();
        let public = private.public();
        let sig = private.sign(b"content").unwrap();
        assert_eq!(sig.len(), 64);
        assert!(public.verify(b"content", &sig));
        assert!(!public.verify(b"tampered", &sig));
    }

    #[test]
    fn rsa_sign_verify_round_trip() {
        let private = PrivateKeyMaterial::generate(SignatureAlgorithm::RsaPkcs1Sha256).unwrap();
        let public = private.public();
        let sig = private.sign(b"content").unwrap();
        assert!(public.verify(b"content", &sig));
        assert!(!public.verify(b"tampered", &sig));
    }

    #[test]
    fn malformed_signature_bytes_are_a_mismatch() {
        let private = PrivateKeyMaterial::generate(SignatureAlgorithm::Ed25519).unwrap();
        assert!(!private.public().verify(b"content", b"short"));
    }

    #[test]
    fn spki_round_trip_preserves_verification() {
        let private = PrivateKeyMaterial::generate(SignatureAlgorithm::Ed25519).unwrap();
        let sig = private.sign(b"content").unwrap();

        let encoded = private.public().to_spki_base64().unwrap();
        let imported =
            PublicKeyMaterial::from_spki_base64(SignatureAlgorithm::Ed25519, &encoded).unwrap();
        assert!(imported.verify(b"content", &sig));
    }

    #[test]
    fn spki_with_wrong_declared_algorithm_is_rejected() {
        let private = PrivateKeyMaterial::generate(SignatureAlgorithm::Ed25519).unwrap();
        let der = private.public().to_spki_der().unwrap();
        assert!(PublicKeyMaterial::from_spki_der(SignatureAlgorithm::RsaPkcs1Sha256, &der).is_err());
    }

    #[test]
    fn pkcs8_round_trip_preserves_signing() {
        let private = PrivateKeyMaterial::generate(SignatureAlgorithm::Ed25519).unwrap();
        let encoded = private.to_pkcs8_base64().unwrap();
        let imported =
            PrivateKeyMaterial::from_pkcs8_base64(SignatureAlgorithm::Ed25519, &encoded).unwrap();
        let sig = imported.sign(b"content").unwrap();
        assert!(private.public().verify(b"content", &sig));
    }

    #[test]
    fn thumbprint_is_stable() {
        let private = PrivateKeyMaterial::generate(SignatureAlgorithm::Ed25519).unwrap();
        let public = private.public();
        assert_eq!(public.thumbprint().unwrap(), public.thumbprint().unwrap());
    }
}
