use std::collections::BTreeMap;

use shp_canonical::{CanonicalizationError, Canonicalizer, Content};
use shp_keys::{KeyMaterialError, KeyStore, KeyStoreError};

use crate::envelope::SignatureEnvelope;
use crate::now_secs;

/// Error returned when signing fails.
///
/// Unlike verification outcomes, these are hard failures: the caller
/// asked for a signature and none could be produced.
#[derive(thiserror::Error, Debug)]
pub enum SignError {
    /// Content could not be canonicalized.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
    /// No active signing key (or another key table failure).
    #[error("key store error: {0}")]
    Keys(#[from] KeyStoreError),
    /// The underlying cryptographic signing operation failed.
    #[error("signing error: {0}")]
    Signing(#[from] KeyMaterialError),
}

/// Options controlling a single sign call.
#[derive(Debug, Clone)]
pub struct SignOptions {
    /// Header names to bind into the signature, in signing order.
    pub include_headers: Vec<String>,
    /// Values for the headers named above (lookup is
    /// case-insensitive).
    pub header_values: BTreeMap<String, String>,
    /// Whether to stamp the signing time into the envelope. The
    /// timestamp becomes part of the signed bytes.
    pub embed_timestamp: bool,
}

impl Default for SignOptions {
    fn default() -> Self {
        Self {
            include_headers: Vec::new(),
            header_values: BTreeMap::new(),
            embed_timestamp: true,
        }
    }
}

impl SignOptions {
    /// Binds the named headers and their values into the signature.
    pub fn with_headers(
        mut self,
        names: Vec<String>,
        values: BTreeMap<String, String>,
    ) -> Self {
        self.include_headers = names;
        self.header_values = values;
        self
    }

    /// Omits the timestamp from the envelope.
    pub fn without_timestamp(mut self) -> Self {
        self.embed_timestamp = false;
        self
    }
}

/// Signs content with the key store's active identity.
///
/// Borrows the store; signing never mutates it, so any number of
/// signers may share one store across threads.
#[derive(Debug)]
pub struct Signer<'ks> {
    keys: &'ks KeyStore,
    canonicalizer: Canonicalizer,
}

impl<'ks> Signer<'ks> {
    /// Creates a signer over the given key store.
    pub fn new(keys: &'ks KeyStore) -> Self {
        Self {
            keys,
            canonicalizer: Canonicalizer::new(),
        }
    }

    /// Signs `content`, stamping the current time when the options ask
    /// for a timestamp.
    pub fn sign(
        &self,
        content: &Content,
        options: &SignOptions,
    ) -> Result<SignatureEnvelope, SignError> {
        self.sign_at(content, options, now_secs())
    }

    /// Signs `content` with an explicit signing time.
    pub fn sign_at(
        &self,
        content: &Content,
        options: &SignOptions,
        now: u64,
    ) -> Result<SignatureEnvelope, SignError> {
        let key = self.keys.active_key()?;
        let timestamp = options.embed_timestamp.then_some(now);

        let input = self.canonicalizer.signing_input(
            content,
            &options.include_headers,
            &options.header_values,
            timestamp,
        )?;

        // The store only activates identities with private material.
        let private = key
            .private
            .as_ref()
            .ok_or_else(|| KeyStoreError::NotSignable(key.id.to_string()))?;
        let signature = private.sign(input.as_bytes())?;

        let signed_header_names = if options.include_headers.is_empty() {
            None
        } else {
            Some(
                options
                    .include_headers
                    .iter()
                    .map(|name| name.to_ascii_lowercase())
                    .collect(),
            )
        };

        Ok(SignatureEnvelope {
            signature,
            algorithm: key.algorithm,
            key_id: key.id,
            timestamp,
            signed_header_names,
        })
    }
}
