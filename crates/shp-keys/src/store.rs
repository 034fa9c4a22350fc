use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::errors::KeyStoreError;
use crate::identifiers::KeyId;
use crate::identity::KeyIdentity;

/// One entry in the key table. Revocation is recorded here rather than
/// by removal so that a revoked id can never be re-registered.
#[derive(Debug)]
struct KeyEntry {
    identity: KeyIdentity,
    revoked: bool,
}

#[derive(Debug, Default)]
struct TableState {
    keys: BTreeMap<KeyId, KeyEntry>,
    active: Option<KeyId>,
}

/// Key table with one active signing identity, retained verify keys,
/// rotation, and irreversible revocation.
///
/// Mutations take the write lock, lookups the read lock: a resolve
/// concurrent with a rotation observes either the pre- or post-rotation
/// state, never a torn intermediate. Multiple independent stores may
/// coexist in one process.
#[derive(Debug, Default)]
pub struct KeyStore {
    state: RwLock<TableState>,
}

impl KeyStore {
    /// Creates an empty key store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with identities; any identity flagged
    /// `active` becomes the signing key (the last such flag wins, as
    /// with sequential `register` calls).
    pub fn with_keys(identities: Vec<KeyIdentity>) -> Result<Self, KeyStoreError> {
        let store = Self::new();
        for identity in identities {
            store.register(identity)?;
        }
        Ok(store)
    }

    /// Registers a new identity. Fails with [`KeyStoreError::DuplicateKeyId`]
    /// if the id already exists (revoked ids included).
    pub fn register(&self, identity: KeyIdentity) -> Result<(), KeyStoreError> {
        let mut state = self.state.write().expect("key table lock poisoned");
        if state.keys.contains_key(&identity.id) {
            return Err(KeyStoreError::DuplicateKeyId(identity.id.to_string()));
        }
        let id = identity.id.clone();
        let activate = identity.active;
        if activate && !identity.can_sign() {
            return Err(KeyStoreError::NotSignable(id.to_string()));
        }
        state.keys.insert(id.clone(), KeyEntry { identity, revoked: false });
        if activate {
            state.active = Some(id);
        }
        Ok(())
    }

    /// Marks exactly one identity active for signing, deactivating any
    /// previously active identity.
    pub fn activate(&self, id: &KeyId) -> Result<(), KeyStoreError> {
        let mut state = self.state.write().expect("key table lock poisoned");
        let entry = state
            .keys
            .get(id)
            .ok_or_else(|| KeyStoreError::UnknownKeyId(id.to_string()))?;
        if entry.revoked {
            return Err(KeyStoreError::RevokedKey(id.to_string()));
        }
        if !entry.identity.can_sign() {
            return Err(KeyStoreError::NotSignable(id.to_string()));
        }
        state.active = Some(id.clone());
        Ok(())
    }

    /// Resolves an identity for verification.
    pub fn resolve(&self, id: &KeyId) -> Result<KeyIdentity, KeyStoreError> {
        let state = self.state.read().expect("key table lock poisoned");
        let entry = state
            .keys
            .get(id)
            .ok_or_else(|| KeyStoreError::UnknownKeyId(id.to_string()))?;
        if entry.revoked {
            return Err(KeyStoreError::RevokedKey(id.to_string()));
        }
        Ok(entry.identity.clone())
    }

    /// Marks a key permanently unusable for both signing and
    /// verification. Irreversible within the process lifetime.
    pub fn revoke(&self, id: &KeyId) -> Result<(), KeyStoreError> {
        let mut state = self.state.write().expect("key table lock poisoned");
        let entry = state
            .keys
            .get_mut(id)
            .ok_or_else(|| KeyStoreError::UnknownKeyId(id.to_string()))?;
        entry.revoked = true;
        if state.active.as_ref() == Some(id) {
            state.active = None;
        }
        Ok(())
    }

    /// The identity currently active for signing.
    pub fn active_key(&self) -> Result<KeyIdentity, KeyStoreError> {
        let state = self.state.read().expect("key table lock poisoned");
        let id = state.active.as_ref().ok_or(KeyStoreError::NoActiveKey)?;
        let entry = state.keys.get(id).ok_or(KeyStoreError::NoActiveKey)?;
        Ok(entry.identity.clone())
    }

    /// Ids of all registered, non-revoked identities.
    pub fn registered_ids(&self) -> Vec<KeyId> {
        let state = self.state.read().expect("key table lock poisoned");
        state
            .keys
            .iter()
            .filter(|(_, entry)| !entry.revoked)
            .map(|(id, _)| id.clone())
            .collect()
    }
}
