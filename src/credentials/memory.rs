use super::{CredentialError, CredentialName, CredentialStore};
use crate::auth::SecretString;
use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

/// Process-local store; secrets vanish with the value.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: RwLock<HashMap<CredentialName, SecretString>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with an access token.
    #[must_use]
    pub fn with_access_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(CredentialName::AccessToken, SecretString::new(token));
        store
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn save(&self, name: CredentialName, value: &str) -> Result<(), CredentialError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, SecretString::new(value));
        Ok(())
    }

    fn get(&self, name: CredentialName) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&name)
            .map(|secret| secret.expose().to_owned())
    }

    fn delete(&self, name: CredentialName) -> Result<(), CredentialError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&name);
        Ok(())
    }

    fn delete_all(&self) -> Result<(), CredentialError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_overwrites_previous_value() {
        let store = MemoryCredentialStore::new();
        store.save(CredentialName::AccessToken, "one").unwrap();
        store.save(CredentialName::AccessToken, "two").unwrap();
        assert_eq!(store.get(CredentialName::AccessToken).as_deref(), Some("two"));
    }

    #[test]
    fn missing_entry_is_none() {
        let store = MemoryCredentialStore::new();
        assert!(store.get(CredentialName::RefreshToken).is_none());
    }

    #[test]
    fn delete_removes_only_named_secret() {
        let store = MemoryCredentialStore::with_access_token("a");
        store.save(CredentialName::RefreshToken, "r").unwrap();

        store.delete(CredentialName::AccessToken).unwrap();
        assert!(store.get(CredentialName::AccessToken).is_none());
        assert_eq!(store.get(CredentialName::RefreshToken).as_deref(), Some("r"));
    }

    #[test]
    fn delete_all_is_idempotent() {
        let store = MemoryCredentialStore::with_access_token("a");
        store.delete_all().unwrap();
        store.delete_all().unwrap();
        assert!(store.get(CredentialName::AccessToken).is_none());
        assert!(store.get(CredentialName::RefreshToken).is_none());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let store = MemoryCredentialStore::with_access_token("topsecret");
        assert!(!format!("{store:?}").contains("topsecret"));
    }
}
