use super::{CredentialError, CredentialName, CredentialStore};
use keyring::Entry;

/// OS keychain backed store (macOS Keychain, Windows Credential Manager,
/// Secret Service on Linux).
///
/// Each secret is one keychain item: service = the configured service name,
/// account = [`CredentialName::as_str`].
#[derive(Debug, Clone)]
pub struct KeyringCredentialStore {
    service: String,
}

impl KeyringCredentialStore {
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, name: CredentialName) -> Result<Entry, keyring::Error> {
        Entry::new(&self.service, name.as_str())
    }
}

fn backend(action: &'static str, name: CredentialName, err: keyring::Error) -> CredentialError {
    CredentialError::Backend {
        action,
        name,
        source: Box::new(err),
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn save(&self, name: CredentialName, value: &str) -> Result<(), CredentialError> {
        self.entry(name)
            .and_then(|entry| entry.set_password(value))
            .map_err(|err| backend("save", name, err))
    }

    fn get(&self, name: CredentialName) -> Option<String> {
        match self.entry(name).and_then(|entry| entry.get_password()) {
            Ok(value) => Some(value),
            Err(keyring::Error::NoEntry) => None,
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    service = %self.service,
                    credential = %name,
                    error = %_err,
                    "keychain read failed; treating credential as absent"
                );
                None
            }
        }
    }

    fn delete(&self, name: CredentialName) -> Result<(), CredentialError> {
        match self.entry(name).and_then(|entry| entry.delete_credential()) {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(backend("delete", name, err)),
        }
    }
}
