//! Storage for the two secrets token-gated requests depend on.
//!
//! The client only ever reads `access_token`; writing and clearing tokens is
//! left to the application (login/logout flows).

#[cfg(feature = "keyring")]
mod keyring_store;
mod memory;

#[cfg(feature = "keyring")]
pub use keyring_store::KeyringCredentialStore;
pub use memory::MemoryCredentialStore;

use std::{error::Error as StdError, fmt, sync::Arc};
use thiserror::Error;

/// Names of the secrets kept by a [`CredentialStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialName {
    AccessToken,
    RefreshToken,
}

impl CredentialName {
    pub const ALL: [CredentialName; 2] = [Self::AccessToken, Self::RefreshToken];

    /// Key under which the secret is persisted.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
        }
    }
}

impl fmt::Display for CredentialName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CredentialError {
    #[error("credential backend failed to {action} {name}: {source}")]
    Backend {
        action: &'static str,
        name: CredentialName,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

/// Secure key-value persistence for the access and refresh tokens.
///
/// Absence is a normal state: `get` reports it as `None` and deletes are
/// idempotent. Implementations own their thread-safety.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialStore: Send + Sync {
    /// Store `value` under `name`, replacing any previous value.
    fn save(&self, name: CredentialName, value: &str) -> Result<(), CredentialError>;

    /// Read the value stored under `name`. Never fails.
    fn get(&self, name: CredentialName) -> Option<String>;

    /// Remove the value stored under `name`, if any.
    fn delete(&self, name: CredentialName) -> Result<(), CredentialError>;

    /// Remove both secrets.
    ///
    /// Every name is attempted even if an earlier delete fails; the first
    /// failure is returned.
    fn delete_all(&self) -> Result<(), CredentialError> {
        let mut first_err = None;
        for name in CredentialName::ALL {
            if let Err(err) = self.delete(name) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn save_access_token(&self, token: &str) -> Result<(), CredentialError> {
        self.save(CredentialName::AccessToken, token)
    }

    fn save_refresh_token(&self, token: &str) -> Result<(), CredentialError> {
        self.save(CredentialName::RefreshToken, token)
    }

    fn access_token(&self) -> Option<String> {
        self.get(CredentialName::AccessToken)
    }

    fn refresh_token(&self) -> Option<String> {
        self.get(CredentialName::RefreshToken)
    }
}

pub type DynCredentialStore = Arc<dyn CredentialStore>;

impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    fn save(&self, name: CredentialName, value: &str) -> Result<(), CredentialError> {
        (**self).save(name, value)
    }

    fn get(&self, name: CredentialName) -> Option<String> {
        (**self).get(name)
    }

    fn delete(&self, name: CredentialName) -> Result<(), CredentialError> {
        (**self).delete(name)
    }

    fn delete_all(&self) -> Result<(), CredentialError> {
        (**self).delete_all()
    }
}
