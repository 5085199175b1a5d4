//! Typed async JSON REST client.
//!
//! * Unauthenticated `fetch` / `post` / `delete`.
//! * Token-gated `fetch_with_token` / `post_with_token` / `delete_with_token` /
//!   `patch_with_token`, which attach `Authorization: Bearer <access_token>`
//!   read from a [`CredentialStore`].
//! * Pluggable [`AsyncTransport`]; `reqwest` by default.

// compile-time guard: pick a TLS backend for the default transport.
#[cfg(not(any(feature = "rustls", feature = "native-tls")))]
compile_error!("Enable at least one TLS backend: `rustls` (default) or `native-tls`.");

pub mod auth;
pub mod client;
pub mod credentials;
pub mod error;
pub mod response_hook;
pub mod service;
pub mod transport;
mod util;

pub use auth::{BearerToken, SecretString};
pub use client::{Client, ClientBuilder};
pub use credentials::{
    CredentialError, CredentialName, CredentialStore, DynCredentialStore, MemoryCredentialStore,
};
#[cfg(feature = "keyring")]
pub use credentials::KeyringCredentialStore;
pub use error::{Error, ErrorKind, HttpError, Result, TransportErrorKind};
pub use response_hook::{ResponseHook, ResponseHookContext};
pub use service::{Deletable, Fetchable, Postable, TokenGated};
pub use transport::{
    AsyncTransport, DynAsyncTransport, ReqwestAsync, TransportRequest, TransportResponse,
};
