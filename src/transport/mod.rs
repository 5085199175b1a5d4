//! Transport seam: the client hands a fully built [`TransportRequest`] to an
//! [`AsyncTransport`] and gets back a raw [`TransportResponse`].
//!
//! * `ReqwestAsync` is the default implementation.
//! * Transports never interpret status codes or bodies.

pub mod async_transport;
#[cfg(feature = "metrics")]
pub(crate) mod metrics;

pub use async_transport::{AsyncTransport, DynAsyncTransport, ReqwestAsync};

use http::{HeaderMap, Method};
use url::Url;

/// Request envelope, built fresh for every call.
#[derive(Clone, Debug)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// Response envelope exactly as received.
#[derive(Clone, Debug)]
pub struct TransportResponse {
    /// Raw status; validated by the client, not the transport.
    pub status: u16,
    pub headers: HeaderMap,
    /// `None` when the server sent no payload.
    pub body: Option<Vec<u8>>,
}

impl TransportResponse {
    #[must_use]
    pub fn new(status: u16, body: Option<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
        }
    }

    #[must_use]
    pub fn json(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, Some(body.into()))
    }
}
