//! Response classification for the two request flavours.
//!
//! The two paths disagree at the 210 boundary and on empty bodies; both
//! behaviours are kept as shipped:
//!
//! | path          | accepted status | missing body    |
//! |---------------|-----------------|-----------------|
//! | unauthenticated | `<= 210`      | `EmptyBody`     |
//! | token-gated   | `< 210`         | `ServerError`   |
//!
//! Rejected statuses map to `Http` on the unauthenticated path and to the
//! generic `ServerError` on the gated one.

#[cfg(feature = "tracing")]
use crate::util::redact::body_for_log;
use crate::{Error, HttpError, auth::BearerToken};
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

/// Highest status an unauthenticated call accepts.
pub(crate) const OPEN_STATUS_MAX: u16 = 210;
/// Token-gated calls accept statuses strictly below this.
pub(crate) const GATED_STATUS_LIMIT: u16 = 210;

/// Authorization mode of a single call.
#[derive(Clone, Debug)]
pub(crate) enum Gate {
    Open,
    Bearer(BearerToken),
}

impl Gate {
    pub(crate) fn secret(&self) -> Option<&str> {
        match self {
            Self::Open => None,
            Self::Bearer(token) => Some(token.secret()),
        }
    }

    #[cfg(feature = "tracing")]
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Open => "none",
            Self::Bearer(_) => "bearer",
        }
    }

    fn accepts(&self, status: StatusCode) -> bool {
        match self {
            Self::Open => status.as_u16() <= OPEN_STATUS_MAX,
            Self::Bearer(_) => status.as_u16() < GATED_STATUS_LIMIT,
        }
    }
}

/// Everything the classifier needs from a finished round trip.
pub(crate) struct Received<'a> {
    pub(crate) method: &'a Method,
    /// Sanitized request URL.
    pub(crate) url: &'a Url,
    pub(crate) status: u16,
    pub(crate) body: Option<&'a [u8]>,
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
pub(crate) fn classify<T: DeserializeOwned>(
    gate: &Gate,
    received: Received<'_>,
    max_logged_body_bytes: usize,
) -> Result<T, Error> {
    let Received {
        method,
        url,
        status,
        body,
    } = received;

    let status = StatusCode::from_u16(status).map_err(|_| Error::MalformedResponse { status })?;

    if !gate.accepts(status) {
        return Err(match gate {
            Gate::Open => Error::Http(HttpError::new(status, method.clone(), url.clone())),
            Gate::Bearer(_) => server_error(status, method, url),
        });
    }

    let Some(body) = body else {
        return Err(match gate {
            Gate::Open => Error::EmptyBody {
                status,
                method: method.clone(),
                path: url.path().into(),
            },
            Gate::Bearer(_) => server_error(status, method, url),
        });
    };

    serde_json::from_slice(body).map_err(|source| {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            http.status = status.as_u16(),
            error = %source,
            body = %body_for_log(Some(body), max_logged_body_bytes, gate.secret()),
            "failed to decode response body"
        );

        Error::Decoding {
            status,
            method: method.clone(),
            path: url.path().into(),
            source,
        }
    })
}

fn server_error(status: StatusCode, method: &Method, url: &Url) -> Error {
    Error::ServerError {
        status,
        method: method.clone(),
        path: url.path().into(),
    }
}
