use http::{Method, StatusCode};
use std::{error::Error as StdError, fmt};
use thiserror::Error;
use url::Url;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    InvalidUrl,
    Encoding,
    Transport,
    MalformedResponse,
    Http,
    EmptyBody,
    Decoding,
    MissingToken,
    ServerError,
    InvalidConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Other,
}

/// Rejected status on an unauthenticated call.
#[derive(Debug, Clone)]
pub struct HttpError {
    pub status: StatusCode,
    pub method: Method,
    /// Sanitized URL: no query/fragment/userinfo.
    pub url: Box<Url>,
    /// Always embeds the numeric status code.
    pub message: Box<str>,
}

impl HttpError {
    pub(crate) fn new(status: StatusCode, method: Method, url: Url) -> Self {
        Self {
            status,
            method,
            url: Box::new(url),
            message: format!("Request failed with status code {}", status.as_u16())
                .into_boxed_str(),
        }
    }

    #[must_use]
    pub fn code(&self) -> u16 {
        self.status.as_u16()
    }

    #[must_use]
    pub fn path(&self) -> &str {
        self.url.path()
    }
}

/// All errors returned by the client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Invalid URL: {url:?}")]
    InvalidUrl {
        url: Box<str>,
        #[source]
        source: Option<url::ParseError>,
    },

    #[error("Failed to encode request body: {source}")]
    Encoding {
        #[source]
        source: serde_json::Error,
    },

    #[error("Transport error during {method} {path}: {source}")]
    Transport {
        method: Method,
        path: Box<str>,
        kind: TransportErrorKind,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Invalid response format (status {status})")]
    MalformedResponse { status: u16 },

    #[error("{0}")]
    Http(HttpError),

    #[error("No data received (HTTP {status}) during {method} {path}")]
    EmptyBody {
        status: StatusCode,
        method: Method,
        path: Box<str>,
    },

    #[error("Decode error (HTTP {status}) during {method} {path}: {source}")]
    Decoding {
        status: StatusCode,
        method: Method,
        path: Box<str>,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unauthorized: no access token stored")]
    MissingToken,

    #[error("Server error (HTTP {status}) during {method} {path}")]
    ServerError {
        status: StatusCode,
        method: Method,
        path: Box<str>,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        message: Box<str>,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            Self::Encoding { .. } => ErrorKind::Encoding,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            Self::Http(_) => ErrorKind::Http,
            Self::EmptyBody { .. } => ErrorKind::EmptyBody,
            Self::Decoding { .. } => ErrorKind::Decoding,
            Self::MissingToken => ErrorKind::MissingToken,
            Self::ServerError { .. } => ErrorKind::ServerError,
            Self::InvalidConfig { .. } => ErrorKind::InvalidConfig,
        }
    }

    /// HTTP status associated with the failure, if any.
    ///
    /// `MissingToken` never reaches the network but reports `401` so callers
    /// can treat it like any other authorization failure.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http(e) => Some(e.status),
            Self::EmptyBody { status, .. }
            | Self::Decoding { status, .. }
            | Self::ServerError { status, .. } => Some(*status),
            Self::MissingToken => Some(StatusCode::UNAUTHORIZED),
            Self::InvalidUrl { .. }
            | Self::Encoding { .. }
            | Self::Transport { .. }
            | Self::MalformedResponse { .. }
            | Self::InvalidConfig { .. } => None,
        }
    }

    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        match self {
            Self::MissingToken => true,
            Self::Http(HttpError { status, .. }) | Self::ServerError { status, .. } => {
                matches!(*status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
            }
            _ => false,
        }
    }

    /// True when the request never left the process.
    #[must_use]
    pub fn is_pre_dispatch(&self) -> bool {
        matches!(
            self,
            Self::InvalidUrl { .. }
                | Self::Encoding { .. }
                | Self::MissingToken
                | Self::InvalidConfig { .. }
        )
    }

    pub(crate) fn invalid_url(url: &str, source: Option<url::ParseError>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            source,
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HTTP {} ({} {}): {}",
            self.status,
            self.method,
            self.path(),
            self.message
        )
    }
}
