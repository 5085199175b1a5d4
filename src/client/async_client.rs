//! High-level asynchronous JSON client.

use super::classify::{Gate, Received, classify};
use crate::{
    Error, ResponseHookContext,
    auth::{BearerToken, apply_json_content_type},
    credentials::{CredentialName, CredentialStore, DynCredentialStore, MemoryCredentialStore},
    response_hook::ResponseHook,
    transport::{
        AsyncTransport, DynAsyncTransport, ReqwestAsync, TransportRequest, TransportResponse,
    },
    util::url::{parse_endpoint, sanitize_url_for_error},
};
use http::{HeaderMap, Method};
use serde::{Serialize, de::DeserializeOwned};
use std::{sync::Arc, time::Duration};
use url::Url;

#[cfg(feature = "tracing")]
use crate::util::redact::body_for_log;
#[cfg(feature = "tracing")]
use tracing::{Instrument, field};

const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const DEFAULT_MAX_LOGGED_BODY_BYTES: usize = 4096;

/// Configures and constructs [`Client`].
pub struct ClientBuilder {
    insecure: bool,
    user_agent: String,
    timeout: Duration,
    connect_timeout: Duration,
    no_proxy: bool,
    transport: Option<DynAsyncTransport>,
    credentials: Option<DynCredentialStore>,
    response_hook: Option<ResponseHook>,
    max_logged_body_bytes: usize,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            insecure: false,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            no_proxy: false,
            transport: None,
            credentials: None,
            response_hook: None,
            max_logged_body_bytes: DEFAULT_MAX_LOGGED_BODY_BYTES,
        }
    }
}

impl ClientBuilder {
    /// Ignore system proxy environment variables.
    pub fn no_system_proxy(mut self) -> Self {
        self.no_proxy = true;
        self
    }

    /// Accept invalid TLS certificates (**dangerous**).
    pub fn danger_accept_invalid_certs(mut self, yes: bool) -> Self {
        self.insecure = yes;
        self
    }

    /// Override the default `User-Agent` header.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    /// Adjust the transport's per-request timeout.
    pub fn timeout(mut self, value: Duration) -> Self {
        self.timeout = value;
        self
    }

    /// Adjust the connection establishment timeout.
    pub fn connect_timeout(mut self, value: Duration) -> Self {
        self.connect_timeout = value;
        self
    }

    /// Replace the default `reqwest` transport.
    ///
    /// The transport settings above only apply to the default transport.
    pub fn transport<T: AsyncTransport>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Store consulted by token-gated operations.
    ///
    /// Defaults to an empty [`MemoryCredentialStore`].
    pub fn credential_store<S: CredentialStore + 'static>(mut self, store: S) -> Self {
        self.credentials = Some(Arc::new(store));
        self
    }

    /// Observe every response (status, headers, raw body) before it is
    /// classified.
    pub fn response_hook<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(ResponseHookContext<'a>) + Send + Sync + 'static,
    {
        self.response_hook = Some(Arc::new(hook));
        self
    }

    /// Max bytes of a response body written to diagnostic logs.
    pub fn max_logged_body_bytes(mut self, max_bytes: usize) -> Self {
        self.max_logged_body_bytes = max_bytes;
        self
    }

    /// Finalise configuration and build the client.
    pub fn build(self) -> Result<Client, Error> {
        let transport: DynAsyncTransport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestAsync::try_new(
                self.insecure,
                &self.user_agent,
                self.timeout,
                self.connect_timeout,
                self.no_proxy,
            )?),
        };

        let credentials = self
            .credentials
            .unwrap_or_else(|| Arc::new(MemoryCredentialStore::new()));

        Ok(Client {
            inner: Arc::new(Inner {
                transport,
                credentials,
                response_hook: self.response_hook,
                max_logged_body_bytes: self.max_logged_body_bytes,
            }),
        })
    }
}

/// Typed JSON client. Cheap to clone; clones share transport and store.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

struct Inner {
    transport: DynAsyncTransport,
    credentials: DynCredentialStore,
    response_hook: Option<ResponseHook>,
    max_logged_body_bytes: usize,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn new() -> Result<Self, Error> {
        Self::builder().build()
    }

    /// The store token-gated operations read `access_token` from.
    #[must_use]
    pub fn credentials(&self) -> &DynCredentialStore {
        &self.inner.credentials
    }

    /// `GET url`, decoding the body into `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T, Error> {
        let url = parse_endpoint(url)?;
        self.execute(Gate::Open, Method::GET, url, None).await
    }

    /// `POST url` with `body` as JSON, decoding the response into `T`.
    pub async fn post<T, B>(&self, url: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = parse_endpoint(url)?;
        let body = encode_body(body)?;
        self.execute(Gate::Open, Method::POST, url, Some(body)).await
    }

    /// `DELETE url`, decoding the body into `T`.
    pub async fn delete<T: DeserializeOwned>(&self, url: &str) -> Result<T, Error> {
        let url = parse_endpoint(url)?;
        self.execute(Gate::Open, Method::DELETE, url, None).await
    }

    /// Like [`Client::fetch`], authorized with the stored access token.
    pub async fn fetch_with_token<T: DeserializeOwned>(&self, url: &str) -> Result<T, Error> {
        let token = self.bearer()?;
        let url = parse_endpoint(url)?;
        self.execute(Gate::Bearer(token), Method::GET, url, None)
            .await
    }

    /// Like [`Client::post`], authorized with the stored access token.
    pub async fn post_with_token<T, B>(&self, url: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let token = self.bearer()?;
        let url = parse_endpoint(url)?;
        let body = encode_body(body)?;
        self.execute(Gate::Bearer(token), Method::POST, url, Some(body))
            .await
    }

    /// Like [`Client::delete`], authorized with the stored access token.
    pub async fn delete_with_token<T: DeserializeOwned>(&self, url: &str) -> Result<T, Error> {
        let token = self.bearer()?;
        let url = parse_endpoint(url)?;
        self.execute(Gate::Bearer(token), Method::DELETE, url, None)
            .await
    }

    /// `PATCH url` with `body` as JSON, authorized with the stored access
    /// token.
    pub async fn patch_with_token<T, B>(&self, url: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let token = self.bearer()?;
        let url = parse_endpoint(url)?;
        let body = encode_body(body)?;
        self.execute(Gate::Bearer(token), Method::PATCH, url, Some(body))
            .await
    }

    /// Stored access token; empty values count as absent.
    fn bearer(&self) -> Result<BearerToken, Error> {
        match self.inner.credentials.get(CredentialName::AccessToken) {
            Some(token) if !token.trim().is_empty() => Ok(BearerToken::new(token)),
            _ => {
                #[cfg(feature = "tracing")]
                tracing::debug!("token-gated request rejected: no access token stored");
                Err(Error::MissingToken)
            }
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        gate: Gate,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<T, Error> {
        #[cfg(feature = "metrics")]
        let _inflight = crate::transport::metrics::InFlightGuard::new();

        let mut headers = HeaderMap::new();
        if body.is_some() {
            apply_json_content_type(&mut headers);
        }
        if let Gate::Bearer(token) = &gate {
            token.apply(&mut headers)?;
        }

        #[cfg(any(feature = "tracing", feature = "metrics"))]
        let start = std::time::Instant::now();
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!(
            "network_kit.request",
            http.method = %method,
            http.host = %url.host_str().unwrap_or_default(),
            http.path = %url.path(),
            auth = gate.label(),
            http.status = field::Empty,
            latency_ms = field::Empty,
            error_kind = field::Empty,
        );

        let send = self.inner.transport.send(TransportRequest {
            method: method.clone(),
            url: url.clone(),
            headers,
            body,
        });
        #[cfg(feature = "tracing")]
        let send = send.instrument(span.clone());
        let sent = send.await;

        let status = sent.as_ref().ok().map(|resp| resp.status);
        let result = {
            #[cfg(feature = "tracing")]
            let _enter = span.enter();
            sent.and_then(|resp| {
                let safe_url = sanitize_url_for_error(&url);
                self.observe(&method, &safe_url, &resp, gate.secret());
                classify(
                    &gate,
                    Received {
                        method: &method,
                        url: &safe_url,
                        status: resp.status,
                        body: resp.body.as_deref(),
                    },
                    self.inner.max_logged_body_bytes,
                )
            })
        };

        #[cfg(feature = "tracing")]
        {
            span.record("latency_ms", start.elapsed().as_millis() as i64);
            if let Some(status) = status {
                span.record("http.status", i64::from(status));
            }
            if let Err(err) = &result {
                span.record("error_kind", field::debug(err.kind()));
            }
        }
        #[cfg(feature = "metrics")]
        crate::transport::metrics::record_outcome(
            &method,
            status,
            start.elapsed(),
            result.as_ref().err().map(Error::kind),
        );
        #[cfg(not(any(feature = "tracing", feature = "metrics")))]
        let _ = status;

        result
    }

    /// Diagnostic side channel; never influences the outcome.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn observe(&self, method: &Method, url: &Url, resp: &TransportResponse, secret: Option<&str>) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            http.status = resp.status,
            body = %body_for_log(resp.body.as_deref(), self.inner.max_logged_body_bytes, secret),
            "response received"
        );

        if let Some(hook) = &self.inner.response_hook {
            hook(ResponseHookContext {
                method,
                url,
                status: resp.status,
                headers: &resp.headers,
                body: resp.body.as_deref(),
            });
        }
    }
}

fn encode_body<B: Serialize + ?Sized>(body: &B) -> Result<Vec<u8>, Error> {
    serde_json::to_vec(body).map_err(|source| Error::Encoding { source })
}
