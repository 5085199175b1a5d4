use http::{HeaderMap, Method};
use std::sync::Arc;
use url::Url;

/// Response hook context passed to `ClientBuilder::response_hook`.
///
/// Delivered for every response the transport returns, before the status is
/// classified. The hook observes only; it cannot change the outcome.
pub struct ResponseHookContext<'a> {
    pub method: &'a Method,
    /// URL without query/fragment/userinfo.
    pub url: &'a Url,
    /// Raw status code as received.
    pub status: u16,
    pub headers: &'a HeaderMap,
    /// Raw body bytes, unredacted.
    pub body: Option<&'a [u8]>,
}

impl ResponseHookContext<'_> {
    /// Body decoded as UTF-8, lossily.
    #[must_use]
    pub fn body_text(&self) -> Option<String> {
        self.body
            .map(|body| String::from_utf8_lossy(body).into_owned())
    }
}

pub type ResponseHook = Arc<dyn for<'a> Fn(ResponseHookContext<'a>) + Send + Sync + 'static>;
