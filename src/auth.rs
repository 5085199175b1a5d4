use crate::Error;
use http::{
    HeaderMap, HeaderValue,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use std::fmt;

#[derive(Clone, Default, Eq, PartialEq)]
pub struct SecretString(String);

impl SecretString {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Access token attached to token-gated requests.
#[derive(Clone, Debug)]
pub struct BearerToken(SecretString);

impl BearerToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::new(token))
    }

    pub(crate) fn secret(&self) -> &str {
        self.0.expose()
    }

    pub(crate) fn apply(&self, headers: &mut HeaderMap) -> Result<(), Error> {
        let raw = format!("Bearer {}", self.0.expose());
        let mut value = HeaderValue::from_str(&raw).map_err(|err| Error::InvalidConfig {
            message: "stored access token is not a valid Authorization header value".into(),
            source: Some(Box::new(err)),
        })?;
        value.set_sensitive(true);

        headers.insert(AUTHORIZATION, value);
        Ok(())
    }
}

pub(crate) fn apply_json_content_type(headers: &mut HeaderMap) {
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
}
