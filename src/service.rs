//! Capability traits over the client's operations.
//!
//! Application code can depend on `impl Fetchable` (or `TokenGated`, ...)
//! instead of the concrete [`Client`], which implements all of them.

use crate::{Client, Error};
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

#[async_trait]
pub trait Fetchable: Send + Sync {
    async fn fetch<T>(&self, url: &str) -> Result<T, Error>
    where
        T: DeserializeOwned + Send + 'static;
}

#[async_trait]
pub trait Postable: Send + Sync {
    async fn post<T, B>(&self, url: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned + Send + 'static,
        B: Serialize + Sync + ?Sized;
}

#[async_trait]
pub trait Deletable: Send + Sync {
    async fn delete<T>(&self, url: &str) -> Result<T, Error>
    where
        T: DeserializeOwned + Send + 'static;
}

/// Operations that require a stored access token.
#[async_trait]
pub trait TokenGated: Send + Sync {
    async fn fetch_with_token<T>(&self, url: &str) -> Result<T, Error>
    where
        T: DeserializeOwned + Send + 'static;

    async fn post_with_token<T, B>(&self, url: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned + Send + 'static,
        B: Serialize + Sync + ?Sized;

    async fn delete_with_token<T>(&self, url: &str) -> Result<T, Error>
    where
        T: DeserializeOwned + Send + 'static;

    async fn patch_with_token<T, B>(&self, url: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned + Send + 'static,
        B: Serialize + Sync + ?Sized;
}

#[async_trait]
impl Fetchable for Client {
    async fn fetch<T>(&self, url: &str) -> Result<T, Error>
    where
        T: DeserializeOwned + Send + 'static,
    {
        Client::fetch(self, url).await
    }
}

#[async_trait]
impl Postable for Client {
    async fn post<T, B>(&self, url: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned + Send + 'static,
        B: Serialize + Sync + ?Sized,
    {
        Client::post(self, url, body).await
    }
}

#[async_trait]
impl Deletable for Client {
    async fn delete<T>(&self, url: &str) -> Result<T, Error>
    where
        T: DeserializeOwned + Send + 'static,
    {
        Client::delete(self, url).await
    }
}

#[async_trait]
impl TokenGated for Client {
    async fn fetch_with_token<T>(&self, url: &str) -> Result<T, Error>
    where
        T: DeserializeOwned + Send + 'static,
    {
        Client::fetch_with_token(self, url).await
    }

    async fn post_with_token<T, B>(&self, url: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned + Send + 'static,
        B: Serialize + Sync + ?Sized,
    {
        Client::post_with_token(self, url, body).await
    }

    async fn delete_with_token<T>(&self, url: &str) -> Result<T, Error>
    where
        T: DeserializeOwned + Send + 'static,
    {
        Client::delete_with_token(self, url).await
    }

    async fn patch_with_token<T, B>(&self, url: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned + Send + 'static,
        B: Serialize + Sync + ?Sized,
    {
        Client::patch_with_token(self, url, body).await
    }
}
