//! Client implementation.

pub mod async_client;
pub(crate) mod classify;

pub use async_client::{Client, ClientBuilder};
