//! Fetch a user anonymously, then again with a stored access token.
//!
//! ```text
//! API_BASE=https://api.example.com API_TOKEN=secret cargo run --example fetch_user
//! ```

use network_kit::{Client, CredentialStore, MemoryCredentialStore};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct User {
    id: u64,
    name: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let base = std::env::var("API_BASE").unwrap_or_else(|_| "http://127.0.0.1:8080".into());

    let store = MemoryCredentialStore::new();
    if let Ok(token) = std::env::var("API_TOKEN") {
        store.save_access_token(&token)?;
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(10))
        .credential_store(store)
        .response_hook(|ctx| {
            eprintln!("<- {} {} {}", ctx.status, ctx.method, ctx.url);
        })
        .build()?;

    let user: User = client.fetch(&format!("{base}/users/1")).await?;
    println!("anonymous: #{} {}", user.id, user.name);

    match client.fetch_with_token::<User>(&format!("{base}/me")).await {
        Ok(me) => println!("me: #{} {}", me.id, me.name),
        Err(err) if err.is_auth_error() => println!("token missing or rejected, skipping /me"),
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
