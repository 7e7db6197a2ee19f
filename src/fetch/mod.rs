mod basic;
mod client;
pub mod auth;

pub use auth::api_key::ApiKey;
pub use basic::BasicClient;
pub use client::HttpClient;

use std::time::Duration;

use anyhow::Result;
use serde_json::Value;

/// Builds a GET request carrying the standard per-request timeout.
pub fn get(url: &str) -> Result<reqwest::Request> {
    let mut req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);
    *req.timeout_mut() = Some(Duration::from_secs(30));
    Ok(req)
}

/// Executes a request and decodes the body as JSON. Any non-success status
/// becomes an error carrying the status and response body.
pub async fn fetch_json<C: HttpClient>(client: &C, req: reqwest::Request) -> Result<Value> {
    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("request failed with status {status}: {body}");
    }
    Ok(resp.json().await?)
}
