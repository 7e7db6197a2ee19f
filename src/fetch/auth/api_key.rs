use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};

use crate::fetch::client::HttpClient;

/// An [`HttpClient`] wrapper that injects a bearer token into every request.
pub struct ApiKey<C> {
    inner: C,
    value: HeaderValue,
}

impl<C> ApiKey<C> {
    /// Wraps `inner` so every request carries `Authorization: Bearer <token>`.
    pub fn bearer(inner: C, token: &str) -> Result<Self> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
        value.set_sensitive(true);
        Ok(Self { inner, value })
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut().insert(AUTHORIZATION, self.value.clone());
        self.inner.execute(req).await
    }
}
