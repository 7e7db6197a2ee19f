use async_trait::async_trait;
use reqwest::{Request, Response};

/// Minimal seam over an HTTP transport so auth decorators can be layered on
/// and tests can substitute a canned transport.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
