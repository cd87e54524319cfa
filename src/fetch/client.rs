use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a prepared request. The seam that lets [`super::HttpFetcher`]
/// run over a plain `reqwest::Client` or any wrapper around one.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
