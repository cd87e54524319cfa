//! The transport seam.
//!
//! The normalisation core only ever talks to a [`Fetcher`]: name an upstream
//! operation, hand over the query, get back the decoded JSON payload or an
//! opaque error. [`HttpFetcher`] is the production implementation.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::config::Credentials;

/// The upstream operations this client knows how to normalise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetRouteSummaryForStop,
    GetNextTripsForStop,
    GetNextTripsForStopAllRoutes,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::GetRouteSummaryForStop => "GetRouteSummaryForStop",
            Operation::GetNextTripsForStop => "GetNextTripsForStop",
            Operation::GetNextTripsForStopAllRoutes => "GetNextTripsForStopAllRoutes",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a single upstream request.
#[derive(Debug, Clone)]
pub struct Query<'a> {
    pub credentials: &'a Credentials,
    pub stop_number: i64,
    pub route_number: Option<i64>,
}

impl Query<'_> {
    /// Wire parameters in the order the provider documents them.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("apiKey", self.credentials.api_key().to_string()),
            ("appID", self.credentials.application_id().to_string()),
            ("format", "json".to_string()),
            ("stopNo", self.stop_number.to_string()),
        ];

        if let Some(route) = self.route_number {
            params.push(("routeNo", route.to_string()));
        }

        params
    }
}

/// Issues one upstream request and returns the decoded payload.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, operation: Operation, query: &Query<'_>) -> Result<Value>;
}

/// [`Fetcher`] over HTTP: `GET {base_url}/{operation}?apiKey=..&appID=..`.
pub struct HttpFetcher<C = BasicClient> {
    client: C,
    base_url: String,
}

impl<C: HttpClient> HttpFetcher<C> {
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Builds the request URL for `operation`, with the query appended.
    pub fn request_url(&self, operation: Operation, query: &Query<'_>) -> Result<reqwest::Url> {
        let base = self.base_url.trim_end_matches('/');
        let mut url: reqwest::Url = format!("{base}/{operation}")
            .parse()
            .with_context(|| format!("Invalid base URL '{}'", self.base_url))?;

        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query.params() {
                pairs.append_pair(name, &value);
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl<C: HttpClient> Fetcher for HttpFetcher<C> {
    async fn fetch(&self, operation: Operation, query: &Query<'_>) -> Result<Value> {
        let url = self.request_url(operation, query)?;

        let req = reqwest::Request::new(reqwest::Method::GET, url);
        let resp = self
            .client
            .execute(req)
            .await
            .with_context(|| format!("Failed to send {operation} request"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("{operation} returned status {status}: {body}"));
        }

        resp.json::<Value>()
            .await
            .with_context(|| format!("Failed to decode {operation} response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("key", "app").unwrap()
    }

    fn fetcher(base_url: &str) -> HttpFetcher {
        HttpFetcher::new(BasicClient::from_client(reqwest::Client::new()), base_url)
    }

    #[test]
    fn test_params_without_route() {
        let creds = credentials();
        let query = Query {
            credentials: &creds,
            stop_number: 3017,
            route_number: None,
        };
        let names: Vec<_> = query.params().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["apiKey", "appID", "format", "stopNo"]);
    }

    #[test]
    fn test_request_url_includes_route() {
        let creds = credentials();
        let fetcher = fetcher("http://example.com/v1.2/");
        let query = Query {
            credentials: &creds,
            stop_number: 3017,
            route_number: Some(95),
        };
        let url = fetcher
            .request_url(Operation::GetNextTripsForStop, &query)
            .unwrap();

        assert_eq!(url.path(), "/v1.2/GetNextTripsForStop");
        assert_eq!(
            url.query(),
            Some("apiKey=key&appID=app&format=json&stopNo=3017&routeNo=95")
        );
    }

    #[test]
    fn test_request_url_rejects_bad_base() {
        let creds = credentials();
        let fetcher = fetcher("not a url");
        let query = Query {
            credentials: &creds,
            stop_number: 1,
            route_number: None,
        };
        assert!(fetcher.request_url(Operation::GetRouteSummaryForStop, &query).is_err());
    }
}
