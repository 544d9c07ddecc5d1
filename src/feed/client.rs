use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::source::FeedSource;

/// Envelope-level failure: the endpoint answered but not with the text field
/// we need.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Invalid or missing {0} data in response")]
    InvalidPayload(&'static str),

    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// HTTP client for the simulation feed (`{root}/state` and `{root}/mappings`).
#[derive(Clone)]
pub struct FeedClient {
    http: Client,
    root: String,
}

impl FeedClient {
    pub fn new(root: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(FeedClient {
            http,
            root: root.trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// GET `{root}/{endpoint}` and pull the text field `field` out of the JSON body.
    async fn fetch_text_field(&self, endpoint: &str, field: &'static str) -> Result<String> {
        let url = format!("{}/{}", self.root, endpoint);
        self.get_text_field(&url, field)
            .await
            .with_context(|| format!("Failed to fetch {} data from {}", field, url))
    }

    async fn get_text_field(&self, url: &str, field: &'static str) -> Result<String> {
        debug!("Fetching {} from {}", field, url);

        let resp = self.http.get(url).send().await.context("request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(FeedError::Status { status, body }.into());
        }

        let raw: serde_json::Value = resp.json().await.context("response is not JSON")?;
        extract_text_field(&raw, field)
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch_odds(&self) -> Result<String> {
        self.fetch_text_field("state", "odds").await
    }

    async fn fetch_mappings(&self) -> Result<String> {
        self.fetch_text_field("mappings", "mappings").await
    }

    fn name(&self) -> &str {
        &self.root
    }
}

fn extract_text_field(raw: &serde_json::Value, field: &'static str) -> Result<String> {
    raw.get(field)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| FeedError::InvalidPayload(field).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::json;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api", addr)
    }

    fn client(root: &str) -> FeedClient {
        FeedClient::new(root, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_extract_text_field() {
        let raw = json!({ "odds": "1,2,3" });
        assert_eq!(extract_text_field(&raw, "odds").unwrap(), "1,2,3");

        let err = extract_text_field(&json!({}), "odds").unwrap_err();
        assert_eq!(err.to_string(), "Invalid or missing odds data in response");

        let err = extract_text_field(&json!({ "mappings": 7 }), "mappings").unwrap_err();
        assert_eq!(err.to_string(), "Invalid or missing mappings data in response");
    }

    #[tokio::test]
    async fn test_fetches_both_endpoints() {
        let app = Router::new()
            .route("/api/state", get(|| async { Json(json!({ "odds": "1,2,3,4,5,6,7" })) }))
            .route(
                "/api/mappings",
                get(|| async { Json(json!({ "mappings": "1:FOOTBALL" })) }),
            );
        let root = serve(app).await;
        let feed = client(&format!("{}/", root));

        assert_eq!(feed.root(), root);
        assert_eq!(feed.fetch_odds().await.unwrap(), "1,2,3,4,5,6,7");
        assert_eq!(feed.fetch_mappings().await.unwrap(), "1:FOOTBALL");
    }

    #[tokio::test]
    async fn test_missing_field_is_hard_error() {
        let app = Router::new().route("/api/state", get(|| async { Json(json!({})) }));
        let root = serve(app).await;

        let err = client(&root).fetch_odds().await.unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains(&format!("Failed to fetch odds data from {}/state", root)));
        assert!(msg.contains("Invalid or missing odds data in response"));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let app = Router::new().route(
            "/api/mappings",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let root = serve(app).await;

        let err = client(&root).fetch_mappings().await.unwrap_err();
        assert!(format!("{:#}", err).contains("503"));
    }
}
