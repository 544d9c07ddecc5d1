use anyhow::Result;
use async_trait::async_trait;

/// Remote side of the pipeline: hands back the raw text payloads.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Newline-delimited odds payload (the `odds` field of `GET {root}/state`).
    async fn fetch_odds(&self) -> Result<String>;

    /// `;`-separated `key:value` table (the `mappings` field of `GET {root}/mappings`).
    async fn fetch_mappings(&self) -> Result<String>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
