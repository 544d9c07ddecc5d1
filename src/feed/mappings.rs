//! Code → label table and its per-window cache.
//!
//! The table is fetched at most once per simulation window. `clear()` is
//! called at the window boundary and forces the next `fetch()` back to the
//! network.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::source::FeedSource;

/// Immutable code → label table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap {
    labels: HashMap<String, String>,
}

impl LabelMap {
    /// Parse a `key:value;key:value` payload. Malformed entries and repeated
    /// keys are skipped; the first occurrence of a key wins.
    pub fn parse(payload: &str) -> Self {
        let mut labels = HashMap::new();

        for entry in payload.split(';') {
            let Some((key, value)) = entry.split_once(':') else {
                if !entry.trim().is_empty() {
                    warn!("Skipping invalid mapping: {}", entry);
                }
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                warn!("Skipping invalid mapping: {}", entry);
                continue;
            }
            if labels.contains_key(key) {
                warn!("Duplicate key encountered: {}", key);
                continue;
            }
            labels.insert(key.to_string(), value.to_string());
        }

        LabelMap { labels }
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.labels.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        LabelMap {
            labels: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Shared, per-window cache in front of the mappings endpoint.
#[derive(Clone)]
pub struct MappingCache {
    source: Arc<dyn FeedSource>,
    cached: Arc<RwLock<Option<Arc<LabelMap>>>>,
}

impl MappingCache {
    pub fn new(source: Arc<dyn FeedSource>) -> Self {
        MappingCache {
            source,
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Return the cached table, fetching it on first use in the window.
    /// A failed fetch leaves the cache empty.
    pub async fn fetch(&self) -> Result<Arc<LabelMap>> {
        if let Some(map) = self.cached.read().await.as_ref() {
            return Ok(Arc::clone(map));
        }

        let mut slot = self.cached.write().await;
        if let Some(map) = slot.as_ref() {
            return Ok(Arc::clone(map));
        }

        let payload = self
            .source
            .fetch_mappings()
            .await
            .with_context(|| format!("Failed to load mappings from {}", self.source.name()))?;
        let map = Arc::new(LabelMap::parse(&payload));
        debug!("Loaded {} label mappings", map.len());

        *slot = Some(Arc::clone(&map));
        Ok(map)
    }

    pub async fn clear(&self) {
        *self.cached.write().await = None;
        info!("Mappings cache cleared.");
    }

    pub async fn is_cached(&self) -> bool {
        self.cached.read().await.is_some()
    }
}
