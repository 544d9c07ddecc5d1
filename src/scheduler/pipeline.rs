use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

use crate::events::transform;
use crate::feed::{decode_feed, FeedSource, MappingCache};
use crate::state::{MergeSummary, StateStore};

/// Result of one fetch → decode → transform → merge cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The feed decoded to zero records; nothing else was fetched.
    NoOdds,
    /// The label map was empty; nothing was merged.
    NoMappings,
    Merged {
        decoded: usize,
        transformed: usize,
        summary: MergeSummary,
    },
}

/// Everything one tick needs. Cheap to clone; all parts are shared handles.
#[derive(Clone)]
pub struct EventPipeline {
    source: Arc<dyn FeedSource>,
    mappings: MappingCache,
    store: StateStore,
}

impl EventPipeline {
    pub fn new(source: Arc<dyn FeedSource>, store: StateStore) -> Self {
        EventPipeline {
            mappings: MappingCache::new(Arc::clone(&source)),
            source,
            store,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn mappings(&self) -> &MappingCache {
        &self.mappings
    }

    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        self.process().await.context("Failed to fetch or process data")
    }

    async fn process(&self) -> Result<CycleOutcome> {
        let payload = self.source.fetch_odds().await?;
        let records = decode_feed(&payload);
        if records.is_empty() {
            debug!("No odds records in feed");
            return Ok(CycleOutcome::NoOdds);
        }

        let labels = self.mappings.fetch().await?;
        if labels.is_empty() {
            debug!("Label mapping table is empty");
            return Ok(CycleOutcome::NoMappings);
        }

        let events = transform(&records, &labels);
        let summary = self.store.merge(&events).await;
        info!(
            "Merged {} of {} records ({} new, {} updated)",
            events.len(),
            records.len(),
            summary.inserted,
            summary.updated
        );

        Ok(CycleOutcome::Merged {
            decoded: records.len(),
            transformed: events.len(),
            summary,
        })
    }

    /// Drop all window-scoped state: merged events and the label cache.
    pub async fn reset_window(&self) {
        self.store.reset().await;
        self.mappings.clear().await;
        info!("State and cache cleared for the next simulation.");
    }
}
