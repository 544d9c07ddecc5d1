//! In-memory event state shared between the scheduler and the status endpoint.
//!
//! The scheduler is the only writer. A `merge` applies its whole batch under
//! one write lock, so readers see either the previous tick or the new one.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::events::models::{CanonicalEvent, EventStatus};

/// Event id → canonical event.
pub type EventMap = HashMap<String, CanonicalEvent>;

#[derive(Clone, Default)]
pub struct StateStore {
    inner: Arc<RwLock<EventMap>>,
}

/// What a `merge` call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub inserted: usize,
    pub updated: usize,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert new events; for known ids only `status` and `scores` are replaced.
    pub async fn merge(&self, events: &[CanonicalEvent]) -> MergeSummary {
        let mut state = self.inner.write().await;
        let mut summary = MergeSummary::default();

        for event in events {
            match state.get_mut(&event.id) {
                Some(existing) => {
                    existing.status = event.status;
                    existing.scores = event.scores.clone();
                    summary.updated += 1;
                }
                None => {
                    state.insert(event.id.clone(), event.clone());
                    summary.inserted += 1;
                }
            }
        }

        debug!(
            "StateStore: {} inserted, {} updated, {} total",
            summary.inserted,
            summary.updated,
            state.len()
        );
        summary
    }

    /// Everything except `REMOVED` events.
    pub async fn served_view(&self) -> EventMap {
        self.inner
            .read()
            .await
            .iter()
            .filter(|(_, e)| e.status != EventStatus::Removed)
            .map(|(id, e)| (id.clone(), e.clone()))
            .collect()
    }

    /// Every stored event, `REMOVED` included.
    pub async fn all_entries(&self) -> EventMap {
        self.inner.read().await.clone()
    }

    /// `(total, served)` counts taken under one read lock.
    pub async fn counts(&self) -> (usize, usize) {
        let state = self.inner.read().await;
        let served = state
            .values()
            .filter(|e| e.status != EventStatus::Removed)
            .count();
        (state.len(), served)
    }

    pub async fn reset(&self) {
        self.inner.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}
