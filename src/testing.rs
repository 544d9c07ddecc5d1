//! In-memory `FeedSource` used by the unit tests.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::feed::FeedSource;

pub struct StaticFeed {
    odds: Mutex<Result<String, String>>,
    mappings: String,
    hang_odds: AtomicBool,
    odds_delay: Mutex<Duration>,
    odds_calls: AtomicUsize,
    mapping_calls: AtomicUsize,
}

impl StaticFeed {
    pub fn new(odds: &str, mappings: &str) -> Self {
        StaticFeed {
            odds: Mutex::new(Ok(odds.to_string())),
            mappings: mappings.to_string(),
            hang_odds: AtomicBool::new(false),
            odds_delay: Mutex::new(Duration::ZERO),
            odds_calls: AtomicUsize::new(0),
            mapping_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_odds(&self, odds: &str) {
        *self.odds.lock().unwrap() = Ok(odds.to_string());
    }

    pub fn fail_odds(&self, message: &str) {
        *self.odds.lock().unwrap() = Err(message.to_string());
    }

    /// Make every odds fetch pend forever.
    pub fn hang_odds(&self) {
        self.hang_odds.store(true, Ordering::SeqCst);
    }

    /// Make every odds fetch take `delay` before answering.
    pub fn delay_odds(&self, delay: Duration) {
        *self.odds_delay.lock().unwrap() = delay;
    }

    pub fn odds_calls(&self) -> usize {
        self.odds_calls.load(Ordering::SeqCst)
    }

    pub fn mapping_calls(&self) -> usize {
        self.mapping_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedSource for StaticFeed {
    async fn fetch_odds(&self) -> Result<String> {
        self.odds_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_odds.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let delay = *self.odds_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let odds = self.odds.lock().unwrap().clone();
        odds.map_err(anyhow::Error::msg)
    }

    async fn fetch_mappings(&self) -> Result<String> {
        self.mapping_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.mappings.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}
