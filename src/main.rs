use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use odds_state_sync::config::Config;
use odds_state_sync::feed::FeedClient;
use odds_state_sync::scheduler::{CycleScheduler, EventPipeline};
use odds_state_sync::state::StateStore;
use odds_state_sync::status::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let feed = FeedClient::new(&config.feed_root, config.http_timeout())?;
    info!("Polling feed at {}", feed.root());

    let store = StateStore::new();
    let scheduler = CycleScheduler::new(EventPipeline::new(Arc::new(feed), store.clone()));
    scheduler
        .start(config.tick_interval(), config.window_duration())
        .await;

    let app = status::router(AppState {
        store,
        scheduler: scheduler.subscribe(),
    });
    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Server is running on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    scheduler.stop().await;
    Ok(())
}
