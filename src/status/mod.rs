use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::scheduler::SchedulerState;
use crate::state::StateStore;

#[derive(Clone)]
pub struct AppState {
    pub store: StateStore,
    pub scheduler: watch::Receiver<SchedulerState>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct Health {
    scheduler: &'static str,
    events_total: usize,
    events_served: usize,
}

/// Build the Axum router for the status endpoint.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/state", get(state_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// GET /state — served view, id → event
async fn state_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let served = state.store.served_view().await;
    serde_json::to_value(&served).map(Json).map_err(|e| {
        error!("Error fetching state: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: "Failed to fetch state",
                message: e.to_string(),
            }),
        )
    })
}

/// GET /health
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let scheduler = if state.scheduler.borrow().is_running() {
        "running"
    } else {
        "idle"
    };
    let (events_total, events_served) = state.store.counts().await;
    Json(Health {
        scheduler,
        events_total,
        events_served,
    })
}
