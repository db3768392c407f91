//! Graph statistics and health routes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tracing::error;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/health", get(get_health))
}

/// GET /api/stats: node, relationship and community counts.
async fn get_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.snapshot_stats() {
        Ok(snapshot) => (StatusCode::OK, Json(serde_json::json!(snapshot))),
        Err(e) => {
            error!("Failed to read graph stats: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "failed to read graph stats" })),
            )
        }
    }
}

/// GET /api/health
async fn get_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let drugs = state
        .store
        .count_nodes(Some(vetgraph_store::NodeLabel::Drug))
        .ok();
    Json(serde_json::json!({
        "status": if drugs.is_some() { "healthy" } else { "degraded" },
        "service": "vetgraph",
        "drugs": drugs.unwrap_or(0),
        "knownDrugNames": state.classifier.read().known_drug_count(),
    }))
}
