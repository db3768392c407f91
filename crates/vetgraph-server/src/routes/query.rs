//! Question answering route.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::state::AppState;
use vetgraph_query::APOLOGY;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/query", post(query))
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response: String,
}

fn reply(status: StatusCode, response: impl Into<String>) -> (StatusCode, Json<QueryResponse>) {
    (
        status,
        Json(QueryResponse {
            response: response.into(),
        }),
    )
}

/// POST /api/query: `{query}` → `{response}`.
async fn query(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<QueryRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = match body {
        Ok(body) => body,
        Err(e) => {
            warn!("Rejected query body: {}", e);
            return reply(StatusCode::BAD_REQUEST, APOLOGY);
        }
    };

    match state.answer(&req.query) {
        Ok(answer) => reply(StatusCode::OK, answer.response),
        Err(e) => {
            error!("Error processing query: {}", e);
            reply(StatusCode::INTERNAL_SERVER_ERROR, APOLOGY)
        }
    }
}
