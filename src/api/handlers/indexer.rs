// Copyright (c) DVB Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::error;

use crate::api::AppState;
use crate::config::Config;

fn is_authorized(headers: &HeaderMap) -> bool {
    let Some(secret) = Config::get().indexer.secret.as_deref() else {
        return false;
    };

    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(|value| value == format!("Bearer {}", secret))
        .unwrap_or(false)
}

/// Run one sync pass against the chain event source.
///
/// Protected by the shared indexer secret; intended to be hit by an external
/// scheduler, which is also responsible for not overlapping invocations.
pub async fn trigger_sync(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !is_authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized" })),
        );
    }

    match state.worker.run_sync_pass().await {
        Ok(summary) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "processed": summary.processed,
                "total": summary.total,
                "hasMore": summary.has_more,
            })),
        ),
        Err(e) => {
            error!("Indexer error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error",
                    "details": e.to_string(),
                })),
            )
        }
    }
}

/// Report whether the indexer has a persisted resume position.
pub async fn indexer_status(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.load_checkpoint().await {
        Ok(Some(checkpoint)) => Json(json!({
            "status": "running",
            "last_checkpoint": checkpoint.last_checkpoint,
        })),
        _ => Json(json!({ "status": "not initialized" })),
    }
}
