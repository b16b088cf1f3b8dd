//! Demonstration routes that give the request metrics something to count.

use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::app_state::AppState;

pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "hello from monitoring app" }))
}

/// Responds after `server.slow_delay_ms`.
pub async fn slow(State(state): State<AppState>) -> impl IntoResponse {
    let delay = Duration::from_millis(state.cfg().server.slow_delay_ms);
    tokio::time::sleep(delay).await;
    Json(json!({ "message": format!("this took {} seconds", delay.as_secs_f64()) }))
}

pub async fn error() -> impl IntoResponse {
    tracing::error!("something went wrong");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal server error" })),
    )
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}
