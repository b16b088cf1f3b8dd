//! Axum router wiring.
//!
//! Every route, the fallback included, runs inside the instrumentation
//! middleware, so `/metrics` scrapes are counted like any other request.

use axum::{middleware, routing::get, Router};

use crate::{app_state::AppState, demo, obs, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(demo::root))
        .route("/health", get(ops::health))
        .route("/slow", get(demo::slow))
        .route("/error", get(demo::error))
        .route("/metrics", get(ops::metrics))
        .fallback(demo::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            obs::track_requests,
        ))
        .with_state(state)
}
