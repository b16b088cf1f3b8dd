//! Per-request instrumentation hook.
//!
//! A [`RequestContext`] is created when a request enters the router and is
//! finalized exactly once:
//! - normally, by [`RequestContext::complete`] with the response status;
//! - otherwise by `Drop`, when the request future is dropped (client went away,
//!   timeout upstream) or a handler panic unwinds through the middleware.
//!
//! The route label is the matched route template (`MatchedPath`), never the raw
//! request path; requests that match no route share the `unmatched` label.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use crate::app_state::AppState;
use crate::obs::HttpMetrics;

/// Route label for requests that matched no route.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Status recorded when the request future is dropped before a response exists.
pub const STATUS_CLIENT_CLOSED: u16 = 499;

/// Status recorded when a handler panic unwinds through the hook.
pub const STATUS_PANICKED: u16 = 500;

pub struct RequestContext {
    metrics: HttpMetrics,
    method: String,
    route: String,
    start: Instant,
    completed: bool,
}

impl RequestContext {
    /// `Started`: capture the monotonic start time and resolved labels.
    pub fn start(metrics: HttpMetrics, method: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            metrics,
            method: method.into(),
            route: route.into(),
            start: Instant::now(),
            completed: false,
        }
    }

    /// `Completed` with the final response status.
    pub fn complete(mut self, status: StatusCode) {
        self.finish(status.as_u16());
    }

    fn finish(&mut self, status: u16) {
        if self.completed {
            return;
        }
        self.completed = true;

        let elapsed = self.start.elapsed();
        self.metrics.record(&self.method, &self.route, status, elapsed);
        tracing::info!(
            method = %self.method,
            route = %self.route,
            status,
            elapsed_s = elapsed.as_secs_f64(),
            "request completed"
        );
    }
}

impl Drop for RequestContext {
    fn drop(&mut self) {
        if !self.completed {
            let status = if std::thread::panicking() {
                STATUS_PANICKED
            } else {
                STATUS_CLIENT_CLOSED
            };
            self.finish(status);
        }
    }
}

/// Route label for a request: matched template, or [`UNMATCHED_ROUTE`].
pub fn route_label(req: &Request) -> String {
    req.extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string())
}

/// axum middleware: wraps every routed request (and the fallback).
pub async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let ctx = RequestContext::start(
        state.http_metrics().clone(),
        req.method().as_str(),
        route_label(&req),
    );
    let response = next.run(req).await;
    ctx.complete(response.status());
    response
}
