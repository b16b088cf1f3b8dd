//! Request instrumentation.
//!
//! `http_metrics` owns the two request metric families; `instrument` is the
//! axum middleware that feeds them once per request.

pub mod http_metrics;
pub mod instrument;

pub use http_metrics::HttpMetrics;
pub use instrument::{track_requests, RequestContext};
