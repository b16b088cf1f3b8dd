//! scrapekit core: in-memory metric model, registry, exposition, and process stats.
//!
//! This crate defines the metric types (counter, gauge, histogram), the
//! registry that owns them, and the renderer for the Prometheus text exposition
//! format. It carries no HTTP or async runtime dependencies so the same registry
//! can be driven from any server or from tests.
//!
//! # Failure model
//! Caller mistakes such as a mismatched label set come back as a
//! `ScrapeError`, so instrumenting a request path can never take that path
//! down. The lints below keep panics out of this crate.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod exposition;
pub mod metrics;
pub mod process;

/// Shared result type.
pub use error::{ErrorCode, Result, ScrapeError};
pub use exposition::{render, CONTENT_TYPE};
pub use metrics::{
    Counter, Gauge, Histogram, HistogramSnapshot, LabelValues, MetricDescriptor, MetricKind,
    MetricRegistry, MetricSnapshot, RegisteredMetric, SeriesValues, DEFAULT_BUCKETS,
};
pub use process::{ProcessSample, ProcessStatsCollector};
