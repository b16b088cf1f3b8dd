//! Request metric families: `http_requests_total` and `http_request_duration_seconds`.

use std::time::Duration;

use scrapekit_core::error::{ErrorCode, Result, ScrapeError};
use scrapekit_core::{Counter, Histogram, MetricDescriptor, MetricRegistry};

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

#[derive(Clone)]
pub struct HttpMetrics {
    requests: Counter,
    duration: Histogram,
}

impl HttpMetrics {
    /// Register both families. Fails if either name is already taken.
    pub fn register(registry: &MetricRegistry, duration_buckets: &[f64]) -> Result<Self> {
        let requests = registry.register_counter(MetricDescriptor::counter(
            HTTP_REQUESTS_TOTAL,
            "total http requests",
            &["method", "route", "status"],
        ))?;
        let duration = registry.register_histogram(
            MetricDescriptor::histogram(
                HTTP_REQUEST_DURATION_SECONDS,
                "request duration in seconds",
                &["method", "route"],
            )
            .with_buckets(duration_buckets),
        )?;
        Ok(Self { requests, duration })
    }

    pub fn requests(&self) -> &Counter {
        &self.requests
    }

    pub fn duration(&self) -> &Histogram {
        &self.duration
    }

    /// Record one completed request. Update failures are logged, never returned.
    /// Debug builds also trip on a label set that does not match the families.
    pub fn record(&self, method: &str, route: &str, status: u16, elapsed: Duration) {
        let status = status.to_string();

        if let Err(e) = self.requests.inc(&[
            ("method", method),
            ("route", route),
            ("status", status.as_str()),
        ]) {
            tracing::error!(code = e.code().as_str(), error = %e, "request counter update failed");
            label_mismatch(&e);
        }

        if let Err(e) = self
            .duration
            .observe_duration(&[("method", method), ("route", route)], elapsed)
        {
            tracing::error!(code = e.code().as_str(), error = %e, "request duration update failed");
            label_mismatch(&e);
        }
    }
}

fn label_mismatch(e: &ScrapeError) {
    debug_assert!(
        e.code() != ErrorCode::InvalidLabelSet || std::thread::panicking(),
        "{e}"
    );
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invalid label set")]
    fn label_mismatch_trips_debug_builds() {
        label_mismatch(&ScrapeError::InvalidLabelSet {
            metric: HTTP_REQUESTS_TOTAL.to_string(),
            expected: vec!["method".into(), "route".into(), "status".into()],
            got: vec!["method".into()],
        });
    }

    #[test]
    fn other_update_errors_are_only_logged() {
        label_mismatch(&ScrapeError::NegativeDelta {
            metric: HTTP_REQUESTS_TOTAL.to_string(),
            delta: -1,
        });
        label_mismatch(&ScrapeError::InvalidObservation {
            metric: HTTP_REQUEST_DURATION_SECONDS.to_string(),
            value: f64::NAN,
        });
    }

    #[test]
    fn record_with_declared_labels_succeeds() {
        let registry = MetricRegistry::new();
        let m = HttpMetrics::register(&registry, &[1.0]).unwrap();
        m.record("GET", "/", 200, Duration::from_millis(5));
        let labels = [("method", "GET"), ("route", "/"), ("status", "200")];
        assert_eq!(m.requests().value(&labels).unwrap(), 1);
    }
}
