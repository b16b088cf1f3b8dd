//! Metric registry.
//!
//! Registration is a startup step; the per-request hot path only touches the
//! handles returned here and never the registry itself. `snapshot()` holds the
//! registry lock just long enough to clone the handle list, then reads each
//! metric independently.

use std::sync::{Arc, RwLock};

use crate::error::{Result, ScrapeError};
use crate::metrics::{
    read, write, Counter, Gauge, Histogram, HistogramSnapshot, LabelValues, MetricDescriptor,
    MetricKind,
};

/// Handle returned by [`MetricRegistry::register`].
#[derive(Clone)]
pub enum RegisteredMetric {
    Counter(Counter),
    Gauge(Gauge),
    Histogram(Histogram),
}

impl RegisteredMetric {
    pub fn descriptor(&self) -> &MetricDescriptor {
        match self {
            RegisteredMetric::Counter(c) => c.descriptor(),
            RegisteredMetric::Gauge(g) => g.descriptor(),
            RegisteredMetric::Histogram(h) => h.descriptor(),
        }
    }

    pub fn into_counter(self) -> Option<Counter> {
        match self {
            RegisteredMetric::Counter(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_gauge(self) -> Option<Gauge> {
        match self {
            RegisteredMetric::Gauge(g) => Some(g),
            _ => None,
        }
    }

    pub fn into_histogram(self) -> Option<Histogram> {
        match self {
            RegisteredMetric::Histogram(h) => Some(h),
            _ => None,
        }
    }

    fn collect(&self) -> SeriesValues {
        match self {
            RegisteredMetric::Counter(c) => SeriesValues::Counter(c.collect()),
            RegisteredMetric::Gauge(g) => SeriesValues::Gauge(g.collect()),
            RegisteredMetric::Histogram(h) => SeriesValues::Histogram(h.collect()),
        }
    }
}

/// Per-series values of one metric, sorted by label values.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesValues {
    Counter(Vec<(LabelValues, u64)>),
    Gauge(Vec<(LabelValues, f64)>),
    Histogram(Vec<(LabelValues, HistogramSnapshot)>),
}

/// One metric as seen by a scrape.
#[derive(Debug, Clone)]
pub struct MetricSnapshot {
    pub descriptor: Arc<MetricDescriptor>,
    pub values: SeriesValues,
}

#[derive(Default)]
pub struct MetricRegistry {
    // Registration order is exposition order.
    metrics: RwLock<Vec<(Arc<MetricDescriptor>, RegisteredMetric)>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a metric. Fails on an invalid descriptor or a name already in use;
    /// in both cases the registry is left unchanged.
    pub fn register(&self, desc: MetricDescriptor) -> Result<RegisteredMetric> {
        desc.validate()?;

        let mut metrics = write(&self.metrics);
        if metrics.iter().any(|(d, _)| d.name() == desc.name()) {
            return Err(ScrapeError::DuplicateMetricName(desc.name().to_string()));
        }

        let desc = Arc::new(desc);
        let metric = match desc.kind() {
            MetricKind::Counter => RegisteredMetric::Counter(Counter::new(Arc::clone(&desc))),
            MetricKind::Gauge => RegisteredMetric::Gauge(Gauge::new(Arc::clone(&desc))),
            MetricKind::Histogram => {
                RegisteredMetric::Histogram(Histogram::new(Arc::clone(&desc)))
            }
        };
        tracing::debug!(name = %desc.name(), kind = desc.kind().as_str(), "metric registered");
        metrics.push((desc, metric.clone()));
        Ok(metric)
    }

    pub fn register_counter(&self, desc: MetricDescriptor) -> Result<Counter> {
        expect_kind(&desc, MetricKind::Counter)?;
        self.register(desc)?
            .into_counter()
            .ok_or_else(|| ScrapeError::Internal("counter registration returned another kind".into()))
    }

    pub fn register_gauge(&self, desc: MetricDescriptor) -> Result<Gauge> {
        expect_kind(&desc, MetricKind::Gauge)?;
        self.register(desc)?
            .into_gauge()
            .ok_or_else(|| ScrapeError::Internal("gauge registration returned another kind".into()))
    }

    pub fn register_histogram(&self, desc: MetricDescriptor) -> Result<Histogram> {
        expect_kind(&desc, MetricKind::Histogram)?;
        self.register(desc)?.into_histogram().ok_or_else(|| {
            ScrapeError::Internal("histogram registration returned another kind".into())
        })
    }

    /// Registered metric names in registration order.
    pub fn names(&self) -> Vec<String> {
        read(&self.metrics)
            .iter()
            .map(|(d, _)| d.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        read(&self.metrics).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point-in-time view of every metric, in registration order.
    ///
    /// Each metric is read on its own; the result is not a transactional cut
    /// across metrics.
    pub fn snapshot(&self) -> Vec<MetricSnapshot> {
        let metrics = read(&self.metrics).clone();
        metrics
            .iter()
            .map(|(desc, metric)| MetricSnapshot {
                descriptor: Arc::clone(desc),
                values: metric.collect(),
            })
            .collect()
    }
}

fn expect_kind(desc: &MetricDescriptor, kind: MetricKind) -> Result<()> {
    if desc.kind() != kind {
        return Err(ScrapeError::InvalidDescriptor(format!(
            "{}: expected a {} descriptor, got {}",
            desc.name(),
            kind.as_str(),
            desc.kind().as_str()
        )));
    }
    Ok(())
}
