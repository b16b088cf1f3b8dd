//! Histogram family with fixed, cumulative buckets.
//!
//! Each series sits behind its own `Mutex` so that buckets, sum, and count are
//! always updated together; a snapshot of one series is internally consistent
//! (`bucket_counts[last] == count`) even while other threads observe.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;

use crate::error::{Result, ScrapeError};
use crate::metrics::{lock, LabelValues, MetricDescriptor};

#[derive(Debug)]
struct Series {
    // Cumulative count per finite bound.
    buckets: Vec<u64>,
    sum: f64,
    count: u64,
}

/// Point-in-time state of one histogram series.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// Finite upper bounds, ascending.
    pub bounds: Vec<f64>,
    /// Cumulative counts: one per finite bound, plus a final `+Inf` entry equal to `count`.
    pub bucket_counts: Vec<u64>,
    pub sum: f64,
    pub count: u64,
}

impl HistogramSnapshot {
    /// `(upper bound, cumulative count)` pairs; the last bound is `f64::INFINITY`.
    pub fn buckets(&self) -> impl Iterator<Item = (f64, u64)> + '_ {
        self.bounds
            .iter()
            .copied()
            .chain(std::iter::once(f64::INFINITY))
            .zip(self.bucket_counts.iter().copied())
    }
}

#[derive(Clone)]
pub struct Histogram {
    inner: Arc<HistogramInner>,
}

struct HistogramInner {
    desc: Arc<MetricDescriptor>,
    series: DashMap<LabelValues, Mutex<Series>>,
}

impl Histogram {
    pub(crate) fn new(desc: Arc<MetricDescriptor>) -> Self {
        Self {
            inner: Arc::new(HistogramInner {
                desc,
                series: DashMap::new(),
            }),
        }
    }

    pub fn descriptor(&self) -> &MetricDescriptor {
        &self.inner.desc
    }

    /// Record one observation. NaN is rejected.
    pub fn observe(&self, labels: &[(&str, &str)], v: f64) -> Result<()> {
        let key = LabelValues::resolve(&self.inner.desc, labels)?;
        if v.is_nan() {
            return Err(ScrapeError::InvalidObservation {
                metric: self.inner.desc.name().to_string(),
                value: v,
            });
        }

        let bounds = self.inner.desc.buckets();

        // Fast path: existing series only takes a shard read lock.
        if let Some(entry) = self.inner.series.get(&key) {
            record(entry.value(), bounds, v);
            return Ok(());
        }

        let entry = self.inner.series.entry(key).or_insert_with(|| {
            Mutex::new(Series {
                buckets: vec![0; bounds.len()],
                sum: 0.0,
                count: 0,
            })
        });
        record(entry.value(), bounds, v);
        Ok(())
    }

    /// Observe a `Duration` in seconds.
    pub fn observe_duration(&self, labels: &[(&str, &str)], d: std::time::Duration) -> Result<()> {
        self.observe(labels, d.as_secs_f64())
    }

    /// State of one series, or `None` if it was never observed. Does not create a series.
    pub fn snapshot(&self, labels: &[(&str, &str)]) -> Result<Option<HistogramSnapshot>> {
        let key = LabelValues::resolve(&self.inner.desc, labels)?;
        Ok(self
            .inner
            .series
            .get(&key)
            .map(|entry| self.snapshot_series(entry.value())))
    }

    pub fn series_count(&self) -> usize {
        self.inner.series.len()
    }

    fn snapshot_series(&self, series: &Mutex<Series>) -> HistogramSnapshot {
        let s = lock(series);
        let mut bucket_counts = Vec::with_capacity(s.buckets.len() + 1);
        bucket_counts.extend_from_slice(&s.buckets);
        bucket_counts.push(s.count);
        HistogramSnapshot {
            bounds: self.inner.desc.buckets().to_vec(),
            bucket_counts,
            sum: s.sum,
            count: s.count,
        }
    }

    pub(crate) fn collect(&self) -> Vec<(LabelValues, HistogramSnapshot)> {
        let mut out: Vec<_> = self
            .inner
            .series
            .iter()
            .map(|r| (r.key().clone(), self.snapshot_series(r.value())))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

fn record(series: &Mutex<Series>, bounds: &[f64], v: f64) {
    let mut s = lock(series);
    // Cumulative buckets: increment every bucket whose bound is >= v.
    for (i, &b) in bounds.iter().enumerate() {
        if v <= b {
            s.buckets[i] += 1;
        }
    }
    s.sum += v;
    s.count += 1;
}
