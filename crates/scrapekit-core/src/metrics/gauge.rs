use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::Result;
use crate::metrics::{LabelValues, MetricDescriptor};

/// Gauge family. Values are `f64` stored as bits in an `AtomicU64`.
#[derive(Clone)]
pub struct Gauge {
    inner: Arc<GaugeInner>,
}

struct GaugeInner {
    desc: Arc<MetricDescriptor>,
    series: DashMap<LabelValues, AtomicU64>,
}

impl Gauge {
    pub(crate) fn new(desc: Arc<MetricDescriptor>) -> Self {
        Self {
            inner: Arc::new(GaugeInner {
                desc,
                series: DashMap::new(),
            }),
        }
    }

    pub fn descriptor(&self) -> &MetricDescriptor {
        &self.inner.desc
    }

    pub fn set(&self, labels: &[(&str, &str)], v: f64) -> Result<()> {
        let key = LabelValues::resolve(&self.inner.desc, labels)?;
        let cell = self
            .inner
            .series
            .entry(key)
            .or_insert_with(|| AtomicU64::new(0f64.to_bits()));
        cell.store(v.to_bits(), Ordering::Relaxed);
        Ok(())
    }

    pub fn inc(&self, labels: &[(&str, &str)]) -> Result<()> {
        self.add(labels, 1.0)
    }

    pub fn dec(&self, labels: &[(&str, &str)]) -> Result<()> {
        self.add(labels, -1.0)
    }

    /// Add a signed delta.
    pub fn add(&self, labels: &[(&str, &str)], delta: f64) -> Result<()> {
        let key = LabelValues::resolve(&self.inner.desc, labels)?;
        let cell = self
            .inner
            .series
            .entry(key)
            .or_insert_with(|| AtomicU64::new(0f64.to_bits()));
        // CAS loop; the closure never returns None so this cannot fail.
        let _ = cell.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
            Some((f64::from_bits(bits) + delta).to_bits())
        });
        Ok(())
    }

    /// Current value; 0.0 for a label-set never observed.
    pub fn value(&self, labels: &[(&str, &str)]) -> Result<f64> {
        let key = LabelValues::resolve(&self.inner.desc, labels)?;
        Ok(self
            .inner
            .series
            .get(&key)
            .map(|c| f64::from_bits(c.load(Ordering::Relaxed)))
            .unwrap_or(0.0))
    }

    pub(crate) fn collect(&self) -> Vec<(LabelValues, f64)> {
        let mut out: Vec<_> = self
            .inner
            .series
            .iter()
            .map(|r| (r.key().clone(), f64::from_bits(r.value().load(Ordering::Relaxed))))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}
