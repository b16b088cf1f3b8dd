use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{Result, ScrapeError};
use crate::metrics::{LabelValues, MetricDescriptor};

/// Monotonic counter family. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Counter {
    inner: Arc<CounterInner>,
}

struct CounterInner {
    desc: Arc<MetricDescriptor>,
    series: DashMap<LabelValues, AtomicU64>,
}

impl Counter {
    pub(crate) fn new(desc: Arc<MetricDescriptor>) -> Self {
        Self {
            inner: Arc::new(CounterInner {
                desc,
                series: DashMap::new(),
            }),
        }
    }

    pub fn descriptor(&self) -> &MetricDescriptor {
        &self.inner.desc
    }

    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) -> Result<()> {
        self.inc_by(labels, 1)
    }

    /// Increment by `delta`. Negative deltas are rejected and leave the counter unchanged.
    /// A series that reaches `u64::MAX` stays there.
    pub fn inc_by(&self, labels: &[(&str, &str)], delta: i64) -> Result<()> {
        let key = LabelValues::resolve(&self.inner.desc, labels)?;
        if delta < 0 {
            return Err(ScrapeError::NegativeDelta {
                metric: self.inner.desc.name().to_string(),
                delta,
            });
        }
        let delta = delta as u64;

        // Fast path: existing series only takes a shard read lock.
        if let Some(counter) = self.inner.series.get(&key) {
            saturating_add(&counter, delta);
            return Ok(());
        }

        let counter = self
            .inner
            .series
            .entry(key)
            .or_insert_with(|| AtomicU64::new(0));
        saturating_add(&counter, delta);
        Ok(())
    }

    /// Current value; 0 for a label-set never observed. Does not create a series.
    pub fn value(&self, labels: &[(&str, &str)]) -> Result<u64> {
        let key = LabelValues::resolve(&self.inner.desc, labels)?;
        Ok(self
            .inner
            .series
            .get(&key)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0))
    }

    /// Number of distinct label-sets observed so far.
    pub fn series_count(&self) -> usize {
        self.inner.series.len()
    }

    /// All series sorted by label values.
    pub(crate) fn collect(&self) -> Vec<(LabelValues, u64)> {
        let mut out: Vec<_> = self
            .inner
            .series
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

fn saturating_add(counter: &AtomicU64, delta: u64) {
    // The closure never returns None, so the update always lands.
    let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
        Some(v.saturating_add(delta))
    });
}
