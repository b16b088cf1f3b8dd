//! Metric model: descriptors, label resolution, metric types, and the registry.
//!
//! Every metric owns a `DashMap` keyed by its resolved label values. Series are
//! created lazily on first update (exactly once, through `DashMap::entry`) and
//! never removed.

pub mod counter;
pub mod descriptor;
pub mod gauge;
pub mod histogram;
pub mod labels;
pub mod registry;

pub use counter::Counter;
pub use descriptor::{MetricDescriptor, MetricKind, DEFAULT_BUCKETS};
pub use gauge::Gauge;
pub use histogram::{Histogram, HistogramSnapshot};
pub use labels::LabelValues;
pub use registry::{MetricRegistry, MetricSnapshot, RegisteredMetric, SeriesValues};

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

// Poisoned locks are recovered rather than propagated: every critical section in
// this crate leaves its data consistent before any point that could unwind.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn read<T>(l: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    l.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(l: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    l.write().unwrap_or_else(PoisonError::into_inner)
}
