//! Label-set resolution.
//!
//! Callers pass `&[(key, value)]` pairs in any order. They are checked against
//! the descriptor's declared label names and flattened into the value vector
//! ordered by declaration, which is the aggregation key for a series.

use crate::error::{Result, ScrapeError};
use crate::metrics::MetricDescriptor;

/// Label values in the descriptor's declared label order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelValues(Vec<String>);

impl LabelValues {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Resolve `(key, value)` pairs against `desc`.
    ///
    /// Fails with `InvalidLabelSet` unless exactly the declared keys are
    /// supplied, each once.
    pub fn resolve(desc: &MetricDescriptor, labels: &[(&str, &str)]) -> Result<Self> {
        let names = desc.label_names();
        if labels.len() != names.len() {
            return Err(invalid(desc, labels));
        }

        let mut values = Vec::with_capacity(names.len());
        for name in names {
            // Equal lengths plus every declared name present rules out duplicates.
            match labels.iter().find(|(k, _)| k == name) {
                Some((_, v)) => values.push(v.to_string()),
                None => return Err(invalid(desc, labels)),
            }
        }
        Ok(Self(values))
    }
}

fn invalid(desc: &MetricDescriptor, labels: &[(&str, &str)]) -> ScrapeError {
    ScrapeError::InvalidLabelSet {
        metric: desc.name().to_string(),
        expected: desc.label_names().to_vec(),
        got: labels.iter().map(|(k, _)| k.to_string()).collect(),
    }
}
