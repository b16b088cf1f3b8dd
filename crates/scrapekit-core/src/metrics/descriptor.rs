//! Metric identity: name, help text, kind, label schema, and bucket layout.

use crate::error::{Result, ScrapeError};

/// Default histogram bounds in seconds (sub-second request latency).
pub const DEFAULT_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

impl MetricKind {
    /// Value used on the `# TYPE` line.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

/// Immutable identity of a metric. Fixed once registered.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDescriptor {
    name: String,
    help: String,
    kind: MetricKind,
    label_names: Vec<String>,
    buckets: Vec<f64>,
}

impl MetricDescriptor {
    fn new(name: &str, help: &str, kind: MetricKind, label_names: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            kind,
            label_names: label_names.iter().map(|s| s.to_string()).collect(),
            buckets: Vec::new(),
        }
    }

    pub fn counter(name: &str, help: &str, label_names: &[&str]) -> Self {
        Self::new(name, help, MetricKind::Counter, label_names)
    }

    pub fn gauge(name: &str, help: &str, label_names: &[&str]) -> Self {
        Self::new(name, help, MetricKind::Gauge, label_names)
    }

    /// Histogram with `DEFAULT_BUCKETS`; override with [`with_buckets`](Self::with_buckets).
    pub fn histogram(name: &str, help: &str, label_names: &[&str]) -> Self {
        let mut d = Self::new(name, help, MetricKind::Histogram, label_names);
        d.buckets = DEFAULT_BUCKETS.to_vec();
        d
    }

    /// Replace the bucket upper bounds. The `+Inf` bucket is implicit.
    pub fn with_buckets(mut self, buckets: &[f64]) -> Self {
        self.buckets = buckets.to_vec();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Finite bucket bounds (histograms only; empty otherwise).
    pub fn buckets(&self) -> &[f64] {
        &self.buckets
    }

    /// Checked by the registry before a descriptor is accepted.
    pub fn validate(&self) -> Result<()> {
        if !is_metric_name(&self.name) {
            return Err(ScrapeError::InvalidDescriptor(format!(
                "invalid metric name: {:?}",
                self.name
            )));
        }

        for (i, label) in self.label_names.iter().enumerate() {
            if !is_label_name(label) || label.starts_with("__") {
                return Err(ScrapeError::InvalidDescriptor(format!(
                    "{}: invalid label name {label:?}",
                    self.name
                )));
            }
            if self.label_names[..i].contains(label) {
                return Err(ScrapeError::InvalidDescriptor(format!(
                    "{}: duplicate label name {label:?}",
                    self.name
                )));
            }
        }

        if self.kind == MetricKind::Histogram {
            if self.label_names.iter().any(|l| l == "le") {
                return Err(ScrapeError::InvalidDescriptor(format!(
                    "{}: \"le\" is reserved for histogram buckets",
                    self.name
                )));
            }
            validate_buckets(&self.buckets).map_err(|msg| {
                ScrapeError::InvalidDescriptor(format!("{}: {msg}", self.name))
            })?;
        }

        Ok(())
    }
}

/// Bucket bounds must be non-empty, finite, and strictly ascending.
pub fn validate_buckets(buckets: &[f64]) -> std::result::Result<(), &'static str> {
    if buckets.is_empty() {
        return Err("buckets must not be empty");
    }
    if buckets.iter().any(|b| !b.is_finite()) {
        return Err("buckets must be finite (+Inf is implicit)");
    }
    if buckets.windows(2).any(|w| w[0] >= w[1]) {
        return Err("buckets must be strictly ascending");
    }
    Ok(())
}

// [a-zA-Z_:][a-zA-Z0-9_:]*
fn is_metric_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

// [a-zA-Z_][a-zA-Z0-9_]*
fn is_label_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
