//! Shared error type across scrapekit crates.

use thiserror::Error;

/// Stable error codes (used in logs and by tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// A metric with the same name is already registered.
    DuplicateMetricName,
    /// Label keys do not match the metric's declared label names.
    InvalidLabelSet,
    /// Counter decrement attempt.
    NegativeDelta,
    /// Observed value cannot be recorded.
    InvalidObservation,
    /// Malformed metric name, label name, or bucket layout.
    InvalidDescriptor,
    /// Configuration rejected.
    BadConfig,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::DuplicateMetricName => "DUPLICATE_METRIC_NAME",
            ErrorCode::InvalidLabelSet => "INVALID_LABEL_SET",
            ErrorCode::NegativeDelta => "NEGATIVE_DELTA",
            ErrorCode::InvalidObservation => "INVALID_OBSERVATION",
            ErrorCode::InvalidDescriptor => "INVALID_DESCRIPTOR",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("duplicate metric name: {0}")]
    DuplicateMetricName(String),
    #[error("invalid label set for {metric}: expected {expected:?}, got {got:?}")]
    InvalidLabelSet {
        metric: String,
        expected: Vec<String>,
        got: Vec<String>,
    },
    #[error("negative delta {delta} for counter {metric}")]
    NegativeDelta { metric: String, delta: i64 },
    #[error("invalid observation for {metric}: {value}")]
    InvalidObservation { metric: String, value: f64 },
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ScrapeError {
    /// Map an error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ScrapeError::DuplicateMetricName(_) => ErrorCode::DuplicateMetricName,
            ScrapeError::InvalidLabelSet { .. } => ErrorCode::InvalidLabelSet,
            ScrapeError::NegativeDelta { .. } => ErrorCode::NegativeDelta,
            ScrapeError::InvalidObservation { .. } => ErrorCode::InvalidObservation,
            ScrapeError::InvalidDescriptor(_) => ErrorCode::InvalidDescriptor,
            ScrapeError::BadConfig(_) => ErrorCode::BadConfig,
            ScrapeError::Internal(_) => ErrorCode::Internal,
        }
    }
}
