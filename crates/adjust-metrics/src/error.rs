//! Error types for measurement sources.

use thiserror::Error;

/// Result type alias for metric sampling.
pub type MetricResult<T> = Result<T, MetricError>;

/// Errors a measurement source can report.
#[derive(Debug, Error)]
pub enum MetricError {
    /// The capability needed to sample is missing on this platform.
    #[error("metric unavailable: {0}")]
    Unavailable(String),

    #[error("sample failed: {0}")]
    Sample(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
