//! Error types for the load adjuster.

use thiserror::Error;

use adjust_metrics::MetricError;

/// Result type alias for configuration handling.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for adjustment computations.
pub type AdjustResult<T> = Result<T, AdjustError>;

/// Rejected adjuster configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("scale_min must be greater than zero, got {0}")]
    NonPositiveScaleMin(f64),

    #[error("scale_min ({min}) must not exceed scale_max ({max})")]
    InvertedBounds { min: f64, max: f64 },

    #[error("failed to parse adjuster options: {0}")]
    Parse(String),
}

/// Errors surfaced by [`Adjuster::compute`](crate::Adjuster::compute).
#[derive(Debug, Error)]
pub enum AdjustError {
    /// Zero, negative or non-finite measurement under the rejecting policy.
    #[error("invalid measurement {0}: must be finite and greater than zero")]
    InvalidMeasurement(f64),

    /// The metric source failed; its error is passed through untouched.
    #[error(transparent)]
    Metric(#[from] MetricError),

    #[error("metric source lock poisoned")]
    MetricPoisoned,
}
