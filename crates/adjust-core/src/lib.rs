//! adjust-core — feedback-loop scale recommendations.
//!
//! Given a periodic load measurement (a saturation ratio, a utilization
//! fraction), the [`Adjuster`] recommends a multiplicative scale factor for
//! whatever the caller controls: admitted work, concurrency, allocation.
//! Applied every cycle, the recommendations drive the measurement toward the
//! configured target.
//!
//! # Algorithm
//!
//! ```text
//! raw_scale = (target - measurement) / measurement + 1
//! gain      = scale_up   if raw_scale > 1
//!             scale_down if raw_scale < 1
//!             1          otherwise
//! scale     = (raw_scale - 1) * gain + 1
//! scale     = max(min(scale, scale_max), scale_min)
//! ```
//!
//! The gain multiplies the distance from neutral (1 = no change), so it
//! never moves the neutral point. The controller keeps no history; the only
//! state between calls lives inside the metric source.

pub mod adjustment;
pub mod config;
pub mod engine;
pub mod error;

pub use adjust_metrics::{MetricError, MetricSource};
pub use adjustment::Adjustment;
pub use config::{AdjusterConfig, AdjusterOptions, MeasurementPolicy};
pub use engine::{Adjuster, create_adjuster};
pub use error::{AdjustError, AdjustResult, ConfigError, ConfigResult};
