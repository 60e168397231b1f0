//! adjust-metrics — measurement sources for the load adjuster.
//!
//! A measurement source is anything that can produce the next load reading
//! on demand. The adjuster only ever sees the resulting ratio; samplers that
//! read absolute counters keep their own baseline and diff it per sample.
//!
//! # Architecture
//!
//! ```text
//! MetricSource (trait)
//!   ├── FnMetric            ← wraps any FnMut() -> MetricResult<f64>
//!   ├── UtilizationSampler  ← Δbusy / Δwall from a shared BusyTracker
//!   └── CpuUtilization      ← Δ(user+system CPU) / Δwall for this process
//! ```

pub mod busy;
pub mod cpu;
pub mod error;
pub mod source;

pub use busy::{BusyGuard, BusyTracker, UtilizationSampler};
pub use cpu::CpuUtilization;
pub use error::{MetricError, MetricResult};
pub use source::{FnMetric, MetricSource};
