//! The adjustment engine.
//!
//! Pure arithmetic over an immutable [`AdjusterConfig`] plus, when the
//! caller omits the measurement, one read from the configured
//! [`MetricSource`].

use std::fmt;
use std::sync::Mutex;

use tracing::{debug, warn};

use adjust_metrics::{CpuUtilization, MetricSource};

use crate::adjustment::Adjustment;
use crate::config::{AdjusterConfig, AdjusterOptions, MeasurementPolicy};
use crate::error::{AdjustError, AdjustResult, ConfigResult};

/// Recommends a scale factor that moves a load measurement toward a target.
///
/// The metric source sits behind a mutex, so an `Adjuster` can be shared
/// between threads; concurrent calls that omit the measurement take turns
/// reading the source.
pub struct Adjuster {
    config: AdjusterConfig,
    metric: Mutex<Box<dyn MetricSource>>,
}

/// Build an adjuster from partial options, sampling process CPU utilization
/// when no measurement is given.
pub fn create_adjuster(options: &AdjusterOptions) -> ConfigResult<Adjuster> {
    Adjuster::from_options(options)
}

impl Adjuster {
    /// Create an adjuster using [`CpuUtilization`] as its default metric.
    pub fn new(config: AdjusterConfig) -> ConfigResult<Self> {
        Self::with_metric(config, CpuUtilization::new())
    }

    /// Create an adjuster reading `metric` when no measurement is given.
    pub fn with_metric(
        config: AdjusterConfig,
        metric: impl MetricSource + 'static,
    ) -> ConfigResult<Self> {
        config.validate()?;
        debug!(
            target_value = config.target,
            scale_up = config.scale_up,
            scale_down = config.scale_down,
            scale_max = config.scale_max,
            scale_min = config.scale_min,
            metric = metric.name(),
            "adjuster created"
        );
        Ok(Self {
            config,
            metric: Mutex::new(Box::new(metric)),
        })
    }

    pub fn from_options(options: &AdjusterOptions) -> ConfigResult<Self> {
        Self::new(options.resolve()?)
    }

    pub fn config(&self) -> &AdjusterConfig {
        &self.config
    }

    /// Compute a recommendation from `measurement`, or from one fresh
    /// metric sample when `measurement` is `None`.
    ///
    /// Metric failures are returned as is; there is no fallback value.
    pub fn compute(&self, measurement: Option<f64>) -> AdjustResult<Adjustment> {
        let measurement = match measurement {
            Some(m) => m,
            None => self.read_metric()?,
        };
        self.adjust(measurement)
    }

    /// Compute a recommendation from one fresh metric sample.
    pub fn sample(&self) -> AdjustResult<Adjustment> {
        self.compute(None)
    }

    /// Compute a recommendation from an explicit measurement. Never touches
    /// the metric source.
    pub fn adjust(&self, measurement: f64) -> AdjustResult<Adjustment> {
        if self.config.policy == MeasurementPolicy::Reject
            && !(measurement.is_finite() && measurement > 0.0)
        {
            warn!(measurement, "rejecting degenerate measurement");
            return Err(AdjustError::InvalidMeasurement(measurement));
        }

        let (raw_scale, scale) = compute_scale(&self.config, measurement);
        debug!(measurement, raw_scale, scale, "adjustment computed");
        Ok(Adjustment::new(measurement, raw_scale, scale))
    }

    fn read_metric(&self) -> AdjustResult<f64> {
        let mut metric = self
            .metric
            .lock()
            .map_err(|_| AdjustError::MetricPoisoned)?;
        Ok(metric.sample()?)
    }
}

impl fmt::Debug for Adjuster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Adjuster");
        s.field("config", &self.config);
        if let Ok(metric) = self.metric.try_lock() {
            s.field("metric", &metric.name());
        }
        s.finish()
    }
}

/// Returns `(raw_scale, scale)` for one measurement.
fn compute_scale(config: &AdjusterConfig, measurement: f64) -> (f64, f64) {
    let raw_distance = config.target - measurement;
    let raw_scale = raw_distance / measurement + 1.0;
    let scale = apply_gain(raw_scale, config.scale_up, config.scale_down);
    (raw_scale, clamp_scale(scale, config.scale_min, config.scale_max))
}

/// Scale the distance from neutral by the gain for its direction.
fn apply_gain(raw_scale: f64, scale_up: f64, scale_down: f64) -> f64 {
    let gain = if raw_scale > 1.0 {
        scale_up
    } else if raw_scale < 1.0 {
        scale_down
    } else {
        1.0
    };
    (raw_scale - 1.0) * gain + 1.0
}

/// Upper bound first, then lower. NaN passes through untouched.
fn clamp_scale(scale: f64, min: f64, max: f64) -> f64 {
    if scale.is_nan() {
        return scale;
    }
    scale.min(max).max(min)
}
