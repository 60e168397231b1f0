//! The measurement source contract.

use crate::error::MetricResult;

/// Produces the next load measurement on demand.
///
/// Implementations may be stateful (a differencing sampler keeps the
/// previous reading), which is why `sample` takes `&mut self`. The caller
/// decides the cadence; a source never blocks waiting for a window to close.
pub trait MetricSource: Send {
    /// Take one measurement.
    fn sample(&mut self) -> MetricResult<f64>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<T: MetricSource + ?Sized> MetricSource for Box<T> {
    fn sample(&mut self) -> MetricResult<f64> {
        (**self).sample()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Adapts a closure into a [`MetricSource`].
pub struct FnMetric<F> {
    name: String,
    f: F,
}

impl<F> FnMetric<F>
where
    F: FnMut() -> MetricResult<f64> + Send,
{
    pub fn new(f: F) -> Self {
        Self::named("fn", f)
    }

    /// Wrap a closure under a name that shows up in logs.
    pub fn named(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> MetricSource for FnMetric<F>
where
    F: FnMut() -> MetricResult<f64> + Send,
{
    fn sample(&mut self) -> MetricResult<f64> {
        (self.f)()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> std::fmt::Debug for FnMetric<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMetric").field("name", &self.name).finish()
    }
}
