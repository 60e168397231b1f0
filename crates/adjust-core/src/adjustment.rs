//! The result of one adjustment computation.

use std::fmt;

use serde::Serialize;

/// A scale recommendation, frozen at the moment it was computed.
///
/// Only [`scale`](Adjustment::scale) is meant to be applied; `raw_scale`
/// and `measurement` are carried along for logging and tracing. Use
/// [`as_scale`](Adjustment::as_scale) (or `f64::from`) where a plain number
/// is needed, [`to_record`](Adjustment::to_record) or serde for structured
/// output, and `Display` for a human-readable line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Adjustment {
    scale: f64,
    raw_scale: f64,
    measurement: f64,
}

impl Adjustment {
    pub(crate) fn new(measurement: f64, raw_scale: f64, scale: f64) -> Self {
        Self {
            scale,
            raw_scale,
            measurement,
        }
    }

    /// Recommended, gained and clamped scale factor.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Scale that would reach the target in one step, before gain and clamping.
    /// Can be zero or infinite.
    pub fn raw_scale(&self) -> f64 {
        self.raw_scale
    }

    /// The measurement this recommendation was computed from.
    pub fn measurement(&self) -> f64 {
        self.measurement
    }

    /// Numeric view: the recommended scale.
    pub fn as_scale(&self) -> f64 {
        self.scale
    }

    /// Multiply a controlled quantity by the recommended scale.
    pub fn apply(&self, quantity: f64) -> f64 {
        quantity * self.scale
    }

    /// Record view: `{scale, rawScale, measurement}`. Non-finite numbers
    /// become `null`, as in any JSON encoding.
    pub fn to_record(&self) -> serde_json::Value {
        serde_json::json!({
            "scale": self.scale,
            "rawScale": self.raw_scale,
            "measurement": self.measurement,
        })
    }

    /// False when a degenerate measurement leaked NaN or infinity into the
    /// result (only possible under [`MeasurementPolicy::Propagate`](crate::MeasurementPolicy::Propagate)).
    pub fn is_finite(&self) -> bool {
        self.scale.is_finite() && self.raw_scale.is_finite() && self.measurement.is_finite()
    }
}

impl From<Adjustment> for f64 {
    fn from(adjustment: Adjustment) -> f64 {
        adjustment.scale
    }
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{scale: {}, rawScale: {}, measurement: {}}}",
            self.scale, self.raw_scale, self.measurement
        )
    }
}
