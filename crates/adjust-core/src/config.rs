//! Adjuster configuration: documented defaults, partial options, validation.
//!
//! [`AdjusterOptions`] is what callers and config files provide; any field
//! may be omitted. [`AdjusterOptions::resolve`] fills the gaps from
//! [`AdjusterConfig::default`] and validates the result once, at
//! construction time.
//!
//! ```toml
//! target = 0.75
//! scale_up = 0.5
//! scale_down = 2.0
//! scale_max = 10.0
//! scale_min = 0.01
//! policy = "reject"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, ConfigResult};

pub const DEFAULT_TARGET: f64 = 0.2;
/// Ramp up slowly toward the target.
pub const DEFAULT_SCALE_UP: f64 = 0.5;
/// Back off past the target; overshooting the load is the worse outcome.
pub const DEFAULT_SCALE_DOWN: f64 = 2.0;
pub const DEFAULT_SCALE_MAX: f64 = 10.0;
pub const DEFAULT_SCALE_MIN: f64 = 0.01;

/// What to do with a measurement the ratio formula cannot handle
/// (zero, negative, NaN or infinite).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementPolicy {
    /// Fail the computation with [`AdjustError::InvalidMeasurement`](crate::AdjustError::InvalidMeasurement).
    #[default]
    Reject,
    /// Run the arithmetic anyway. `raw_scale` may be infinite or NaN, an
    /// infinite scale clamps to a bound and a NaN scale is returned as is.
    Propagate,
}

/// Validated numeric configuration of an [`Adjuster`](crate::Adjuster).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjusterConfig {
    /// Desired steady-state measurement.
    pub target: f64,
    /// Gain when the measurement is below target.
    pub scale_up: f64,
    /// Gain when the measurement is above target.
    pub scale_down: f64,
    /// Upper clamp on the recommended scale.
    pub scale_max: f64,
    /// Lower clamp on the recommended scale. Must be positive.
    pub scale_min: f64,
    #[serde(default)]
    pub policy: MeasurementPolicy,
}

impl Default for AdjusterConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET,
            scale_up: DEFAULT_SCALE_UP,
            scale_down: DEFAULT_SCALE_DOWN,
            scale_max: DEFAULT_SCALE_MAX,
            scale_min: DEFAULT_SCALE_MIN,
            policy: MeasurementPolicy::default(),
        }
    }
}

impl AdjusterConfig {
    /// Check the clamp invariants. Nothing is ever normalized.
    pub fn validate(&self) -> ConfigResult<()> {
        let fields = [
            ("target", self.target),
            ("scale_up", self.scale_up),
            ("scale_down", self.scale_down),
            ("scale_max", self.scale_max),
            ("scale_min", self.scale_min),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }

        if self.scale_min <= 0.0 {
            return Err(ConfigError::NonPositiveScaleMin(self.scale_min));
        }
        if self.scale_min > self.scale_max {
            return Err(ConfigError::InvertedBounds {
                min: self.scale_min,
                max: self.scale_max,
            });
        }

        if self.target <= 0.0 {
            warn!(
                target_value = self.target,
                "non-positive adjuster target; recommendations will not converge"
            );
        }
        Ok(())
    }
}

/// Partial configuration. Omitted fields take the documented defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdjusterOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_up: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_down: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<MeasurementPolicy>,
}

impl AdjusterOptions {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&content)?)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn target(mut self, target: f64) -> Self {
        self.target = Some(target);
        self
    }

    pub fn scale_up(mut self, gain: f64) -> Self {
        self.scale_up = Some(gain);
        self
    }

    pub fn scale_down(mut self, gain: f64) -> Self {
        self.scale_down = Some(gain);
        self
    }

    pub fn scale_max(mut self, max: f64) -> Self {
        self.scale_max = Some(max);
        self
    }

    pub fn scale_min(mut self, min: f64) -> Self {
        self.scale_min = Some(min);
        self
    }

    pub fn policy(mut self, policy: MeasurementPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: AdjusterOptions) -> Self {
        Self {
            target: other.target.or(self.target),
            scale_up: other.scale_up.or(self.scale_up),
            scale_down: other.scale_down.or(self.scale_down),
            scale_max: other.scale_max.or(self.scale_max),
            scale_min: other.scale_min.or(self.scale_min),
            policy: other.policy.or(self.policy),
        }
    }

    /// Fill omitted fields with defaults and validate.
    pub fn resolve(&self) -> ConfigResult<AdjusterConfig> {
        let defaults = AdjusterConfig::default();
        let config = AdjusterConfig {
            target: self.target.unwrap_or(defaults.target),
            scale_up: self.scale_up.unwrap_or(defaults.scale_up),
            scale_down: self.scale_down.unwrap_or(defaults.scale_down),
            scale_max: self.scale_max.unwrap_or(defaults.scale_max),
            scale_min: self.scale_min.unwrap_or(defaults.scale_min),
            policy: self.policy.unwrap_or(defaults.policy),
        };
        config.validate()?;
        Ok(config)
    }
}

impl From<AdjusterConfig> for AdjusterOptions {
    fn from(config: AdjusterConfig) -> Self {
        Self {
            target: Some(config.target),
            scale_up: Some(config.scale_up),
            scale_down: Some(config.scale_down),
            scale_max: Some(config.scale_max),
            scale_min: Some(config.scale_min),
            policy: Some(config.policy),
        }
    }
}
