//! `adjust watch` — steer a concurrency limit from process CPU utilization.
//!
//! Every interval the adjuster samples its default metric and the limit is
//! multiplied by the recommended scale, clamped to `[1, max_limit]`.

use std::time::Duration;

use anyhow::ensure;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use adjust_core::{AdjustResult, Adjuster, AdjusterOptions, Adjustment};

/// Applies each recommendation to a concurrency limit.
pub struct LimitGovernor {
    adjuster: Adjuster,
    limit: f64,
    max_limit: f64,
}

impl LimitGovernor {
    pub fn new(adjuster: Adjuster, initial_limit: f64, max_limit: f64) -> anyhow::Result<Self> {
        ensure!(
            max_limit.is_finite() && max_limit >= 1.0,
            "max limit must be at least 1, got {max_limit}"
        );
        ensure!(
            initial_limit.is_finite() && initial_limit > 0.0,
            "initial limit must be positive, got {initial_limit}"
        );
        Ok(Self {
            adjuster,
            limit: initial_limit.clamp(1.0, max_limit),
            max_limit,
        })
    }

    pub fn limit(&self) -> f64 {
        self.limit
    }

    /// Run one control cycle. `None` samples the adjuster's metric.
    ///
    /// A non-finite recommendation leaves the limit unchanged.
    pub fn tick(&mut self, measurement: Option<f64>) -> AdjustResult<Adjustment> {
        let adjustment = self.adjuster.compute(measurement)?;
        if adjustment.scale().is_finite() {
            self.limit = adjustment.apply(self.limit).clamp(1.0, self.max_limit);
        } else {
            warn!(%adjustment, "non-finite recommendation, limit unchanged");
        }
        Ok(adjustment)
    }

    /// Tick every `interval` until shutdown.
    pub async fn run(&mut self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_ms = interval.as_millis() as u64,
            limit = self.limit,
            "watch loop started"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    match self.tick(None) {
                        Ok(adjustment) => info!(
                            measurement = adjustment.measurement(),
                            raw_scale = adjustment.raw_scale(),
                            scale = adjustment.scale(),
                            limit = self.limit,
                            "limit adjusted"
                        ),
                        Err(e) => warn!(error = %e, limit = self.limit, "adjustment skipped"),
                    }
                }
                _ = shutdown.changed() => {
                    info!(limit = self.limit, "watch loop shutting down");
                    break;
                }
            }
        }
    }
}

pub async fn watch(
    options: &AdjusterOptions,
    interval: Duration,
    initial_limit: f64,
    max_limit: f64,
) -> anyhow::Result<()> {
    let adjuster = Adjuster::from_options(options)?;
    debug!(?adjuster, "adjuster ready");
    let mut governor = LimitGovernor::new(adjuster, initial_limit, max_limit)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    governor.run(interval, shutdown_rx).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use adjust_core::{AdjusterConfig, MeasurementPolicy};
    use adjust_metrics::FnMetric;

    fn governor(initial: f64, max: f64) -> LimitGovernor {
        let config = AdjusterOptions::default()
            .target(1.0)
            .scale_up(1.0)
            .scale_down(1.0)
            .resolve()
            .unwrap();
        let adjuster = Adjuster::with_metric(config, FnMetric::new(|| Ok(2.0))).unwrap();
        LimitGovernor::new(adjuster, initial, max).unwrap()
    }

    #[test]
    fn tick_scales_limit() {
        let mut g = governor(16.0, 1024.0);

        // Load twice the target halves the limit.
        let a = g.tick(None).unwrap();
        assert_eq!(a.measurement(), 2.0);
        assert_eq!(g.limit(), 8.0);

        // Load half the target doubles it.
        g.tick(Some(0.5)).unwrap();
        assert_eq!(g.limit(), 16.0);
    }

    #[test]
    fn limit_respects_bounds() {
        let mut g = governor(16.0, 20.0);
        g.tick(Some(0.25)).unwrap();
        assert_eq!(g.limit(), 20.0);

        let mut g = governor(2.0, 20.0);
        g.tick(Some(8.0)).unwrap();
        assert_eq!(g.limit(), 1.0);
    }

    #[test]
    fn rejected_measurement_keeps_limit() {
        let mut g = governor(16.0, 1024.0);
        assert!(g.tick(Some(0.0)).is_err());
        assert_eq!(g.limit(), 16.0);
    }

    #[test]
    fn nan_recommendation_keeps_limit() {
        let config = AdjusterConfig {
            policy: MeasurementPolicy::Propagate,
            ..AdjusterConfig::default()
        };
        let adjuster = Adjuster::with_metric(config, FnMetric::new(|| Ok(f64::NAN))).unwrap();
        let mut g = LimitGovernor::new(adjuster, 16.0, 1024.0).unwrap();

        let a = g.tick(None).unwrap();
        assert!(a.scale().is_nan());
        assert_eq!(g.limit(), 16.0);
    }

    #[test]
    fn rejects_bad_limits() {
        let adjuster = || {
            Adjuster::with_metric(AdjusterConfig::default(), FnMetric::new(|| Ok(1.0))).unwrap()
        };
        assert!(LimitGovernor::new(adjuster(), 16.0, 0.5).is_err());
        assert!(LimitGovernor::new(adjuster(), 0.0, 10.0).is_err());
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let mut g = governor(16.0, 1024.0);
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            g.run(Duration::from_millis(5), rx).await;
            g.limit()
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();

        let limit = handle.await.unwrap();
        // The constant 2.0 load halves the limit each tick, never below 1.
        assert!((1.0..16.0).contains(&limit), "limit {limit}");
    }
}
