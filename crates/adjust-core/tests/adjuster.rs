//! End-to-end tests for the public adjuster API.

use std::io::Write;
use std::sync::{Arc, Mutex};

use adjust_core::*;
use adjust_metrics::{BusyTracker, FnMetric, UtilizationSampler};

fn hippo_options() -> AdjusterOptions {
    AdjusterOptions::default()
        .target(1.0)
        .scale_up(1.1)
        .scale_down(0.9)
        .scale_max(10.0)
        .scale_min(0.01)
}

fn hippo_adjuster() -> Adjuster {
    let config = hippo_options().resolve().unwrap();
    Adjuster::with_metric(config, FnMetric::new(|| Ok(1.0))).unwrap()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-12,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn worked_scenarios() {
    let adjuster = hippo_adjuster();

    let at_target = adjuster.compute(Some(1.0)).unwrap();
    assert_eq!(at_target.raw_scale(), 1.0);
    assert_eq!(at_target.scale(), 1.0);

    let starving = adjuster.compute(Some(0.5)).unwrap();
    assert_eq!(starving.raw_scale(), 2.0);
    assert_close(starving.scale(), 2.1);

    let overloaded = adjuster.compute(Some(2.0)).unwrap();
    assert_eq!(overloaded.raw_scale(), 0.5);
    assert_close(overloaded.scale(), 0.55);

    let tiny = adjuster.compute(Some(0.01)).unwrap();
    assert_eq!(tiny.scale(), 10.0);
}

#[test]
fn deep_overload_clamps_to_scale_min() {
    let config = hippo_options().scale_down(2.0).resolve().unwrap();
    let adjuster = Adjuster::with_metric(config, FnMetric::new(|| Ok(1.0))).unwrap();

    let a = adjuster.compute(Some(100.0)).unwrap();
    assert_eq!(a.scale(), 0.01);
}

#[test]
fn views_agree() {
    let a = hippo_adjuster().compute(Some(2.0)).unwrap();

    assert_eq!(f64::from(a), a.scale());
    assert_eq!(a.as_scale(), a.scale());
    assert_eq!(
        a.to_record(),
        serde_json::json!({
            "scale": a.scale(),
            "rawScale": a.raw_scale(),
            "measurement": a.measurement(),
        })
    );
    assert_eq!(
        a.to_string(),
        format!(
            "{{scale: {}, rawScale: {}, measurement: {}}}",
            a.scale(),
            a.raw_scale(),
            a.measurement()
        )
    );
}

#[test]
fn create_adjuster_uses_documented_defaults() {
    let adjuster = create_adjuster(&AdjusterOptions::default()).unwrap();
    assert_eq!(*adjuster.config(), AdjusterConfig::default());

    // target 0.2, measurement 0.4: raw 0.5, scale_down 2 → 0.0 → clamped to 0.01.
    let a = adjuster.compute(Some(0.4)).unwrap();
    assert_eq!(a.raw_scale(), 0.5);
    assert_eq!(a.scale(), 0.01);

    // measurement 0.1: raw 2, scale_up 0.5 → 1.5.
    let a = adjuster.compute(Some(0.1)).unwrap();
    assert_eq!(a.raw_scale(), 2.0);
    assert_eq!(a.scale(), 1.5);
}

#[test]
fn create_adjuster_rejects_bad_bounds() {
    let err = create_adjuster(&AdjusterOptions::default().scale_min(5.0).scale_max(2.0))
        .unwrap_err();
    assert_eq!(err, ConfigError::InvertedBounds { min: 5.0, max: 2.0 });
}

#[test]
fn options_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "target = 1.0\nscale_up = 1.1\nscale_down = 0.9\npolicy = \"propagate\""
    )
    .unwrap();

    let options = AdjusterOptions::from_file(file.path()).unwrap();
    let config = options.resolve().unwrap();
    assert_eq!(config.target, 1.0);
    assert_eq!(config.scale_max, 10.0);
    assert_eq!(config.policy, MeasurementPolicy::Propagate);
}

#[test]
fn options_from_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(AdjusterOptions::from_file(&dir.path().join("nope.toml")).is_err());
}

#[test]
fn stateful_metric_sees_every_sample() {
    let readings = Arc::new(Mutex::new(vec![4.0, 2.0, 1.0, 0.5]));
    let source = readings.clone();
    let metric = FnMetric::new(move || {
        let mut readings = source.lock().unwrap();
        Ok(readings.remove(0))
    });
    let config = hippo_options().resolve().unwrap();
    let adjuster = Adjuster::with_metric(config, metric).unwrap();

    let scales: Vec<f64> = (0..4)
        .map(|_| adjuster.compute(None).unwrap().scale())
        .collect();

    assert!(readings.lock().unwrap().is_empty());
    // Falling load, rising recommendation.
    assert!(scales.windows(2).all(|w| w[0] < w[1]), "{scales:?}");
}

#[test]
fn busy_sampler_drives_adjuster() {
    let tracker = BusyTracker::new();
    let t0 = std::time::Instant::now();
    let sampler = UtilizationSampler::with_baseline(tracker.clone(), t0);
    let config = AdjusterOptions::default()
        .policy(MeasurementPolicy::Propagate)
        .resolve()
        .unwrap();
    let adjuster = Adjuster::with_metric(config, sampler).unwrap();

    tracker.record_busy(std::time::Duration::from_secs(3600));
    std::thread::sleep(std::time::Duration::from_millis(1));
    // Fully busy since t0: far above the 0.2 target, so back off hard.
    let a = adjuster.compute(None).unwrap();
    assert_eq!(a.measurement(), 1.0);
    assert_eq!(a.scale(), 0.01);
}

#[test]
fn invalid_measurement_error_message() {
    let err = hippo_adjuster().compute(Some(0.0)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid measurement 0: must be finite and greater than zero"
    );
}

#[cfg(unix)]
#[test]
fn default_metric_reads_process_cpu() {
    let options = AdjusterOptions::default().policy(MeasurementPolicy::Propagate);
    let adjuster = create_adjuster(&options).unwrap();
    let a = adjuster.compute(None).unwrap();
    assert!(a.measurement() >= 0.0);
    assert!(a.scale() >= 0.01 && a.scale() <= 10.0);
}
