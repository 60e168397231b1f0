//! Process CPU utilization sampler.
//!
//! Reads the process's cumulative user + system CPU time and reports the
//! share of wall-clock time spent on CPU since the previous sample. On a
//! multi-core host the ratio can exceed 1.

use std::time::{Duration, Instant};

use tracing::trace;

use crate::busy::ratio;
use crate::error::{MetricError, MetricResult};
use crate::source::MetricSource;

/// CPU utilization of the current process, diffed per sample.
///
/// The first window starts when the sampler is created. If the platform
/// cannot report CPU time, construction still succeeds and every `sample`
/// returns [`MetricError::Unavailable`].
#[derive(Debug)]
pub struct CpuUtilization {
    last: Option<(Duration, Instant)>,
}

impl CpuUtilization {
    pub fn new() -> Self {
        Self {
            last: process_cpu_time().ok().map(|cpu| (cpu, Instant::now())),
        }
    }
}

impl Default for CpuUtilization {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSource for CpuUtilization {
    fn sample(&mut self) -> MetricResult<f64> {
        let cpu = process_cpu_time()?;
        let now = Instant::now();

        let utilization = match self.last.replace((cpu, now)) {
            Some((last_cpu, last_at)) => ratio(
                cpu.saturating_sub(last_cpu),
                now.saturating_duration_since(last_at),
            ),
            None => 0.0,
        };

        trace!(utilization, "cpu utilization sampled");
        Ok(utilization)
    }

    fn name(&self) -> &str {
        "cpu_utilization"
    }
}

#[cfg(unix)]
fn process_cpu_time() -> MetricResult<Duration> {
    let mut usage = std::mem::MaybeUninit::<libc::rusage>::zeroed();

    // SAFETY: `usage` points to writable memory sized for a `rusage`.
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
    if rc != 0 {
        return Err(MetricError::Sample(format!(
            "getrusage failed: {}",
            std::io::Error::last_os_error()
        )));
    }

    // SAFETY: getrusage returned 0, so the struct is initialized.
    let usage = unsafe { usage.assume_init() };
    Ok(timeval_duration(usage.ru_utime) + timeval_duration(usage.ru_stime))
}

#[cfg(unix)]
fn timeval_duration(tv: libc::timeval) -> Duration {
    Duration::from_secs(tv.tv_sec.max(0) as u64) + Duration::from_micros(tv.tv_usec.max(0) as u64)
}

#[cfg(not(unix))]
fn process_cpu_time() -> MetricResult<Duration> {
    Err(MetricError::Unavailable(
        "process CPU utilization requires a Unix platform".to_string(),
    ))
}
