use crate::{RunnerMetrics, TrialConfig};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Statistics for one completed trial.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialRow {
    pub connections: NonZeroU32,
    pub qps: f64,
    pub avg_ms: f64,
    pub p99_ms: f64,
    pub errors: u64,
    pub error_rate: f64,
    pub results_dir: PathBuf,
}

impl TrialRow {
    pub fn from_metrics(
        connections: NonZeroU32,
        metrics: &RunnerMetrics,
        duration: Duration,
        results_dir: PathBuf,
    ) -> Self {
        let error_rate = error_rate(metrics.requests_per_sec, duration, metrics.error_count);
        trace!(%connections, error_rate, "Derived trial statistics");

        Self {
            connections,
            qps: metrics.requests_per_sec,
            avg_ms: metrics.latency_avg_ms,
            p99_ms: metrics.latency_p99_ms,
            errors: metrics.error_count,
            error_rate,
            results_dir,
        }
    }
}

/// Errors over estimated attempts.
///
/// The runner only reports a rate, so successes are estimated as `qps * duration`.
pub fn error_rate(qps: f64, duration: Duration, errors: u64) -> f64 {
    let est_ok = qps * duration.as_secs_f64();
    let total_attempts = est_ok + errors as f64;
    if total_attempts > 0. {
        errors as f64 / total_attempts
    } else {
        0.
    }
}

/// Document written once a run ends: the configuration plus every row collected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub args: TrialConfig,
    pub rows: Vec<TrialRow>,
}
