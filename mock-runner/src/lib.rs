use serde_json::{json, Value};
use std::collections::VecDeque;
use std::io;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;
use stepload::{Invocation, RunOutput, Runner};
use stepload_core::{METRICS_FILE, RESULTS_MARKER};
use tracing::debug;

/// Metrics for a gateway that serves 20 req/s per connection up to `saturation` connections.
///
/// Past saturation throughput stays flat, latency grows with the queue, and every excess
/// connection fails once per second.
pub fn synthetic_metrics(
    connections: NonZeroU32,
    duration: Duration,
    saturation: NonZeroU32,
) -> Value {
    let active = connections.min(saturation).get() as f64;
    let qps = active * 20.;
    let avg_ms = connections.get() as f64 * 1_000. / qps;
    let excess = connections.get().saturating_sub(saturation.get()) as u64;

    json!({
        "requests_per_sec": qps,
        "latency_avg_ms": avg_ms,
        "latency_distribution_ms": {
            "50": avg_ms * 0.8,
            "90": avg_ms * 1.6,
            "99": avg_ms * 3.0,
        },
        "error_count": excess * duration.as_secs(),
    })
}

/// Create `<root>/<label>/metrics.json` and return the directory.
pub fn write_results(root: &Path, label: &str, metrics: &Value) -> io::Result<PathBuf> {
    let dir = root.join(label);
    std::fs::create_dir_all(&dir)?;
    std::fs::write(dir.join(METRICS_FILE), serde_json::to_vec_pretty(metrics)?)?;
    Ok(dir)
}

pub fn marker_line(dir: &Path) -> String {
    format!("{RESULTS_MARKER}{}", dir.display())
}

/// One canned runner behaviour.
#[derive(Clone, Debug)]
pub enum Scripted {
    /// Write these metrics and announce the results directory.
    Metrics(Value),
    /// Exit with `code`, printing `output`.
    Exit { code: i32, output: String },
    /// Exit cleanly without announcing anything.
    Silent,
}

/// In-process stand-in for the external runner, replaying [`Scripted`] steps in order.
#[derive(Debug)]
pub struct ScriptedRunner {
    root: PathBuf,
    script: VecDeque<Scripted>,
    invocations: Vec<Invocation>,
}

impl ScriptedRunner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            script: VecDeque::new(),
            invocations: vec![],
        }
    }

    pub fn then(mut self, step: Scripted) -> Self {
        self.script.push_back(step);
        self
    }

    /// Invocations received so far, oldest first.
    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }
}

impl Runner for ScriptedRunner {
    async fn run(&mut self, invocation: &Invocation) -> io::Result<RunOutput> {
        self.invocations.push(invocation.clone());
        let step = self
            .script
            .pop_front()
            .ok_or_else(|| io::Error::other("scripted runner has no steps left"))?;
        debug!(label = %invocation.label, ?step, "Scripted run");

        let run = match step {
            Scripted::Metrics(metrics) => {
                let dir = write_results(&self.root, &invocation.label, &metrics)?;
                RunOutput {
                    exit_code: 0,
                    output: format!(
                        "Running {}s test @ {}\n{}\n",
                        invocation.duration.as_secs(),
                        invocation.url,
                        marker_line(&dir)
                    ),
                }
            }
            Scripted::Exit { code, output } => RunOutput {
                exit_code: code,
                output,
            },
            Scripted::Silent => RunOutput {
                exit_code: 0,
                output: "done\n".to_string(),
            },
        };
        Ok(run)
    }
}
