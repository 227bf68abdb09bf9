//! The sequential step-load driver.
use crate::{
    error::{ReportError, TrialFailure},
    report::{progress_line, render_table, write_summary},
    runner::{Invocation, Runner},
};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use stepload_core::{
    RunnerMetrics, Summary, TrialConfig, TrialRow, METRICS_FILE, RESULTS_MARKER,
};
#[allow(unused)]
use tracing::{debug, error, info, instrument, warn, Instrument};

/// Rows collected by a run, and the failure that ended it early, if any.
#[derive(Debug)]
pub struct StepOutcome {
    pub rows: Vec<TrialRow>,
    pub failure: Option<TrialFailure>,
}

impl StepOutcome {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Runs one trial per connection count, strictly in order.
///
/// The first failing trial ends the run; rows from earlier trials are kept.
///
/// # Example
///
/// ```ignore
/// let runner = ProcessRunner::new("tests/perf/http/run_gateway_http_wrk.py").interpreter("python3");
/// let outcome = StepLoad::new(config, runner).run().await;
/// ```
pub struct StepLoad<R> {
    config: TrialConfig,
    runner: R,
}

impl<R: Runner> StepLoad<R> {
    pub fn new(config: TrialConfig, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    #[instrument(name = "step_load", skip_all, fields(label = %self.config.label))]
    pub async fn run(&mut self) -> StepOutcome {
        let Self { config, runner } = self;
        let mut rows = Vec::with_capacity(config.connections.len());

        for &connections in &config.connections {
            println!("\n[RUN] connections={connections}");

            match run_trial(config, runner, connections).await {
                Ok(row) => {
                    info!(
                        %connections,
                        qps = row.qps,
                        p99_ms = row.p99_ms,
                        errors = row.errors,
                        "Trial complete"
                    );
                    println!("{}", progress_line(&row));
                    rows.push(row);
                }
                Err(failure) => {
                    if let Some(output) = failure.output() {
                        println!("{output}");
                    }
                    println!("[FAIL] {failure}");
                    warn!(%connections, "Stopping after failed trial: {failure}");
                    return StepOutcome {
                        rows,
                        failure: Some(failure),
                    };
                }
            }
        }

        StepOutcome {
            rows,
            failure: None,
        }
    }
}

async fn run_trial<R: Runner>(
    config: &TrialConfig,
    runner: &mut R,
    connections: NonZeroU32,
) -> Result<TrialRow, TrialFailure> {
    let invocation = Invocation::for_trial(config, connections);
    debug!(label = %invocation.label, "Invoking runner");

    let run = runner
        .run(&invocation)
        .await
        .map_err(TrialFailure::Spawn)?;

    if !run.success() {
        return Err(TrialFailure::RunnerExit {
            exit_code: run.exit_code,
            output: run.output,
        });
    }

    let Some(results_dir) = find_results_dir(&run.output) else {
        return Err(TrialFailure::ResultsDirMissing { output: run.output });
    };

    let path = results_dir.join(METRICS_FILE);
    let raw = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| TrialFailure::MetricsIo {
            path: path.clone(),
            source,
        })?;
    let metrics = RunnerMetrics::from_json_str(&raw)
        .map_err(|source| TrialFailure::Metrics { path, source })?;

    Ok(TrialRow::from_metrics(
        connections,
        &metrics,
        config.duration,
        results_dir,
    ))
}

/// Locate the results directory announced by the runner.
///
/// Only the first line starting with the marker counts. A marker with nothing after it names the
/// current directory.
pub fn find_results_dir(output: &str) -> Option<PathBuf> {
    output
        .lines()
        .find_map(|line| line.strip_prefix(RESULTS_MARKER))
        .map(str::trim)
        .map(|dir| if dir.is_empty() { "." } else { dir })
        .map(PathBuf::from)
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct Report {
    pub summary: Summary,
    pub summary_path: PathBuf,
    pub failure: Option<TrialFailure>,
}

/// Run every trial, print the table and write the summary under `repo_root`.
///
/// Trial failures end up in [`Report::failure`]; only writing the summary can fail.
pub async fn run_step_load<R: Runner>(
    step_load: &mut StepLoad<R>,
    repo_root: &Path,
) -> Result<Report, ReportError> {
    let config = step_load.config();
    println!(
        "Running step load test: url={} threads={} duration={}s conf={}",
        config.url,
        config.threads,
        config.duration.as_secs(),
        config.conf.display()
    );

    let outcome = step_load.run().await;

    print!("{}", render_table(&outcome.rows));

    let summary = Summary {
        args: step_load.config().clone(),
        rows: outcome.rows,
    };
    let summary_path = write_summary(repo_root, &summary).await?;
    println!("Summary written: {}", summary_path.display());

    Ok(Report {
        summary,
        summary_path,
        failure: outcome.failure,
    })
}
