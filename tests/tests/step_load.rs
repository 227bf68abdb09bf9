#[allow(unused)]
use utils::*;

use mock_runner::{synthetic_metrics, Scripted, ScriptedRunner};
use serde_json::json;
use std::num::NonZeroU32;
use std::time::Duration;
use stepload::report::{render_table, summary_path};
use stepload::{run_step_load, StepLoad, TrialFailure};
use stepload_core::{Summary, METRICS_FILE};

#[tokio::test]
async fn every_trial_yields_a_row_in_order() -> anyhow::Result<()> {
    init();
    let repo = tempfile::tempdir()?;
    let results = tempfile::tempdir()?;

    let runner = ScriptedRunner::new(results.path())
        .then(Scripted::Metrics(json!({
            "requests_per_sec": 100.0,
            "latency_avg_ms": 2.0,
            "latency_distribution_ms": { "99": 8.0 },
            "error_count": 0
        })))
        .then(Scripted::Metrics(json!({
            "requests_per_sec": 100.0,
            "latency_avg_ms": 4.0,
            "latency_distribution_ms": { "99": 16.0 },
            "error_count": 10
        })));
    let mut step_load = StepLoad::new(config("ordered", &[512, 1024]), runner);
    let report = run_step_load(&mut step_load, repo.path()).await?;

    assert!(report.failure.is_none());
    let rows = &report.summary.rows;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].connections.get(), 512);
    assert_eq!(rows[1].connections.get(), 1024);
    assert_eq!(rows[0].error_rate, 0.);
    assert_eq!(rows[1].error_rate, 10. / (1500. + 10.));
    assert_eq!(rows[1].results_dir, results.path().join("ordered_c1024"));
    assert!(rows[1].results_dir.join(METRICS_FILE).exists());

    let labels: Vec<&str> = step_load
        .runner()
        .invocations()
        .iter()
        .map(|i| i.label.as_str())
        .collect();
    assert_eq!(labels, vec!["ordered_c512", "ordered_c1024"]);

    Ok(())
}

#[tokio::test]
async fn summary_round_trips_what_was_printed() -> anyhow::Result<()> {
    init();
    let repo = tempfile::tempdir()?;
    let results = tempfile::tempdir()?;
    let saturation = NonZeroU32::new(1024).expect("non-zero");
    let duration = Duration::from_secs(15);

    let mut runner = ScriptedRunner::new(results.path());
    for c in [512, 1024, 2048] {
        let c = NonZeroU32::new(c).expect("non-zero");
        runner = runner.then(Scripted::Metrics(synthetic_metrics(c, duration, saturation)));
    }
    let mut step_load = StepLoad::new(config("round_trip", &[512, 1024, 2048]), runner);
    let report = run_step_load(&mut step_load, repo.path()).await?;

    assert_eq!(
        report.summary_path,
        summary_path(repo.path(), "round_trip")
    );
    let raw = std::fs::read_to_string(&report.summary_path)?;
    let reloaded: Summary = serde_json::from_str(&raw)?;

    assert_eq!(reloaded, report.summary);
    assert_eq!(reloaded.rows.len(), 3);
    assert_eq!(render_table(&reloaded.rows), render_table(&report.summary.rows));

    let value: serde_json::Value = serde_json::from_str(&raw)?;
    assert_eq!(value["args"]["connections"], "512,1024,2048");
    assert_eq!(value["args"]["duration"], 15);
    assert_eq!(value["args"]["label"], "round_trip");
    assert_eq!(value["rows"][2]["errors"], 1024 * 15);

    Ok(())
}

#[tokio::test]
async fn failed_first_trial_stops_everything() -> anyhow::Result<()> {
    init();
    let repo = tempfile::tempdir()?;
    let results = tempfile::tempdir()?;

    let runner = ScriptedRunner::new(results.path())
        .then(Scripted::Exit {
            code: 1,
            output: "gateway failed to start\n".to_string(),
        })
        .then(Scripted::Metrics(json!({ "requests_per_sec": 1.0 })));
    let mut step_load = StepLoad::new(config("first_fails", &[512, 1024]), runner);
    let report = run_step_load(&mut step_load, repo.path()).await?;

    assert!(report.summary.rows.is_empty());
    assert_eq!(step_load.runner().invocations().len(), 1);
    assert!(matches!(
        report.failure,
        Some(TrialFailure::RunnerExit { exit_code: 1, .. })
    ));

    // An empty summary is still written.
    let reloaded: Summary = serde_json::from_str(&std::fs::read_to_string(&report.summary_path)?)?;
    assert!(reloaded.rows.is_empty());
    assert_eq!(reloaded.args.label, "first_fails");

    Ok(())
}

#[tokio::test]
async fn missing_marker_keeps_partial_rows() -> anyhow::Result<()> {
    init();
    let repo = tempfile::tempdir()?;
    let results = tempfile::tempdir()?;

    let runner = ScriptedRunner::new(results.path())
        .then(Scripted::Metrics(json!({ "requests_per_sec": 200.0, "latency_avg_ms": 1.0 })))
        .then(Scripted::Silent)
        .then(Scripted::Metrics(json!({})));
    let mut step_load = StepLoad::new(config("partial", &[512, 1024, 2048]), runner);
    let report = run_step_load(&mut step_load, repo.path()).await?;

    assert_eq!(report.summary.rows.len(), 1);
    assert_eq!(report.summary.rows[0].p99_ms, 0.);
    assert!(matches!(
        report.failure,
        Some(TrialFailure::ResultsDirMissing { .. })
    ));
    assert_eq!(step_load.runner().invocations().len(), 2);

    let reloaded: Summary = serde_json::from_str(&std::fs::read_to_string(&report.summary_path)?)?;
    assert_eq!(reloaded.rows, report.summary.rows);

    Ok(())
}
