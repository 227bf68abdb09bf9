#[allow(unused)]
use utils::*;

#[cfg(unix)]
mod tests {
    use super::*;

    use std::path::{Path, PathBuf};
    use stepload::{run_step_load, ProcessRunner, StepLoad, TrialFailure};
    use stepload_core::Summary;

    /// A shell runner honouring the real flag contract. Exits 7 when asked for 2048 connections.
    fn write_runner(dir: &Path, results_root: &Path) -> PathBuf {
        let script = format!(
            r#"
while [ $# -gt 0 ]; do
  case "$1" in
    --label) label="$2"; shift 2 ;;
    --connections) conns="$2"; shift 2 ;;
    --kill-existing) shift ;;
    *) shift 2 ;;
  esac
done
echo "Running test @ $label" >&2
if [ "$conns" = "2048" ]; then
  echo "boom: address already in use" >&2
  exit 7
fi
out="{root}/$label"
mkdir -p "$out"
printf '{{"requests_per_sec": %s, "latency_avg_ms": 2.5, "latency_distribution_ms": {{"99": 9.5}}, "error_count": 0}}\n' "$conns" > "$out/metrics.json"
echo "[OK] results written to: $out"
"#,
            root = results_root.display()
        );
        let path = dir.join("runner.sh");
        std::fs::write(&path, script).expect("write runner script");
        path
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(30_000)]
    async fn drives_a_real_subprocess() {
        let repo = tempfile::tempdir().unwrap();
        let results = tempfile::tempdir().unwrap();
        let script = write_runner(repo.path(), results.path());

        let runner = ProcessRunner::new(script).interpreter("sh");
        let mut step_load = StepLoad::new(config("proc", &[512, 1024, 2048, 4096]), runner);
        let report = run_step_load(&mut step_load, repo.path()).await.unwrap();

        let qps: Vec<f64> = report.summary.rows.iter().map(|r| r.qps).collect();
        assert_eq!(qps, vec![512., 1024.]);
        assert!(report.summary.rows.iter().all(|r| r.p99_ms == 9.5));
        assert_eq!(
            report.summary.rows[0].results_dir,
            results.path().join("proc_c512")
        );

        match report.failure {
            Some(TrialFailure::RunnerExit { exit_code, output }) => {
                assert_eq!(exit_code, 7);
                assert!(output.contains("boom: address already in use"));
            }
            other => panic!("expected runner exit, got {other:?}"),
        }

        let reloaded: Summary =
            serde_json::from_str(&std::fs::read_to_string(&report.summary_path).unwrap())
                .unwrap();
        assert_eq!(reloaded.rows.len(), 2);
        assert!(logs_contain("Trial complete"));
    }
}
