pub const DEFAULT_CONF: &str = "bin/config/gateway_http";
pub const DEFAULT_URL: &str = "http://127.0.0.1:8080/ping";
pub const DEFAULT_THREADS: u32 = 8;
pub const DEFAULT_DURATION_SECS: u64 = 15;
pub const DEFAULT_WARMUP_SECS: u64 = 3;
pub const DEFAULT_CONNECTIONS: &str = "512,1024,2048,4096,8192,10240";
pub const DEFAULT_LABEL: &str = "step_load";

/// Runner script invoked once per trial, relative to the repo root.
pub const DEFAULT_RUNNER: &str = "tests/perf/http/run_gateway_http_wrk.py";
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Line prefix the runner prints once its results directory is complete.
pub const RESULTS_MARKER: &str = "[OK] results written to: ";

/// File the runner writes inside its results directory.
pub const METRICS_FILE: &str = "metrics.json";

/// Where summaries land, relative to the repo root.
pub const SUMMARY_DIR: &str = "tests/perf/results";
