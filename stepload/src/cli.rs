//! Command-line flags for the `stepload` binary.
use crate::runner::ProcessRunner;
use clap::Parser;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use stepload_core::{
    parse_connections, resolve_path, ConfigError, TrialConfig, DEFAULT_CONF,
    DEFAULT_CONNECTIONS, DEFAULT_DURATION_SECS, DEFAULT_INTERPRETER, DEFAULT_LABEL,
    DEFAULT_RUNNER, DEFAULT_THREADS, DEFAULT_URL, DEFAULT_WARMUP_SECS,
};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Run an HTTP load generator at increasing connection counts and summarize the results."
)]
pub struct StepLoadCli {
    /// Gateway config path, relative to the repo root unless absolute.
    #[arg(long, default_value = DEFAULT_CONF)]
    conf: PathBuf,

    #[arg(long, default_value = DEFAULT_URL)]
    url: String,

    #[arg(long, default_value_t = DEFAULT_THREADS)]
    threads: u32,

    /// Seconds per trial.
    #[arg(long, default_value_t = DEFAULT_DURATION_SECS)]
    duration: u64,

    /// Warm-up seconds before each trial is measured.
    #[arg(long, default_value_t = DEFAULT_WARMUP_SECS)]
    warmup: u64,

    /// Comma-separated connection counts, run in the given order.
    #[arg(long, default_value = DEFAULT_CONNECTIONS)]
    connections: ConnectionList,

    /// Prefix for trial labels and the summary file name.
    #[arg(long, default_value = DEFAULT_LABEL)]
    label: String,

    /// Root that relative paths and the summary location are resolved against.
    #[arg(long, default_value = ".")]
    repo_root: PathBuf,

    /// Runner invoked once per trial.
    #[arg(long, default_value = DEFAULT_RUNNER)]
    runner: PathBuf,

    /// Program used to launch the runner; pass an empty string to execute it directly.
    #[arg(long, default_value = DEFAULT_INTERPRETER)]
    interpreter: String,
}

#[derive(Clone, Debug)]
struct ConnectionList(Vec<NonZeroU32>);

impl FromStr for ConnectionList {
    type Err = ConfigError;

    fn from_str(list: &str) -> Result<Self, Self::Err> {
        parse_connections(list).map(ConnectionList)
    }
}

/// Resolved configuration ready to hand to the driver.
#[derive(Debug)]
pub struct Setup {
    pub config: TrialConfig,
    pub runner: ProcessRunner,
    pub repo_root: PathBuf,
}

impl StepLoadCli {
    pub fn into_setup(self) -> Setup {
        let repo_root = std::fs::canonicalize(&self.repo_root).unwrap_or(self.repo_root);

        let config = TrialConfig {
            conf: resolve_path(&repo_root, &self.conf),
            url: self.url,
            threads: self.threads,
            duration: Duration::from_secs(self.duration),
            warmup: Duration::from_secs(self.warmup),
            connections: self.connections.0,
            label: self.label,
        };
        let runner = ProcessRunner::new(resolve_path(&repo_root, &self.runner))
            .interpreter(self.interpreter);

        Setup {
            config,
            runner,
            repo_root,
        }
    }
}
