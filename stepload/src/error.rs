use std::path::PathBuf;
use stepload_core::MetricsError;
use thiserror::Error;

/// Reasons a trial ends the run early.
///
/// `Display` renders the text that follows the `[FAIL]` marker on the console.
#[derive(Debug, Error)]
pub enum TrialFailure {
    #[error("runner exit={exit_code}")]
    RunnerExit { exit_code: i32, output: String },

    #[error("cannot locate results dir")]
    ResultsDirMissing { output: String },

    #[error("cannot start runner: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("cannot read {}: {source}", .path.display())]
    MetricsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {}: {source}", .path.display())]
    Metrics {
        path: PathBuf,
        #[source]
        source: MetricsError,
    },
}

impl TrialFailure {
    /// Captured runner output, when the runner got far enough to produce any.
    pub fn output(&self) -> Option<&str> {
        match self {
            TrialFailure::RunnerExit { output, .. } | TrialFailure::ResultsDirMissing { output } => {
                Some(output)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Error writing summary to {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error serializing summary: {0}")]
    Json(#[from] serde_json::Error),
}
