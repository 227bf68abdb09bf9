//! Console table and JSON summary output.
use crate::error::ReportError;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use stepload_core::{Summary, TrialRow, SUMMARY_DIR};
#[allow(unused)]
use tracing::{debug, info};

const TABLE_WIDTH: usize = 100;

/// Format `value` with `digits` decimals, or `-` when it is missing or not finite.
pub fn fmt(value: Option<f64>, digits: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.digits$}"),
        _ => "-".to_string(),
    }
}

pub fn progress_line(row: &TrialRow) -> String {
    format!(
        "[OK] qps={} avg={}ms p99={}ms errors={} error_rate={}%",
        fmt(Some(row.qps), 2),
        fmt(Some(row.avg_ms), 2),
        fmt(Some(row.p99_ms), 2),
        row.errors,
        fmt(Some(row.error_rate * 100.), 2),
    )
}

/// Fixed-width table of every row, framed by rules, one line per trial.
pub fn render_table(rows: &[TrialRow]) -> String {
    let heavy = "=".repeat(TABLE_WIDTH);
    let light = "-".repeat(TABLE_WIDTH);

    let mut table = String::new();
    let _ = writeln!(table, "\n{heavy}");
    let _ = writeln!(
        table,
        "{:>6}  {:>10}  {:>10}  {:>10}  {:>10}  {:>8}",
        "Conn", "QPS", "Avg(ms)", "P99(ms)", "Errors", "Err%"
    );
    let _ = writeln!(table, "{light}");
    for row in rows {
        let _ = writeln!(
            table,
            "{:>6}  {:>10.2}  {:>10.2}  {:>10.2}  {:>10}  {:>7.2}%",
            row.connections,
            row.qps,
            row.avg_ms,
            row.p99_ms,
            row.errors,
            row.error_rate * 100.
        );
    }
    let _ = writeln!(table, "{heavy}");
    table
}

pub fn summary_path(repo_root: &Path, label: &str) -> PathBuf {
    repo_root
        .join(SUMMARY_DIR)
        .join(format!("{label}_summary.json"))
}

/// Write `summary` as pretty JSON to its [`summary_path`], creating the directory if needed.
pub async fn write_summary(repo_root: &Path, summary: &Summary) -> Result<PathBuf, ReportError> {
    let path = summary_path(repo_root, &summary.args.label);
    let json = serde_json::to_string_pretty(summary)?;

    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await.map_err(|source| ReportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    tokio::fs::write(&path, json).await.map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;

    debug!(rows = summary.rows.len(), "Summary written to {}", path.display());
    Ok(path)
}
