use crate::ConfigError;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings shared by every trial of a step-load run.
///
/// Serialized verbatim as the `args` object of the summary document, so the field order and
/// names follow the CLI flags.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialConfig {
    pub conf: PathBuf,
    pub url: String,
    pub threads: u32,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub duration: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub warmup: Duration,
    #[serde(with = "connection_list")]
    pub connections: Vec<NonZeroU32>,
    pub label: String,
}

impl TrialConfig {
    /// Label handed to the runner for the trial at `connections`.
    pub fn trial_label(&self, connections: NonZeroU32) -> String {
        format!("{}_c{connections}", self.label)
    }
}

/// Parse a comma-separated list of connection counts, preserving order.
///
/// Empty tokens are skipped, so `"512,,1024,"` yields two entries.
pub fn parse_connections(list: &str) -> Result<Vec<NonZeroU32>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<NonZeroU32>()
                .map_err(|_| ConfigError::InvalidConnections(token.to_string()))
        })
        .collect()
}

pub fn format_connections(connections: &[NonZeroU32]) -> String {
    connections
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Resolve `path` against `root` unless it is already absolute.
///
/// Relative paths are canonicalized when the target exists and joined lexically otherwise.
pub fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let joined = root.join(path);
    std::fs::canonicalize(&joined).unwrap_or(joined)
}

mod connection_list {
    use super::{format_connections, parse_connections};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::num::NonZeroU32;

    pub fn serialize<S: Serializer>(
        connections: &[NonZeroU32],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_connections(connections))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<NonZeroU32>, D::Error> {
        let list = String::deserialize(deserializer)?;
        parse_connections(&list).map_err(D::Error::custom)
    }
}
