use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid connection count `{0}`: expected a positive integer")]
    InvalidConnections(String),
}

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Metrics document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Metrics document must be a JSON object")]
    NotAnObject,
}
