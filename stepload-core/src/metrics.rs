use crate::MetricsError;
use serde_json::Value;

/// The handful of fields read from a runner's `metrics.json`.
///
/// The runner's schema is much larger; everything not listed here is ignored. Missing, `null` or
/// non-numeric fields read as zero so a sparse metrics file never aborts a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunnerMetrics {
    pub requests_per_sec: f64,
    pub latency_avg_ms: f64,
    pub latency_p99_ms: f64,
    pub error_count: u64,
}

impl RunnerMetrics {
    pub fn from_json_str(raw: &str) -> Result<Self, MetricsError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, MetricsError> {
        let doc = value.as_object().ok_or(MetricsError::NotAnObject)?;

        let p99 = doc
            .get("latency_distribution_ms")
            .and_then(|dist| dist.get("99"));

        Ok(Self {
            requests_per_sec: float_or_zero(doc.get("requests_per_sec")),
            latency_avg_ms: float_or_zero(doc.get("latency_avg_ms")),
            latency_p99_ms: float_or_zero(p99),
            error_count: count_or_zero(doc.get("error_count")),
        })
    }
}

fn float_or_zero(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.),
        _ => 0.,
    }
}

fn count_or_zero(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
