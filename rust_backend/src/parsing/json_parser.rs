use anyhow::{Context, Result};
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::models::{JobRecord, MetricsByJob, RawTable};

/// Queue wait-time payload as returned by the center's REST API.
///
/// `wait` and `jobs` hold `[x, y, value]` rows for the two heatmaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueWaitTimesPayload {
    #[serde(default)]
    pub wait: Vec<Vec<f64>>,
    #[serde(default)]
    pub jobs: Vec<Vec<f64>>,
    #[serde(default)]
    pub wait_table: Option<RawTable>,
    #[serde(default)]
    pub jobs_table: Option<RawTable>,
}

impl QueueWaitTimesPayload {
    /// Build a payload field by field, replacing any malformed field with its
    /// default instead of rejecting the whole document.
    pub fn from_value(value: &Value) -> Self {
        Self {
            wait: lenient_field(value, "wait"),
            jobs: lenient_field(value, "jobs"),
            wait_table: lenient_field(value, "wait_table"),
            jobs_table: lenient_field(value, "jobs_table"),
        }
    }
}

fn lenient_field<T: DeserializeOwned + Default>(value: &Value, key: &str) -> T {
    match value.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(field) => serde_json::from_value(field.clone()).unwrap_or_else(|e| {
            warn!("Ignoring malformed '{}' field in queue payload: {}", key, e);
            T::default()
        }),
    }
}

/// Parse a queue wait-time payload from JSON text.
///
/// Only invalid JSON is an error; missing or malformed fields degrade to
/// empty data.
pub fn parse_queue_payload_str(json_str: &str) -> Result<QueueWaitTimesPayload> {
    let value: Value =
        serde_json::from_str(json_str).context("Queue payload is not valid JSON")?;
    Ok(QueueWaitTimesPayload::from_value(&value))
}

/// Parse the per-job metrics fixture from JSON text.
pub fn parse_metrics_json_str(json_str: &str) -> Result<MetricsByJob> {
    let deserializer = &mut serde_json::Deserializer::from_str(json_str);
    serde_path_to_error::deserialize(deserializer).map_err(|e| {
        anyhow::anyhow!("Failed to parse metrics JSON at '{}': {}", e.path(), e.inner())
    })
}

/// Read and parse the per-job metrics fixture.
pub fn parse_metrics_json(json_path: &Path) -> Result<MetricsByJob> {
    let text = std::fs::read_to_string(json_path)
        .with_context(|| format!("Failed to read metrics file {}", json_path.display()))?;
    parse_metrics_json_str(&text)
}

/// Parse the job listing fixture from JSON text.
pub fn parse_user_jobs_json_str(json_str: &str) -> Result<Vec<JobRecord>> {
    let deserializer = &mut serde_json::Deserializer::from_str(json_str);
    serde_path_to_error::deserialize(deserializer).map_err(|e| {
        anyhow::anyhow!("Failed to parse job listing at '{}': {}", e.path(), e.inner())
    })
}

/// Read and parse the job listing fixture.
pub fn parse_user_jobs_json(json_path: &Path) -> Result<Vec<JobRecord>> {
    let text = std::fs::read_to_string(json_path)
        .with_context(|| format!("Failed to read job listing {}", json_path.display()))?;
    parse_user_jobs_json_str(&text)
}
