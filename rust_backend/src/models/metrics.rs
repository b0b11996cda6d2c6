//! Per-job telemetry as found in the metrics fixture.
//!
//! The fixture maps job-ID strings to arrays of sample objects. Every sample
//! carries the two metadata keys below; all other keys are metric names whose
//! values are usually numbers but may be `null` or, occasionally, strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const JOB_ID_KEY: &str = "Job ID";
pub const RELATIVE_TIME_KEY: &str = "Floored Relative Time";

pub const GPU_UTILIZATION: &str = "nersc_ldms_dcgm_gpu_utilization";
pub const DRAM_ACTIVE: &str = "nersc_ldms_dcgm_dram_active";
pub const POWER_USAGE: &str = "nersc_ldms_dcgm_power_usage";

/// One telemetry sample for a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    #[serde(rename = "Job ID", deserialize_with = "super::job::deserialize_job_id")]
    pub job_id: i64,
    #[serde(rename = "Floored Relative Time")]
    pub relative_time: f64,
    /// Metric name → raw value, in payload order.
    #[serde(flatten)]
    pub metrics: Map<String, Value>,
}

impl MetricRow {
    pub fn new(job_id: i64, relative_time: f64) -> Self {
        Self {
            job_id,
            relative_time,
            metrics: Map::new(),
        }
    }

    /// Builder-style helper used by fixtures and tests.
    pub fn with_metric(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.metrics.insert(name.to_string(), value.into());
        self
    }

    /// Numeric value of a metric; `None` for missing, null or non-numeric.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).and_then(Value::as_f64)
    }

    /// Metric value with missing samples read as zero.
    pub fn metric_or_zero(&self, name: &str) -> f64 {
        self.metric(name).unwrap_or(0.0)
    }

    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(String::as_str)
    }
}

/// A point of a single (job, metric) series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub timestamp: f64,
    pub value: Option<f64>,
}

/// Time-sorted series for one metric of one job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub points: Vec<MetricPoint>,
}

impl MetricSeries {
    /// Extract `metric` from `rows`, sorted by relative time.
    ///
    /// The sort is stable so samples sharing a timestamp keep payload order.
    pub fn from_rows(rows: &[MetricRow], metric: &str) -> Self {
        let mut points: Vec<MetricPoint> = rows
            .iter()
            .map(|row| MetricPoint {
                timestamp: row.relative_time,
                value: row.metric(metric),
            })
            .collect();
        points.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn timestamps(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Numeric values only, skipping gaps.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.points.iter().filter_map(|p| p.value).collect()
    }
}

/// Telemetry for every job in the fixture, keyed by job-ID string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsByJob {
    pub jobs: BTreeMap<String, Vec<MetricRow>>,
}

impl MetricsByJob {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, job_id: impl Into<String>, rows: Vec<MetricRow>) {
        self.jobs.insert(job_id.into(), rows);
    }

    pub fn get(&self, job_id: &str) -> Option<&[MetricRow]> {
        self.jobs.get(job_id).map(Vec::as_slice)
    }

    /// Rows of a job, or an empty slice for unknown jobs.
    pub fn rows(&self, job_id: &str) -> &[MetricRow] {
        self.get(job_id).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Job IDs in display order: numeric IDs ascending, then the rest
    /// lexicographically.
    pub fn ordered_job_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.jobs.keys().map(String::as_str).collect();
        ids.sort_by(|a, b| match (a.parse::<i64>(), b.parse::<i64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => a.cmp(b),
        });
        ids
    }

    /// Largest numeric job ID, if any.
    pub fn max_numeric_id(&self) -> Option<i64> {
        self.jobs.keys().filter_map(|id| id.parse::<i64>().ok()).max()
    }

    /// Metric names taken from the first sample of the first job.
    pub fn metric_names(&self) -> Vec<String> {
        self.ordered_job_ids()
            .first()
            .and_then(|id| self.rows(id).first())
            .map(|row| row.metric_names().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_row_deserialize_keeps_order() {
        let json = r#"{"Job ID": 7, "Floored Relative Time": 30, "zeta": 1.5, "alpha": null, "label": "x"}"#;
        let row: MetricRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.job_id, 7);
        assert_eq!(row.relative_time, 30.0);
        assert_eq!(row.metric_names().collect::<Vec<_>>(), vec!["zeta", "alpha", "label"]);
        assert_eq!(row.metric("zeta"), Some(1.5));
        assert_eq!(row.metric("alpha"), None);
        assert_eq!(row.metric("label"), None);
        assert_eq!(row.metric_or_zero("missing"), 0.0);
    }

    #[test]
    fn test_series_sorted_by_time() {
        let rows = vec![
            MetricRow::new(1, 20.0).with_metric("m", 2.0),
            MetricRow::new(1, 0.0).with_metric("m", 0.0),
            MetricRow::new(1, 10.0).with_metric("m", Value::Null),
        ];
        let series = MetricSeries::from_rows(&rows, "m");
        assert_eq!(series.timestamps(), vec![0.0, 10.0, 20.0]);
        assert_eq!(series.values(), vec![Some(0.0), None, Some(2.0)]);
        assert_eq!(series.numeric_values(), vec![0.0, 2.0]);
    }

    #[test]
    fn test_ordered_job_ids() {
        let mut metrics = MetricsByJob::new();
        for id in ["100", "9", "abc", "20"] {
            metrics.insert(id, vec![]);
        }
        assert_eq!(metrics.ordered_job_ids(), vec!["9", "20", "100", "abc"]);
        assert_eq!(metrics.max_numeric_id(), Some(100));
    }

    #[test]
    fn test_metric_names_from_first_job() {
        let mut metrics = MetricsByJob::new();
        metrics.insert(
            "2",
            vec![MetricRow::new(2, 0.0).with_metric("b", 1.0).with_metric("a", 2.0)],
        );
        metrics.insert("10", vec![MetricRow::new(10, 0.0).with_metric("z", 1.0)]);
        assert_eq!(metrics.metric_names(), vec!["b", "a"]);
        assert!(MetricsByJob::new().metric_names().is_empty());
    }
}
