use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{JobRecord, MetricRow, MetricsByJob};
use crate::services::synthetic::{with_synthetic_jobs, MIN_COMPARE_JOBS};

const METRIC_PREFIX: &str = "nersc_ldms_dcgm_";
const DEFAULT_METRIC_HINT: &str = "power_usage";
const UNKNOWN_PROJECT: &str = "Unknown";

pub const TRACE_COLORS: [&str; 6] = [
    "#3b82f6", "#10b981", "#f59e0b", "#8b5cf6", "#ec4899", "#ef4444",
];

/// One job's metric over normalized time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTrace {
    pub job_id: String,
    pub name: String,
    pub color: String,
    /// Percent of the job's duration, rounded to whole numbers.
    pub x: Vec<f64>,
    pub y: Vec<Option<f64>>,
}

/// Summary statistics of a metric for one job.
///
/// `avg` repeats `mean`; the table shows both columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub job_id: String,
    pub mean: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonData {
    pub metric: String,
    pub display_name: String,
    pub jobs: Vec<String>,
    pub traces: Vec<ComparisonTrace>,
    pub summaries: Vec<JobSummary>,
}

/// Metric name as shown to users: `nersc_ldms_dcgm_power_usage` → `power usage`.
pub fn format_metric_name(metric: &str) -> String {
    metric.replacen(METRIC_PREFIX, "", 1).replace('_', " ")
}

/// Trace of `metric` for a job, ordered by relative time.
///
/// Returns `None` when the job has no samples.
pub fn normalized_trace(
    job_id: &str,
    rows: &[MetricRow],
    metric: &str,
    color: &str,
) -> Option<ComparisonTrace> {
    if rows.is_empty() {
        return None;
    }

    let mut rows: Vec<&MetricRow> = rows.iter().collect();
    rows.sort_by(|a, b| a.relative_time.total_cmp(&b.relative_time));

    let max_time = rows.iter().map(|r| r.relative_time).fold(1.0, f64::max);
    Some(ComparisonTrace {
        job_id: job_id.to_string(),
        name: format!("Job {}", job_id),
        color: color.to_string(),
        x: rows
            .iter()
            .map(|r| round_half_up(r.relative_time / max_time * 100.0))
            .collect(),
        y: rows.iter().map(|r| r.metric(metric)).collect(),
    })
}

/// Nearest integer, with halves going toward positive infinity.
pub(crate) fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Mean, min and max over the numeric samples of `metric`; all zero when
/// there are none.
pub fn summarize_metric(job_id: &str, rows: &[MetricRow], metric: &str) -> JobSummary {
    let values: Vec<f64> = rows.iter().filter_map(|r| r.metric(metric)).collect();

    if values.is_empty() {
        return JobSummary {
            job_id: job_id.to_string(),
            mean: 0.0,
            avg: 0.0,
            min: 0.0,
            max: 0.0,
        };
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    JobSummary {
        job_id: job_id.to_string(),
        mean,
        avg: mean,
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}

/// Align the selected jobs on a common time axis and summarize `metric`.
///
/// Jobs without samples produce no trace but still get a (zero) summary row.
pub fn compare_jobs(metrics: &MetricsByJob, job_ids: &[String], metric: &str) -> ComparisonData {
    if metric.is_empty() {
        return ComparisonData {
            metric: String::new(),
            display_name: String::new(),
            jobs: job_ids.to_vec(),
            traces: Vec::new(),
            summaries: Vec::new(),
        };
    }

    let traces = job_ids
        .iter()
        .enumerate()
        .filter_map(|(index, id)| {
            normalized_trace(id, metrics.rows(id), metric, TRACE_COLORS[index % TRACE_COLORS.len()])
        })
        .collect();

    let summaries = job_ids
        .iter()
        .map(|id| summarize_metric(id, metrics.rows(id), metric))
        .collect();

    ComparisonData {
        metric: metric.to_string(),
        display_name: format_metric_name(metric),
        jobs: job_ids.to_vec(),
        traces,
        summaries,
    }
}

/// Metric names split by subsystem. A name can land in more than one group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricGroups {
    pub gpu: Vec<String>,
    pub cpu: Vec<String>,
    pub network: Vec<String>,
    pub other: Vec<String>,
}

impl MetricGroups {
    pub fn classify(metrics: &[String]) -> Self {
        let mut groups = Self::default();
        for metric in metrics {
            let gpu = metric.contains("gpu") || metric.contains("sm_") || metric.contains("tensor");
            let cpu = metric.contains("cpu");
            let network = metric.contains("network") || metric.contains("net");

            if gpu {
                groups.gpu.push(metric.clone());
            }
            if cpu {
                groups.cpu.push(metric.clone());
            }
            if network {
                groups.network.push(metric.clone());
            }
            if !(gpu || cpu || network) {
                groups.other.push(metric.clone());
            }
        }
        groups
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricOption {
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOption {
    pub id: String,
    pub label: String,
    pub project: String,
}

/// Choices offered by the comparison page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCatalog {
    pub metrics: Vec<MetricOption>,
    pub groups: MetricGroups,
    pub default_metric: Option<String>,
    pub jobs: Vec<JobOption>,
    pub default_jobs: Vec<String>,
}

/// First metric mentioning power usage, else the first metric.
pub fn default_metric(metrics: &[String]) -> Option<String> {
    metrics
        .iter()
        .find(|m| m.contains(DEFAULT_METRIC_HINT))
        .or_else(|| metrics.first())
        .cloned()
}

/// Build the catalog from the padded job set.
pub fn metric_catalog(metrics: &MetricsByJob, user_jobs: &[JobRecord]) -> MetricCatalog {
    let names = metrics.metric_names();

    let projects: HashMap<String, &str> = user_jobs
        .iter()
        .map(|job| (job.id_string(), job.project.as_str()))
        .collect();

    let jobs: Vec<JobOption> = metrics
        .ordered_job_ids()
        .into_iter()
        .map(|id| JobOption {
            id: id.to_string(),
            label: format!("Job ID {}", id),
            project: projects
                .get(id)
                .copied()
                .filter(|p| !p.is_empty())
                .unwrap_or(UNKNOWN_PROJECT)
                .to_string(),
        })
        .collect();

    MetricCatalog {
        metrics: names
            .iter()
            .map(|name| MetricOption {
                name: name.clone(),
                display_name: format_metric_name(name),
            })
            .collect(),
        groups: MetricGroups::classify(&names),
        default_metric: default_metric(&names),
        default_jobs: jobs.iter().take(MIN_COMPARE_JOBS).map(|j| j.id.clone()).collect(),
        jobs,
    }
}

/// Comparison page data: pads the job set with synthetic clones, then fills
/// in the default metric and job selection where none was requested.
pub fn build_comparison(
    metrics: &MetricsByJob,
    job_ids: Option<&[String]>,
    metric: Option<&str>,
) -> ComparisonData {
    let padded = with_synthetic_jobs(metrics, MIN_COMPARE_JOBS);

    let metric = match metric {
        Some(m) => m.to_string(),
        None => default_metric(&padded.metric_names()).unwrap_or_default(),
    };

    let job_ids: Vec<String> = match job_ids {
        Some(ids) => ids.to_vec(),
        None => padded
            .ordered_job_ids()
            .into_iter()
            .take(MIN_COMPARE_JOBS)
            .map(str::to_string)
            .collect(),
    };

    compare_jobs(&padded, &job_ids, &metric)
}

/// Catalog over the padded job set, matching what [`build_comparison`] sees.
pub fn build_catalog(metrics: &MetricsByJob, user_jobs: &[JobRecord]) -> MetricCatalog {
    metric_catalog(&with_synthetic_jobs(metrics, MIN_COMPARE_JOBS), user_jobs)
}
