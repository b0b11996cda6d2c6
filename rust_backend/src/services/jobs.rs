use serde::{Deserialize, Serialize};

use crate::models::{JobRecord, MetricRow, MetricSeries, GPU_UTILIZATION, POWER_USAGE};
use crate::services::compare::format_metric_name;
use crate::services::synthetic::clamp_percent;

const HIGH_ENERGY_JOULES: f64 = 1400.0;
const WARNING_ENERGY_JOULES: f64 = 1100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyStatus {
    High,
    Warning,
    Medium,
}

pub fn energy_status(joules: f64) -> EnergyStatus {
    if joules > HIGH_ENERGY_JOULES {
        EnergyStatus::High
    } else if joules > WARNING_ENERGY_JOULES {
        EnergyStatus::Warning
    } else {
        EnergyStatus::Medium
    }
}

/// One line of the job listing grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListingRow {
    pub id: String,
    pub job_id: i64,
    pub start_time: String,
    pub end_time: String,
    pub project_id: String,
    pub user: String,
    pub qos: String,
    pub charged_node_hours: f64,
    /// Mean GPU utilization in percent, when the job has samples for it.
    pub avg_gpu_utilization: Option<f64>,
    /// Energy in joules, when the job has power samples.
    pub energy_consumed: Option<f64>,
    pub energy_status: Option<EnergyStatus>,
}

/// Mean GPU utilization over the job's numeric samples, clamped to `[0, 100]`.
pub fn average_gpu_utilization(rows: &[MetricRow]) -> Option<f64> {
    let values: Vec<f64> = rows.iter().filter_map(|r| r.metric(GPU_UTILIZATION)).collect();
    if values.is_empty() {
        return None;
    }
    Some(clamp_percent(values.iter().sum::<f64>() / values.len() as f64))
}

/// Trapezoid integral of power usage (W) over relative time (s).
///
/// Samples without a power reading are skipped. A single sample spans no
/// time and integrates to zero.
pub fn energy_consumed(rows: &[MetricRow]) -> Option<f64> {
    let series = MetricSeries::from_rows(rows, POWER_USAGE);
    let points: Vec<(f64, f64)> = series
        .points
        .iter()
        .filter_map(|p| p.value.map(|v| (p.timestamp, v)))
        .collect();

    if points.is_empty() {
        return None;
    }

    Some(
        points
            .windows(2)
            .map(|pair| (pair[1].0 - pair[0].0) * (pair[0].1 + pair[1].1) / 2.0)
            .sum(),
    )
}

pub fn listing_row(record: &JobRecord, rows: &[MetricRow]) -> JobListingRow {
    let energy = energy_consumed(rows);
    JobListingRow {
        id: record.id_string(),
        job_id: record.job_id,
        start_time: record.start_time.clone(),
        end_time: record.end_time.clone(),
        project_id: record.project.clone(),
        user: record.user.clone(),
        qos: record.qos.clone(),
        charged_node_hours: record.charged_node_hours,
        avg_gpu_utilization: average_gpu_utilization(rows),
        energy_consumed: energy,
        energy_status: energy.map(energy_status),
    }
}

/// Listing rows in the order of the job fixture.
pub fn build_job_listing<'a, F>(records: &[JobRecord], rows_for: F) -> Vec<JobListingRow>
where
    F: Fn(&str) -> &'a [MetricRow],
{
    records
        .iter()
        .map(|record| listing_row(record, rows_for(&record.id_string())))
        .collect()
}

/// In-page anchor of a metric section.
pub fn metric_anchor_id(metric: &str) -> String {
    let slug: String = metric
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("metric-{}", slug)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSection {
    pub metric: String,
    pub anchor_id: String,
    pub display_name: String,
    pub series: MetricSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMetricsView {
    pub job_id: String,
    pub has_data: bool,
    pub sections: Vec<MetricSection>,
}

/// One section per metric of the job's first sample, in payload order.
pub fn job_metric_sections(job_id: &str, rows: &[MetricRow]) -> JobMetricsView {
    let sections: Vec<MetricSection> = rows
        .first()
        .map(|first| {
            first
                .metric_names()
                .map(|metric| MetricSection {
                    metric: metric.to_string(),
                    anchor_id: metric_anchor_id(metric),
                    display_name: format_metric_name(metric),
                    series: MetricSeries::from_rows(rows, metric),
                })
                .collect()
        })
        .unwrap_or_default();

    JobMetricsView {
        job_id: job_id.to_string(),
        has_data: !sections.is_empty(),
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetricsByJob;
    use serde_json::Value;

    fn rows() -> Vec<MetricRow> {
        vec![
            MetricRow::new(7, 10.0)
                .with_metric(GPU_UTILIZATION, 60.0)
                .with_metric(POWER_USAGE, 30.0),
            MetricRow::new(7, 0.0)
                .with_metric(GPU_UTILIZATION, 40.0)
                .with_metric(POWER_USAGE, 10.0),
            MetricRow::new(7, 20.0)
                .with_metric(GPU_UTILIZATION, Value::Null)
                .with_metric(POWER_USAGE, 50.0),
        ]
    }

    #[test]
    fn test_energy_status_thresholds() {
        assert_eq!(energy_status(1400.5), EnergyStatus::High);
        assert_eq!(energy_status(1400.0), EnergyStatus::Warning);
        assert_eq!(energy_status(1100.0), EnergyStatus::Medium);
        assert_eq!(energy_status(0.0), EnergyStatus::Medium);
    }

    #[test]
    fn test_energy_trapezoid() {
        // (10 + 30) / 2 * 10 + (30 + 50) / 2 * 10
        assert_eq!(energy_consumed(&rows()), Some(600.0));
        assert_eq!(energy_consumed(&rows()[..1]), Some(0.0));
        assert_eq!(energy_consumed(&[MetricRow::new(7, 0.0)]), None);
    }

    #[test]
    fn test_average_gpu_skips_nulls() {
        assert_eq!(average_gpu_utilization(&rows()), Some(50.0));
        assert_eq!(average_gpu_utilization(&[]), None);
    }

    #[test]
    fn test_listing() {
        let mut metrics = MetricsByJob::new();
        metrics.insert("7", rows());
        let mut record = JobRecord::new(7);
        record.project = "m1".into();
        let listing = build_job_listing(&[record, JobRecord::new(8)], |id| metrics.rows(id));

        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].id, "7");
        assert_eq!(listing[0].project_id, "m1");
        assert_eq!(listing[0].energy_status, Some(EnergyStatus::Medium));
        assert_eq!(listing[1].avg_gpu_utilization, None);
        assert_eq!(listing[1].energy_status, None);
    }

    #[test]
    fn test_metric_anchor_id() {
        assert_eq!(
            metric_anchor_id("nersc_ldms_dcgm_power_usage"),
            "metric-nersc_ldms_dcgm_power_usage"
        );
        assert_eq!(metric_anchor_id("mem used (GB)"), "metric-mem-used--GB-");
    }

    #[test]
    fn test_sections_sorted_and_named() {
        let view = job_metric_sections("7", &rows());
        assert!(view.has_data);
        assert_eq!(view.sections.len(), 2);
        assert_eq!(view.sections[0].metric, GPU_UTILIZATION);
        assert_eq!(view.sections[0].display_name, "gpu utilization");
        assert_eq!(view.sections[1].series.timestamps(), vec![0.0, 10.0, 20.0]);
        assert_eq!(view.sections[0].series.values(), vec![Some(40.0), Some(60.0), None]);

        let empty = job_metric_sections("9", &[]);
        assert!(!empty.has_data);
    }
}
