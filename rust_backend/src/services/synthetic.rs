//! Deterministic stand-ins for telemetry the data sources do not carry yet.
//!
//! The metrics fixture only has job-level samples, so the per-node tables,
//! the extra comparison jobs, the component power draw and the roofline
//! kernel cloud are all generated here from fixed formulas. Everything is a
//! pure function of its inputs and indices; the same request always yields
//! the same numbers. Once real per-node telemetry exists, only this module
//! needs to change.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Aggregation, MetricRow, MetricsByJob, Panel};

pub const NODE_COUNT: usize = 12;
const FIRST_NODE_NUMBER: usize = 8670;

pub const NODE_MARKERS: [&str; 6] = [
    "circle",
    "square",
    "diamond",
    "triangle-up",
    "triangle-down",
    "cross",
];

pub const NODE_COLORS: [&str; 12] = [
    "#1f77b4", "#2ca02c", "#ff7f0e", "#9467bd", "#d62728", "#17becf", "#8c564b", "#e377c2",
    "#7f7f7f", "#bcbd22", "#393b79", "#637939",
];

/// Length of every generated baseline series.
pub const FALLBACK_POINTS: usize = 50;

/// The comparison page is padded with cloned jobs up to this many.
pub const MIN_COMPARE_JOBS: usize = 6;
const SYNTHETIC_ID_BASE: i64 = 100_000;

pub fn clamp_percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

pub fn non_negative(value: f64) -> f64 {
    value.max(0.0)
}

/// Pseudo-random value in `[0, 1)` derived from `seed`.
pub fn unit_noise(seed: f64) -> f64 {
    let s = (seed * 12.9898).sin() * 43_758.545_3;
    (s - s.floor()).min(1.0 - f64::EPSILON)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Value range of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    /// `[0, 100]`
    Percent,
    /// `[0, ∞)`
    Bandwidth,
}

impl Scale {
    pub fn bound(self, value: f64) -> f64 {
        match self {
            Scale::Percent => clamp_percent(value),
            Scale::Bandwidth => non_negative(value),
        }
    }
}

/// One channel of a synthetic node (e.g. the CPU half of a utilization row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeChannel {
    pub label: String,
    pub series: Vec<f64>,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl NodeChannel {
    /// Statistic shown in the node table for `aggregation`.
    pub fn statistic(&self, aggregation: Aggregation) -> f64 {
        match aggregation {
            Aggregation::Max => self.max,
            Aggregation::Min => self.min,
            Aggregation::Mean | Aggregation::All => self.mean,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRow {
    pub node: String,
    pub color: String,
    pub symbol: String,
    pub time: Vec<f64>,
    pub channels: [NodeChannel; 2],
}

pub fn node_id(index: usize) -> String {
    format!("nid{:06}", FIRST_NODE_NUMBER + index)
}

pub fn node_color(index: usize) -> &'static str {
    NODE_COLORS[index % NODE_COLORS.len()]
}

pub fn node_marker(index: usize) -> &'static str {
    NODE_MARKERS[index % NODE_MARKERS.len()]
}

/// Per-channel coefficients of the node expansion.
struct ChannelShape {
    series_factor: (f64, f64),
    amplitude: f64,
    period: f64,
    wave: fn(f64) -> f64,
    mean_factor: (f64, f64),
    min_ratio: f64,
    max_ratio: f64,
}

impl ChannelShape {
    fn expand(&self, scale: Scale, label: &str, values: &[f64], node: usize) -> NodeChannel {
        let n = node as f64;
        let factor = self.series_factor.0 + self.series_factor.1 * n;
        let series = values
            .iter()
            .enumerate()
            .map(|(k, v)| {
                scale.bound(v * factor + self.amplitude * (self.wave)(k as f64 / self.period + n))
            })
            .collect();

        let node_mean = scale.bound(mean(values) * (self.mean_factor.0 + self.mean_factor.1 * n));
        NodeChannel {
            label: label.to_string(),
            series,
            mean: node_mean,
            min: scale.bound(node_mean * self.min_ratio),
            max: scale.bound(node_mean * self.max_ratio),
        }
    }
}

const PERCENT_SHAPES: [ChannelShape; 2] = [
    ChannelShape {
        series_factor: (0.78, 0.018),
        amplitude: 2.0,
        period: 4.0,
        wave: f64::cos,
        mean_factor: (0.78, 0.02),
        min_ratio: 0.72,
        max_ratio: 1.24,
    },
    ChannelShape {
        series_factor: (0.82, 0.02),
        amplitude: 2.5,
        period: 5.0,
        wave: f64::sin,
        mean_factor: (0.82, 0.018),
        min_ratio: 0.74,
        max_ratio: 1.22,
    },
];

const BANDWIDTH_SHAPES: [ChannelShape; 2] = [
    ChannelShape {
        series_factor: (0.8, 0.02),
        amplitude: 2.0,
        period: 5.0,
        wave: f64::sin,
        mean_factor: (0.8, 0.02),
        min_ratio: 0.74,
        max_ratio: 1.22,
    },
    ChannelShape {
        series_factor: (0.82, 0.018),
        amplitude: 1.6,
        period: 6.0,
        wave: f64::cos,
        mean_factor: (0.82, 0.018),
        min_ratio: 0.76,
        max_ratio: 1.2,
    },
];

/// Spreads a job-level channel pair over [`NODE_COUNT`] synthetic nodes.
#[derive(Debug, Clone)]
pub struct SyntheticNodeExpander {
    scale: Scale,
    labels: [String; 2],
}

impl SyntheticNodeExpander {
    pub fn new(scale: Scale, labels: [&str; 2]) -> Self {
        Self {
            scale,
            labels: labels.map(str::to_string),
        }
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// One row per synthetic node, each sharing `time` with the job-level
    /// curves it was derived from.
    pub fn expand(&self, time: &[f64], primary: &[f64], secondary: &[f64]) -> Vec<NodeRow> {
        let shapes = match self.scale {
            Scale::Percent => &PERCENT_SHAPES,
            Scale::Bandwidth => &BANDWIDTH_SHAPES,
        };

        (0..NODE_COUNT)
            .map(|idx| NodeRow {
                node: node_id(idx),
                color: node_color(idx).to_string(),
                symbol: node_marker(idx).to_string(),
                time: time.to_vec(),
                channels: [
                    shapes[0].expand(self.scale, &self.labels[0], primary, idx),
                    shapes[1].expand(self.scale, &self.labels[1], secondary, idx),
                ],
            })
            .collect()
    }
}

/// Time axis of the generated baselines: `0, 2, 4, …`.
pub fn fallback_time_axis() -> Vec<f64> {
    (0..FALLBACK_POINTS).map(|i| i as f64 * 2.0).collect()
}

/// Baseline for the measured curve of a panel when the job has no samples.
pub fn fallback_reference(panel: Panel) -> Vec<f64> {
    fallback_time_axis()
        .into_iter()
        .enumerate()
        .map(|(i, t)| match panel {
            Panel::Utilization | Panel::GpuPerformance => {
                clamp_percent(30.0 + 20.0 * (t / 12.0).sin() + (i % 5) as f64 * 2.0)
            }
            Panel::Memory => clamp_percent(48.0 + 16.0 * (t / 10.0).sin() + (i % 4) as f64 * 1.8),
            Panel::Pcie => non_negative(32.0 + 10.0 * (t / 12.0).sin() + (i % 4) as f64 * 1.2),
            Panel::Network => non_negative(120.0 + 36.0 * (t / 9.0).sin() + (i % 4) as f64 * 6.0),
        })
        .collect()
}

/// Companion curve for [`fallback_reference`].
///
/// The GPU performance companion is the GPU memory baseline, which does not
/// depend on the utilization curve.
pub fn fallback_derived(panel: Panel, reference: &[f64]) -> Vec<f64> {
    let derive: fn(f64, f64) -> f64 = match panel {
        Panel::Utilization => |v, i| clamp_percent(v * 0.72 + 6.0 + 2.0 * (i / 3.0).cos()),
        Panel::Memory => |v, i| clamp_percent(v * 0.78 + 6.0 + 2.0 * (i / 3.0).cos()),
        Panel::Pcie => |v, i| non_negative(v * 0.82 + 2.5 * (i / 3.0).cos()),
        Panel::Network => |v, i| non_negative(v * 0.58 + 10.0 + 4.0 * (i / 4.0).cos()),
        Panel::GpuPerformance => return fallback_reference(Panel::Memory),
    };

    reference
        .iter()
        .enumerate()
        .map(|(i, &v)| derive(v, i as f64))
        .collect()
}

/// Power components as `(label, base watts, jitter span)`.
pub const POWER_COMPONENTS: [(&str, f64, f64); 4] = [
    ("CPU", 35.0, 10.0),
    ("GPU", 165.0, 10.0),
    ("Memory", 345.0, 15.0),
    ("Node", 240.0, 15.0),
];

/// Power draw of one component: `base` plus up to `span` watts of jitter.
pub fn power_baseline(component: usize, base: f64, span: f64) -> Vec<f64> {
    (0..FALLBACK_POINTS)
        .map(|i| base + unit_noise((component * 1000 + i + 1) as f64) * span)
        .collect()
}

/// Per-node power scaling applied to the component averages.
pub fn power_node_factor(node: usize) -> f64 {
    0.84 + node as f64 * 0.025
}

pub fn power_aggregation_factor(aggregation: Aggregation) -> f64 {
    match aggregation {
        Aggregation::Max => 1.16,
        Aggregation::Min => 0.82,
        Aggregation::Mean | Aggregation::All => 1.0,
    }
}

/// A cloud of kernels around `(center_x, center_y)`.
#[derive(Debug, Clone, Copy)]
pub struct KernelCluster {
    pub center_x: f64,
    pub center_y: f64,
    pub count: usize,
    pub x_spread: f64,
    pub y_spread: f64,
}

pub const KERNEL_CLUSTERS: [KernelCluster; 5] = [
    KernelCluster { center_x: 2.0, center_y: 15.0, count: 90, x_spread: 0.8, y_spread: 4.0 },
    KernelCluster { center_x: 2.8, center_y: 13.0, count: 60, x_spread: 0.6, y_spread: 3.5 },
    KernelCluster { center_x: 3.4, center_y: 14.0, count: 50, x_spread: 0.6, y_spread: 3.0 },
    KernelCluster { center_x: 4.2, center_y: 13.0, count: 30, x_spread: 0.45, y_spread: 2.8 },
    KernelCluster { center_x: 5.4, center_y: 12.0, count: 10, x_spread: 0.3, y_spread: 1.8 },
];

pub const ROOFLINE_MAX_INTENSITY: f64 = 10.0;
pub const ROOFLINE_MAX_PERFORMANCE: f64 = 25.0;

/// Kernel samples as `(operational intensity, GFLOPS)`, clamped to the plot.
pub fn roofline_kernels() -> Vec<(f64, f64)> {
    let mut seed = 0usize;
    let mut kernels = Vec::new();
    for cluster in &KERNEL_CLUSTERS {
        for _ in 0..cluster.count {
            let jitter_x = unit_noise((2 * seed + 1) as f64) - 0.5;
            let jitter_y = unit_noise((2 * seed + 2) as f64) - 0.5;
            seed += 1;
            kernels.push((
                (cluster.center_x + jitter_x * cluster.x_spread).clamp(0.0, ROOFLINE_MAX_INTENSITY),
                (cluster.center_y + jitter_y * cluster.y_spread).clamp(0.0, ROOFLINE_MAX_PERFORMANCE),
            ));
        }
    }
    kernels
}

/// Scale factor applied to row `row` of synthetic job `clone`.
pub fn clone_modifier(clone: usize, row: usize) -> f64 {
    let step = ((clone + 1) * 5 + row) % 9;
    1.0 + (step as f64 - 4.0) * 0.015
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn clone_row(row: &MetricRow, job_id: i64, modifier: f64) -> MetricRow {
    let metrics = row
        .metrics
        .iter()
        .map(|(name, value)| {
            let value = match value.as_f64() {
                Some(number) => Value::from(round3(number * modifier)),
                None => value.clone(),
            };
            (name.clone(), value)
        })
        .collect();

    MetricRow {
        job_id,
        relative_time: row.relative_time,
        metrics,
    }
}

/// Pad `metrics` with perturbed copies of its jobs until it holds at least
/// `min_jobs` entries.
///
/// Clone `j` copies the `j`-th job (cycling), takes the ID
/// `max numeric ID + j + 1` and scales every numeric metric by
/// [`clone_modifier`]. An empty input stays empty.
pub fn with_synthetic_jobs(metrics: &MetricsByJob, min_jobs: usize) -> MetricsByJob {
    let mut padded = metrics.clone();
    let sources: Vec<&str> = metrics.ordered_job_ids();
    if sources.is_empty() || sources.len() >= min_jobs {
        return padded;
    }

    let max_id = metrics.max_numeric_id().unwrap_or(SYNTHETIC_ID_BASE);
    for clone in 0..(min_jobs - sources.len()) {
        let source = metrics.rows(sources[clone % sources.len()]);
        let Some(job_id) = max_id.checked_add(clone as i64 + 1) else {
            warn!("No job IDs left above {} for synthetic jobs", max_id);
            break;
        };
        let rows = source
            .iter()
            .enumerate()
            .map(|(row_index, row)| clone_row(row, job_id, clone_modifier(clone, row_index)))
            .collect();
        padded.insert(job_id.to_string(), rows);
    }

    padded
}
