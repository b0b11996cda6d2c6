use serde::{Deserialize, Serialize};

use crate::models::{MetricRow, Panel, PanelView, DRAM_ACTIVE, GPU_UTILIZATION};
use crate::services::synthetic::{
    clamp_percent, fallback_derived, fallback_reference, fallback_time_axis, non_negative, NodeRow,
    Scale, SyntheticNodeExpander,
};

const MIN_DRAM_PEAK: f64 = 1e-12;
const MIN_DURATION: f64 = 1.0;

/// What the x values of a panel mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeAxis {
    /// Seconds since job start.
    RelativeTime,
    /// `0..=100` across the job's duration.
    PercentOfDuration,
}

/// Static description of a panel's two channels.
#[derive(Debug, Clone, Copy)]
pub struct PanelLayout {
    pub scale: Scale,
    pub time_axis: TimeAxis,
    /// Legend names of the aggregate curves.
    pub labels: [&'static str; 2],
    /// Short names used in per-node traces.
    pub node_labels: [&'static str; 2],
    /// Which channel carries the measured reference curve.
    pub reference_channel: usize,
}

pub fn panel_layout(panel: Panel) -> PanelLayout {
    match panel {
        Panel::Utilization => PanelLayout {
            scale: Scale::Percent,
            time_axis: TimeAxis::RelativeTime,
            labels: ["CPU", "GPU"],
            node_labels: ["CPU", "GPU"],
            reference_channel: 1,
        },
        Panel::Memory => PanelLayout {
            scale: Scale::Percent,
            time_axis: TimeAxis::PercentOfDuration,
            labels: ["CPU Memory", "GPU Memory"],
            node_labels: ["CPU Memory", "GPU Memory"],
            reference_channel: 1,
        },
        Panel::Pcie => PanelLayout {
            scale: Scale::Bandwidth,
            time_axis: TimeAxis::PercentOfDuration,
            labels: ["PCIe Read", "PCIe Write"],
            node_labels: ["Read", "Write"],
            reference_channel: 0,
        },
        Panel::Network => PanelLayout {
            scale: Scale::Bandwidth,
            time_axis: TimeAxis::PercentOfDuration,
            labels: ["GPU Network (NVLink)", "Inter-Node Network (Slingshot)"],
            node_labels: ["NVLink", "Slingshot"],
            reference_channel: 0,
        },
        Panel::GpuPerformance => PanelLayout {
            scale: Scale::Percent,
            time_axis: TimeAxis::RelativeTime,
            labels: ["GPU Utilization", "GPU Memory"],
            node_labels: ["GPU Utilization", "GPU Memory"],
            reference_channel: 0,
        },
    }
}

/// Plot colors of the two GPU performance charts.
pub const GPU_COLOR: &str = "#10b981";
pub const GPU_MEMORY_COLOR: &str = "#f59e0b";

/// Job-level curves of one panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSeries {
    pub panel: Panel,
    pub time: Vec<f64>,
    pub channels: [Vec<f64>; 2],
    /// `true` when the job had no samples and baselines were used.
    pub fallback: bool,
}

impl PanelSeries {
    pub fn averages(&self) -> [f64; 2] {
        [series_average(&self.channels[0]), series_average(&self.channels[1])]
    }
}

pub fn series_average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn sorted_rows(rows: &[MetricRow]) -> Vec<&MetricRow> {
    let mut sorted: Vec<&MetricRow> = rows.iter().collect();
    sorted.sort_by(|a, b| a.relative_time.total_cmp(&b.relative_time));
    sorted
}

fn percent_of_duration(rows: &[&MetricRow]) -> Vec<f64> {
    let duration = rows
        .iter()
        .map(|row| row.relative_time)
        .fold(MIN_DURATION, f64::max);
    rows.iter()
        .map(|row| row.relative_time / duration * 100.0)
        .collect()
}

/// GPU memory utilization from DRAM activity scaled to the job's peak.
fn gpu_memory_curve(rows: &[&MetricRow]) -> Vec<f64> {
    let dram: Vec<f64> = rows
        .iter()
        .map(|row| row.metric_or_zero(DRAM_ACTIVE).abs())
        .collect();
    let peak = dram.iter().copied().fold(MIN_DRAM_PEAK, f64::max);
    dram.iter()
        .enumerate()
        .map(|(i, d)| clamp_percent(d / peak * 82.0 + 8.0 + wave(2.5, f64::sin, i, 4.0)))
        .collect()
}

fn wave(amplitude: f64, f: fn(f64) -> f64, i: usize, period: f64) -> f64 {
    amplitude * f(i as f64 / period)
}

/// Build the reference and derived curves of `panel` from a job's samples.
///
/// Samples are ordered by relative time first; missing metric values read as
/// zero. A job without samples gets the deterministic baselines instead.
pub fn panel_series(panel: Panel, rows: &[MetricRow]) -> PanelSeries {
    let layout = panel_layout(panel);

    if rows.is_empty() {
        let reference = fallback_reference(panel);
        let derived = fallback_derived(panel, &reference);
        return PanelSeries {
            panel,
            time: fallback_time_axis(),
            channels: arrange(layout.reference_channel, reference, derived),
            fallback: true,
        };
    }

    let rows = sorted_rows(rows);
    let gpu: Vec<f64> = rows
        .iter()
        .map(|row| clamp_percent(row.metric_or_zero(GPU_UTILIZATION)))
        .collect();

    let (time, reference, derived): (Vec<f64>, Vec<f64>, Vec<f64>) = match panel {
        Panel::Utilization => {
            let cpu = gpu
                .iter()
                .enumerate()
                .map(|(i, g)| clamp_percent(g * 0.70 + 6.0 + wave(2.0, f64::cos, i, 3.0)))
                .collect();
            let time = rows.iter().map(|row| row.relative_time).collect();
            (time, gpu, cpu)
        }
        Panel::Memory => {
            let gpu_mem = gpu_memory_curve(&rows);
            let cpu_mem = gpu_mem
                .iter()
                .enumerate()
                .map(|(i, g)| clamp_percent(g * 0.76 + 7.0 + wave(1.5, f64::cos, i, 3.0)))
                .collect();
            (percent_of_duration(&rows), gpu_mem, cpu_mem)
        }
        Panel::GpuPerformance => {
            let time = rows.iter().map(|row| row.relative_time).collect();
            let gpu_mem = gpu_memory_curve(&rows);
            (time, gpu, gpu_mem)
        }
        Panel::Pcie => {
            let read: Vec<f64> = gpu
                .iter()
                .enumerate()
                .map(|(i, g)| non_negative(g * 0.64 + 8.0 + wave(2.5, f64::sin, i, 4.0)))
                .collect();
            let write = read
                .iter()
                .enumerate()
                .map(|(i, r)| non_negative(r * 0.76 + wave(1.8, f64::cos, i, 3.0)))
                .collect();
            (percent_of_duration(&rows), read, write)
        }
        Panel::Network => {
            let nvlink: Vec<f64> = gpu
                .iter()
                .enumerate()
                .map(|(i, g)| non_negative(g * 1.9 + 36.0 + wave(4.0, f64::sin, i, 4.0)))
                .collect();
            let slingshot = nvlink
                .iter()
                .enumerate()
                .map(|(i, v)| non_negative(v * 0.56 + 6.0 + wave(2.2, f64::cos, i, 3.0)))
                .collect();
            (percent_of_duration(&rows), nvlink, slingshot)
        }
    };

    PanelSeries {
        panel,
        time,
        channels: arrange(layout.reference_channel, reference, derived),
        fallback: false,
    }
}

fn arrange(reference_channel: usize, reference: Vec<f64>, derived: Vec<f64>) -> [Vec<f64>; 2] {
    if reference_channel == 0 {
        [reference, derived]
    } else {
        [derived, reference]
    }
}

/// A single line of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Chart the trace belongs to on panels with more than one chart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
}

/// Average of an aggregate curve, shown in the legend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelAverage {
    pub label: String,
    pub average: f64,
}

/// Statistic across every synthetic node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub label: String,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTableRow {
    pub node: String,
    pub color: String,
    pub symbol: String,
    pub values: [f64; 2],
}

/// Everything the frontend needs to draw one panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelData {
    pub panel: Panel,
    pub scale: Scale,
    pub time_axis: TimeAxis,
    pub fallback: bool,
    pub traces: Vec<Trace>,
    pub averages: [ChannelAverage; 2],
    /// Column prefix of the node table (`Avg.`, `Min.` or `Max.`).
    pub table_prefix: String,
    pub node_section_open: bool,
    pub node_table: Vec<NodeTableRow>,
    pub summary: [ChannelSummary; 2],
}

/// Channel visibility after the toggles.
///
/// The aggregate curves of the utilization, memory and network panels fall
/// back to the full pair when both are hidden. Per-node plots, PCIe and GPU
/// performance show exactly the channels that are toggled on.
pub fn visible_channels(panel: Panel, view: &PanelView) -> [bool; 2] {
    let toggled = [view.show_primary, view.show_secondary];
    let falls_back = !view.aggregation.shows_all_nodes()
        && matches!(panel, Panel::Utilization | Panel::Memory | Panel::Network);

    if falls_back && toggled == [false, false] {
        [true, true]
    } else {
        toggled
    }
}

/// Mean of node means, min of node mins and max of node maxes per channel.
pub fn summarize_nodes(rows: &[NodeRow], labels: [&str; 2]) -> [ChannelSummary; 2] {
    [0, 1].map(|c| {
        if rows.is_empty() {
            return ChannelSummary {
                label: labels[c].to_string(),
                mean: 0.0,
                min: 0.0,
                max: 0.0,
            };
        }
        let channels = rows.iter().map(|row| &row.channels[c]);
        ChannelSummary {
            label: labels[c].to_string(),
            mean: channels.clone().map(|ch| ch.mean).sum::<f64>() / rows.len() as f64,
            min: channels.clone().map(|ch| ch.min).fold(f64::INFINITY, f64::min),
            max: channels.map(|ch| ch.max).fold(f64::NEG_INFINITY, f64::max),
        }
    })
}

fn expand_nodes(panel: Panel, series: &PanelSeries) -> Vec<NodeRow> {
    let layout = panel_layout(panel);
    SyntheticNodeExpander::new(layout.scale, layout.node_labels).expand(
        &series.time,
        &series.channels[0],
        &series.channels[1],
    )
}

fn node_traces(rows: &[NodeRow], node_labels: [&str; 2], visible: [bool; 2]) -> Vec<Trace> {
    rows.iter()
        .flat_map(|row| {
            (0..2).filter(move |&c| visible[c]).map(move |c| Trace {
                name: format!("{} {}", row.node, node_labels[c]),
                x: row.time.clone(),
                y: row.channels[c].series.clone(),
                color: Some(row.color.clone()),
                symbol: Some(row.symbol.clone()),
                plot: None,
            })
        })
        .collect()
}

/// Build a panel for a job.
///
/// `view.aggregation` picks the node-table statistic; `all` replaces the two
/// aggregate curves with one trace per node and channel.
pub fn build_panel(panel: Panel, rows: &[MetricRow], view: &PanelView) -> PanelData {
    if panel == Panel::GpuPerformance {
        return build_gpu_performance(rows, view);
    }

    let layout = panel_layout(panel);
    let series = panel_series(panel, rows);
    let nodes = expand_nodes(panel, &series);

    let visible = visible_channels(panel, view);
    let traces = if view.aggregation.shows_all_nodes() {
        node_traces(&nodes, layout.node_labels, visible)
    } else {
        (0..2)
            .filter(|&c| visible[c])
            .map(|c| Trace {
                name: layout.labels[c].to_string(),
                x: series.time.clone(),
                y: series.channels[c].clone(),
                color: None,
                symbol: None,
                plot: None,
            })
            .collect()
    };

    assemble(&series, &nodes, traces, view)
}

/// GPU utilization and GPU memory side by side.
///
/// The two charts reuse the GPU channels of the utilization and memory
/// panels, node statistics included, so the numbers agree with those panels.
/// Utilization traces are plotted over relative time and memory traces over
/// percent of duration; each trace names its chart in `plot`.
fn build_gpu_performance(rows: &[MetricRow], view: &PanelView) -> PanelData {
    let series = panel_series(Panel::GpuPerformance, rows);
    let utilization = panel_series(Panel::Utilization, rows);
    let memory = panel_series(Panel::Memory, rows);
    let utilization_nodes = expand_nodes(Panel::Utilization, &utilization);
    let memory_nodes = expand_nodes(Panel::Memory, &memory);

    let nodes: Vec<NodeRow> = utilization_nodes
        .iter()
        .zip(&memory_nodes)
        .map(|(util, mem)| NodeRow {
            node: util.node.clone(),
            color: util.color.clone(),
            symbol: util.symbol.clone(),
            time: util.time.clone(),
            channels: [util.channels[1].clone(), mem.channels[1].clone()],
        })
        .collect();

    let layout = panel_layout(Panel::GpuPerformance);
    let charts = [
        (layout.labels[0], GPU_COLOR, &series.time, &utilization_nodes),
        (layout.labels[1], GPU_MEMORY_COLOR, &memory.time, &memory_nodes),
    ];
    let visible = visible_channels(Panel::GpuPerformance, view);

    let traces = charts
        .iter()
        .enumerate()
        .filter(|(c, _)| visible[*c])
        .flat_map(|(c, (plot, color, time, chart_nodes))| {
            if view.aggregation.shows_all_nodes() {
                chart_nodes
                    .iter()
                    .map(|row| Trace {
                        name: row.node.clone(),
                        x: row.time.clone(),
                        y: row.channels[1].series.clone(),
                        color: Some(color.to_string()),
                        symbol: Some(row.symbol.clone()),
                        plot: Some(plot.to_string()),
                    })
                    .collect::<Vec<_>>()
            } else {
                vec![Trace {
                    name: plot.to_string(),
                    x: time.to_vec(),
                    y: series.channels[c].clone(),
                    color: Some(color.to_string()),
                    symbol: None,
                    plot: Some(plot.to_string()),
                }]
            }
        })
        .collect();

    assemble(&series, &nodes, traces, view)
}

fn assemble(
    series: &PanelSeries,
    nodes: &[NodeRow],
    traces: Vec<Trace>,
    view: &PanelView,
) -> PanelData {
    let layout = panel_layout(series.panel);
    let node_table = nodes
        .iter()
        .map(|row| NodeTableRow {
            node: row.node.clone(),
            color: row.color.clone(),
            symbol: row.symbol.clone(),
            values: [
                row.channels[0].statistic(view.aggregation),
                row.channels[1].statistic(view.aggregation),
            ],
        })
        .collect();

    let averages = series.averages();
    PanelData {
        panel: series.panel,
        scale: layout.scale,
        time_axis: if series.fallback {
            TimeAxis::RelativeTime
        } else {
            layout.time_axis
        },
        fallback: series.fallback,
        traces,
        averages: [0, 1].map(|c| ChannelAverage {
            label: layout.labels[c].to_string(),
            average: averages[c],
        }),
        table_prefix: view.aggregation.table_prefix().to_string(),
        node_section_open: view.node_section_open(),
        node_table,
        summary: summarize_nodes(nodes, layout.labels),
    }
}
