use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Aggregation, DateRange, PowerPoint};
use crate::parsing::parse_power_csv_str;
use crate::services::synthetic::{
    fallback_time_axis, node_id, power_aggregation_factor, power_baseline, power_node_factor,
    NODE_COUNT, POWER_COMPONENTS,
};
use crate::services::utilization::{series_average, Trace};
use crate::transformations::{filter_by_range, latest_timestamp};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PowerDataError {
    #[error("No valid data found in the CSV file")]
    NoValidData,
}

/// System power over a trailing window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerView {
    pub range: DateRange,
    pub range_label: String,
    pub points: Vec<PowerPoint>,
    pub total_points: usize,
    /// Newest sample of the whole file, not just the window.
    pub last_updated: Option<DateTime<Utc>>,
}

/// Window the power samples and stamp the view with the newest sample time.
pub fn build_power_view(points: &[PowerPoint], range: DateRange) -> Result<PowerView, PowerDataError> {
    if points.is_empty() {
        return Err(PowerDataError::NoValidData);
    }

    let last_updated = latest_timestamp(points)
        .and_then(|ms| DateTime::<Utc>::from_timestamp_millis(ms as i64));

    Ok(PowerView {
        range,
        range_label: range.label().to_string(),
        points: filter_by_range(points, range),
        total_points: points.len(),
        last_updated,
    })
}

pub fn power_view_from_csv(csv_text: &str, range: DateRange) -> Result<PowerView, PowerDataError> {
    build_power_view(&parse_power_csv_str(csv_text), range)
}

/// Per-node power row; values are watts for CPU, GPU, memory and node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerNodeRow {
    pub node: String,
    pub cpu: f64,
    pub gpu: f64,
    pub memory: f64,
    pub node_power: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPowerPanel {
    pub traces: Vec<Trace>,
    /// Average of each component curve, in trace order.
    pub averages: Vec<f64>,
    pub table_prefix: String,
    pub node_table: Vec<PowerNodeRow>,
}

/// Which component curves to draw, in `CPU, GPU, Memory, Node` order.
pub type PowerVisibility = [bool; 4];

/// Job power panel built from the component baselines.
///
/// Hidden components are dropped from the chart but still feed the node table.
pub fn job_power_panel(aggregation: Aggregation, visible: PowerVisibility) -> JobPowerPanel {
    let time = fallback_time_axis();
    let curves: Vec<(&str, Vec<f64>)> = POWER_COMPONENTS
        .iter()
        .enumerate()
        .map(|(component, (label, base, span))| (*label, power_baseline(component, *base, *span)))
        .collect();
    let averages: Vec<f64> = curves.iter().map(|(_, values)| series_average(values)).collect();

    let show_any = visible.iter().any(|v| *v);
    let traces = curves
        .iter()
        .zip(visible)
        .filter(|(_, shown)| *shown || !show_any)
        .map(|((label, values), _)| Trace {
            name: label.to_string(),
            x: time.clone(),
            y: values.clone(),
            color: None,
            symbol: None,
            plot: None,
        })
        .collect();

    let aggregation_factor = power_aggregation_factor(aggregation);
    let node_table = (0..NODE_COUNT)
        .map(|idx| {
            let scale = power_node_factor(idx) * aggregation_factor;
            PowerNodeRow {
                node: node_id(idx),
                cpu: averages[0] * scale,
                gpu: averages[1] * scale,
                memory: averages[2] * scale,
                node_power: averages[3] * scale,
            }
        })
        .collect();

    JobPowerPanel {
        traces,
        averages,
        table_prefix: aggregation.table_prefix().to_string(),
        node_table,
    }
}
