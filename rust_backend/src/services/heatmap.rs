use crate::models::{HeatmapGrid, Sample};

/// Sorted distinct axis values. `-0.0` and `0.0` collapse; NaN never appears.
fn distinct_sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut values: Vec<f64> = values.filter(|v| !v.is_nan()).collect();
    values.sort_by(f64::total_cmp);
    values.dedup_by(|a, b| a == b);
    values
}

fn axis_index(axis: &[f64], value: f64) -> Option<usize> {
    let idx = axis.partition_point(|&v| v < value);
    (axis.get(idx) == Some(&value)).then_some(idx)
}

/// Bin `(x, y, value)` samples into a dense grid.
///
/// Axes are the distinct x and y values in ascending order. Each sample
/// writes its value into `z[y][x]`; a later sample at the same coordinates
/// overwrites an earlier one. Cells with no sample stay `None`.
pub fn bin_samples(samples: &[Sample]) -> HeatmapGrid {
    if samples.is_empty() {
        return HeatmapGrid::default();
    }

    let x_values = distinct_sorted(samples.iter().map(|s| s.x));
    let y_values = distinct_sorted(samples.iter().map(|s| s.y));

    let mut z = vec![vec![None; x_values.len()]; y_values.len()];
    for sample in samples {
        if let (Some(xi), Some(yi)) = (
            axis_index(&x_values, sample.x),
            axis_index(&y_values, sample.y),
        ) {
            z[yi][xi] = Some(sample.value);
        }
    }

    HeatmapGrid {
        x_categories: hour_labels(&x_values),
        y_categories: node_labels(&y_values),
        z,
    }
}

/// Bin raw `[x, y, value]` rows from the queue payload.
///
/// Rows with fewer than three numbers are dropped.
pub fn transform_to_heatmap(rows: &[Vec<f64>]) -> HeatmapGrid {
    let samples: Vec<Sample> = rows.iter().filter_map(|row| Sample::from_row(row)).collect();
    bin_samples(&samples)
}

/// Requested-hours labels: `0` reads `<1`, the last bin is open-ended.
pub fn hour_labels(x_values: &[f64]) -> Vec<String> {
    let last = x_values.len().saturating_sub(1);
    x_values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            if value == 0.0 {
                "<1".to_string()
            } else if i == last {
                format!("{}+", value)
            } else {
                value.to_string()
            }
        })
        .collect()
}

/// Node-count labels for log2 buckets: bucket `v` spans `2^v ..= 2^(v+1) - 1`.
pub fn node_labels(y_values: &[f64]) -> Vec<String> {
    let last = y_values.len().saturating_sub(1);
    y_values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let lower = 2f64.powf(value);
            let upper = 2f64.powf(value + 1.0) - 1.0;
            if value == 0.0 {
                "1".to_string()
            } else if i == last {
                format!("{}+", lower)
            } else {
                format!("{} - {}", lower, upper)
            }
        })
        .collect()
}
