use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::services::synthetic::{roofline_kernels, ROOFLINE_MAX_PERFORMANCE};

pub const RIDGE_INTENSITY: f64 = 1.7;
pub const PEAK_PERFORMANCE: f64 = 21.5;
const BOUNDARY_END: f64 = 9.9;

pub const INTENSITY_BIN: f64 = 0.2;
pub const PERFORMANCE_BIN: f64 = 2.0;
/// Lower bound of the color scale's maximum.
const MIN_COLOR_MAX: u32 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    Memory,
    Compute,
}

/// Kernels sharing one cell of the coarse grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RooflineBin {
    pub x: f64,
    pub y: f64,
    pub count: u32,
    pub bound: Bound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RooflineData {
    /// `(0, 0) → ridge → (9.9, peak)`.
    pub boundary_x: Vec<f64>,
    pub boundary_y: Vec<f64>,
    pub ridge_x: f64,
    /// Vertical marker at the ridge, spanning the whole plot.
    pub ridge_y: [f64; 2],
    pub bins: Vec<RooflineBin>,
    pub color_min: u32,
    pub color_max: u32,
    pub kernel_count: usize,
}

/// Left of the ridge point performance is limited by memory bandwidth.
pub fn classify(intensity: f64) -> Bound {
    if intensity < RIDGE_INTENSITY {
        Bound::Memory
    } else {
        Bound::Compute
    }
}

/// Group kernels by their rounded grid center, in first-seen order.
///
/// Cells are keyed on the centers printed to two decimals so that float noise
/// from the multiplication does not split a cell.
pub fn bin_kernels(kernels: &[(f64, f64)]) -> Vec<RooflineBin> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut bins: Vec<RooflineBin> = Vec::new();

    for &(intensity, performance) in kernels {
        let x = (intensity / INTENSITY_BIN).round() * INTENSITY_BIN;
        let y = (performance / PERFORMANCE_BIN).round() * PERFORMANCE_BIN;
        let key = (format!("{:.2}", x), format!("{:.2}", y));

        match index.get(&key) {
            Some(&idx) => bins[idx].count += 1,
            None => {
                index.insert(key, bins.len());
                bins.push(RooflineBin {
                    x,
                    y,
                    count: 1,
                    bound: classify(x),
                });
            }
        }
    }

    bins
}

pub fn build_roofline() -> RooflineData {
    let kernels = roofline_kernels();
    let bins = bin_kernels(&kernels);
    let color_max = bins
        .iter()
        .map(|b| b.count)
        .max()
        .unwrap_or(0)
        .max(MIN_COLOR_MAX);

    RooflineData {
        boundary_x: vec![0.0, RIDGE_INTENSITY, BOUNDARY_END],
        boundary_y: vec![0.0, PEAK_PERFORMANCE, PEAK_PERFORMANCE],
        ridge_x: RIDGE_INTENSITY,
        ridge_y: [0.0, ROOFLINE_MAX_PERFORMANCE],
        bins,
        color_min: 1,
        color_max,
        kernel_count: kernels.len(),
    }
}
