use serde::{Deserialize, Serialize};

/// One raw observation of a 2-D histogram, e.g. hours requested (x) by
/// node-count bucket (y) mapped to an average wait time or a job count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl Sample {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self { x, y, value }
    }

    /// Build a sample from an `[x, y, value]` row of the upstream payload.
    ///
    /// Rows shorter than three entries are rejected; trailing entries are
    /// ignored.
    pub fn from_row(row: &[f64]) -> Option<Self> {
        match row {
            [x, y, value, ..] => Some(Self::new(*x, *y, *value)),
            _ => None,
        }
    }
}

/// Dense heatmap grid with labelled axis categories.
///
/// `z` is indexed `[y][x]`; cells without a sample are `None` and serialize
/// as `null` so the chart renders a gap instead of interpolating.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatmapGrid {
    #[serde(rename = "x")]
    pub x_categories: Vec<String>,
    #[serde(rename = "y")]
    pub y_categories: Vec<String>,
    pub z: Vec<Vec<Option<f64>>>,
}

impl HeatmapGrid {
    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }

    /// Number of populated cells.
    pub fn filled_cells(&self) -> usize {
        self.z.iter().flatten().filter(|cell| cell.is_some()).count()
    }
}
