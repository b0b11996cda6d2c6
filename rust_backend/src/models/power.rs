use serde::{Deserialize, Serialize};

/// System power sample: `time` in epoch milliseconds, `power` in watts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerPoint {
    pub time: f64,
    pub power: f64,
}

impl PowerPoint {
    pub fn new(time: f64, power: f64) -> Self {
        Self { time, power }
    }
}
