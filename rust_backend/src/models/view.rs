//! Explicit view state.
//!
//! The frontend keeps filters and expand/collapse flags locally and sends them
//! as query parameters. They only select which precomputed aggregate gets
//! returned; none of them changes how the transforms compute.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const HOUR_SECS: u64 = 60 * 60;
const DAY_SECS: u64 = 24 * HOUR_SECS;

/// Which per-node statistic a table shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Mean,
    Min,
    Max,
    /// Plot every node individually instead of the aggregate curve.
    All,
}

impl Aggregation {
    /// Column prefix used in node tables.
    pub fn table_prefix(self) -> &'static str {
        match self {
            Aggregation::Max => "Max.",
            Aggregation::Min => "Min.",
            Aggregation::Mean | Aggregation::All => "Avg.",
        }
    }

    pub fn shows_all_nodes(self) -> bool {
        matches!(self, Aggregation::All)
    }
}

impl FromStr for Aggregation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mean" | "avg" => Ok(Self::Mean),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "all" => Ok(Self::All),
            other => Err(format!(
                "Invalid aggregation: {}. Must be 'mean', 'min', 'max' or 'all'",
                other
            )),
        }
    }
}

/// Trailing time window selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DateRange {
    #[serde(rename = "24h")]
    #[default]
    Last24Hours,
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "all")]
    All,
}

impl DateRange {
    /// Window length in seconds; `None` for [`DateRange::All`].
    pub fn window_secs(self) -> Option<u64> {
        match self {
            DateRange::Last24Hours => Some(DAY_SECS),
            DateRange::Last7Days => Some(7 * DAY_SECS),
            DateRange::Last30Days => Some(30 * DAY_SECS),
            DateRange::All => None,
        }
    }

    pub fn window_millis(self) -> Option<f64> {
        self.window_secs().map(|secs| secs as f64 * 1000.0)
    }

    pub fn label(self) -> &'static str {
        match self {
            DateRange::Last24Hours => "Last 24 Hours",
            DateRange::Last7Days => "Last 7 Days",
            DateRange::Last30Days => "Last 30 Days",
            DateRange::All => "All Data",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DateRange::Last24Hours => "24h",
            DateRange::Last7Days => "7d",
            DateRange::Last30Days => "30d",
            DateRange::All => "all",
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "24h" => Ok(Self::Last24Hours),
            "7d" => Ok(Self::Last7Days),
            "30d" => Ok(Self::Last30Days),
            "all" => Ok(Self::All),
            other => Err(format!(
                "Invalid date range: {}. Must be '24h', '7d', '30d' or 'all'",
                other
            )),
        }
    }
}

/// State of one collapsible metric panel on the job detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelView {
    #[serde(default)]
    pub aggregation: Aggregation,
    /// Whether the user opened the node table.
    #[serde(default)]
    pub expanded: bool,
    #[serde(default = "default_true")]
    pub show_primary: bool,
    #[serde(default = "default_true")]
    pub show_secondary: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PanelView {
    fn default() -> Self {
        Self {
            aggregation: Aggregation::Mean,
            expanded: false,
            show_primary: true,
            show_secondary: true,
        }
    }
}

impl PanelView {
    /// Selecting `all` forces the node section open.
    pub fn node_section_open(&self) -> bool {
        self.expanded || self.aggregation.shows_all_nodes()
    }
}

/// Resource panel on the job detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    Utilization,
    Memory,
    Pcie,
    Network,
    /// GPU utilization next to GPU memory utilization.
    #[serde(rename = "gpu-performance")]
    GpuPerformance,
}

impl Panel {
    pub const ALL: [Panel; 5] = [
        Panel::Utilization,
        Panel::Memory,
        Panel::Pcie,
        Panel::Network,
        Panel::GpuPerformance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Panel::Utilization => "utilization",
            Panel::Memory => "memory",
            Panel::Pcie => "pcie",
            Panel::Network => "network",
            Panel::GpuPerformance => "gpu-performance",
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Panel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "utilization" => Ok(Self::Utilization),
            "memory" => Ok(Self::Memory),
            "pcie" => Ok(Self::Pcie),
            "network" => Ok(Self::Network),
            "gpu-performance" | "gpu_performance" => Ok(Self::GpuPerformance),
            other => Err(format!(
                "Invalid panel: {}. Must be 'utilization', 'memory', 'pcie', 'network' or 'gpu-performance'",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregation_parse_and_prefix() {
        assert_eq!("MAX".parse::<Aggregation>().unwrap(), Aggregation::Max);
        assert_eq!("avg".parse::<Aggregation>().unwrap(), Aggregation::Mean);
        assert!("median".parse::<Aggregation>().is_err());
        assert_eq!(Aggregation::Min.table_prefix(), "Min.");
        assert_eq!(Aggregation::All.table_prefix(), "Avg.");
        assert_eq!(Aggregation::default(), Aggregation::Mean);
    }

    #[test]
    fn test_date_range_windows() {
        assert_eq!(DateRange::Last24Hours.window_secs(), Some(86_400));
        assert_eq!(DateRange::Last7Days.window_millis(), Some(604_800_000.0));
        assert_eq!(DateRange::Last30Days.window_secs(), Some(2_592_000));
        assert_eq!(DateRange::All.window_secs(), None);
        assert_eq!("7D".parse::<DateRange>().unwrap(), DateRange::Last7Days);
        assert!("1y".parse::<DateRange>().is_err());
    }

    #[test]
    fn test_date_range_serde_names() {
        let json = serde_json::to_string(&DateRange::Last30Days).unwrap();
        assert_eq!(json, "\"30d\"");
        let parsed: DateRange = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(parsed, DateRange::All);
    }

    #[test]
    fn test_panel_view_all_forces_open() {
        let view = PanelView {
            aggregation: Aggregation::All,
            ..PanelView::default()
        };
        assert!(view.node_section_open());
        assert!(!PanelView::default().node_section_open());
    }

    #[test]
    fn test_panel_round_trip_names() {
        for panel in Panel::ALL {
            assert_eq!(panel.as_str().parse::<Panel>().unwrap(), panel);
        }
        assert_eq!("PCIe".parse::<Panel>().unwrap(), Panel::Pcie);
        assert_eq!(
            "gpu_performance".parse::<Panel>().unwrap(),
            Panel::GpuPerformance
        );
        assert_eq!(
            serde_json::to_string(&Panel::GpuPerformance).unwrap(),
            "\"gpu-performance\""
        );
        assert!("power".parse::<Panel>().is_err());
    }
}
