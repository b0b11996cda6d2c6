//! Response types of the REST API in one place.
//!
//! Everything the HTTP layer serializes is re-exported here so clients of
//! the crate can deserialize responses without knowing which service
//! produced them.

pub use crate::models::*;
pub use crate::services::compare::{
    ComparisonData, ComparisonTrace, JobOption, JobSummary, MetricCatalog, MetricGroups,
    MetricOption,
};
pub use crate::services::jobs::{
    EnergyStatus, JobListingRow, JobMetricsView, MetricSection,
};
pub use crate::services::power::{JobPowerPanel, PowerNodeRow, PowerView};
pub use crate::services::queue::{QueueParams, QueueView};
pub use crate::services::roofline::{Bound, RooflineBin, RooflineData};
pub use crate::services::utilization::{
    ChannelAverage, ChannelSummary, NodeTableRow, PanelData, TimeAxis, Trace,
};
