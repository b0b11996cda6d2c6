//! Service layer: turns parsed payloads into chart- and table-ready views.
//!
//! Every function here is pure and synchronous. Data sources hand in the raw
//! payload, the HTTP layer serializes whatever comes back.

pub mod compare;
pub mod heatmap;
pub mod jobs;
pub mod power;
pub mod queue;
pub mod roofline;
pub mod synthetic;
pub mod table;
pub mod utilization;

#[cfg(test)]
mod compare_tests;

pub use compare::{build_catalog, build_comparison, ComparisonData, MetricCatalog};
pub use heatmap::{bin_samples, transform_to_heatmap};
pub use jobs::{build_job_listing, job_metric_sections, JobListingRow, JobMetricsView};
pub use power::{build_power_view, job_power_panel, power_view_from_csv, PowerDataError, PowerView};
pub use queue::{build_queue_view, QueueParams, QueueQuery, QueueQueryError, QueueView};
pub use roofline::{build_roofline, RooflineData};
pub use table::format_table_data;
pub use utilization::{build_panel, panel_series, PanelData};
