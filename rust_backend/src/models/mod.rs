//! Domain models shared by the parsers, services and HTTP layer.
//!
//! Everything here is a plain value type: payloads arrive from a data source,
//! get reshaped by the services and are serialized back out. Nothing in this
//! module is cached or mutated after construction.

pub mod heatmap;
pub mod job;
pub mod metrics;
pub mod power;
pub mod table;
pub mod view;

pub use heatmap::*;
pub use job::*;
pub use metrics::*;
pub use power::*;
pub use table::*;
pub use view::*;
