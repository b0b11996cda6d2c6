//! Time-window filtering for dashboard series.
//!
//! # Example
//!
//! ```
//! use perfdash::models::{DateRange, PowerPoint};
//! use perfdash::transformations::filter_by_range;
//!
//! let series = vec![PowerPoint::new(0.0, 900.0), PowerPoint::new(86_400_000.0, 950.0)];
//! let last_day = filter_by_range(&series, DateRange::Last24Hours);
//! assert_eq!(last_day.len(), 2);
//! ```

pub mod filtering;

pub use filtering::{filter_by_range, filter_by_window, latest_timestamp, Timestamped};
