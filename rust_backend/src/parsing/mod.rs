//! Parsers for the dashboard's raw data formats.
//!
//! # Parsers
//!
//! - [`csv_parser`]: System power CSV (`time,power` with a header line)
//! - [`json_parser`]: Queue wait-time payloads, per-job metrics and the job listing
//!
//! # Example
//!
//! ```no_run
//! use perfdash::parsing::csv_parser::parse_power_csv;
//! use std::path::Path;
//!
//! let points = parse_power_csv(Path::new("power.csv"))
//!     .expect("Failed to parse power data");
//! ```

pub mod csv_parser;
pub mod json_parser;

#[cfg(test)]
mod csv_parser_tests;

pub use csv_parser::{parse_power_csv, parse_power_csv_str};
pub use json_parser::{
    parse_metrics_json, parse_metrics_json_str, parse_queue_payload_str, parse_user_jobs_json,
    parse_user_jobs_json_str, QueueWaitTimesPayload,
};
