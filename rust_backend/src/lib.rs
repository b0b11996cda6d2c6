//! # perfdash
//!
//! Backend for an HPC performance dashboard.
//!
//! The crate turns raw center telemetry (queue wait-time payloads, a system
//! power CSV and per-job metric samples) into chart- and table-ready JSON
//! for the dashboard frontend, and serves it over a REST API.
//!
//! ## Architecture
//!
//! - [`models`]: Payload and view types shared by every layer
//! - [`parsing`]: CSV and JSON readers for the raw formats
//! - [`transformations`]: Time-window filtering
//! - [`services`]: Heatmaps, tables, utilization panels, job comparison,
//!   power and roofline views
//! - [`sources`]: Repository pattern over in-memory and file-backed data,
//!   the upstream queue client and the queue cache
//! - [`api`]: Flat re-export of the response types
//! - [`http`]: Axum-based HTTP server and request handlers

// SourceError carries owned strings for context
#![allow(clippy::result_large_err)]

pub mod api;
pub mod models;
pub mod parsing;
pub mod services;
pub mod sources;
pub mod transformations;

#[cfg(feature = "http-server")]
pub mod http;
