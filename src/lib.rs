//! ROLL sequence extraction service.
//!
//! Scans the `ROLL` column of a table for maximal runs of rows whose
//! adjacent values differ by at most a configured amount, keeps the runs that
//! reach a minimum length, tags each with a group id, and exports the result.
//!
//! The core is [`analysis::sequences::extract`]; everything else loads,
//! configures, logs, renders or exports around it.

pub mod analysis;
pub mod config;
pub mod export;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod params;
pub mod pipeline;
pub mod report;
