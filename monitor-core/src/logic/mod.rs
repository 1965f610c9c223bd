//! Logic Module - Drift Monitoring Engines
//!
//! Leaves first:
//! - `dataset/` - Input tables and the ingestion seam
//! - `profiler/` - Per-column summary statistics
//! - `snapshot/` - Append-only profile log + threshold table (SQLite)
//! - `threshold/` - IQR fence derivation over profile history
//! - `breach/` - Latest profile vs. stored bounds
//! - `monitor/` - Cycle orchestration and the supervised scheduler

pub mod config;
pub mod dataset;
pub mod profiler;
pub mod snapshot;
pub mod threshold;
pub mod breach;
pub mod monitor;

#[cfg(test)]
pub(crate) mod testing;
