//! Driftwatch Core - Dataset Drift Monitor
//!
//! Profiles tabular datasets, keeps an append-only log of the resulting
//! column fingerprints, derives acceptable ranges for every statistic from
//! that history, and reports the latest fingerprints that fall outside them.
//!
//! # Pipeline
//!
//! ```text
//! DatasetSource ─▶ Profiler ─▶ SnapshotStore (append) ─▶ BreachDetector ─▶ Vec<Breach>
//!                                   │
//!                                   └──▶ ThresholdDeriver ─▶ snapshots_threshold
//! ```

pub mod logic;

pub use logic::breach::{Breach, BreachDetector};
pub use logic::config::{MonitorConfig, MonitoredDataset};
pub use logic::dataset::{Column, ColumnType, Dataset, DatasetSource, InMemorySource, IngestError, Value};
pub use logic::monitor::{
    CycleReport, DatasetOutcome, DatasetSummary, Monitor, MonitorError, MonitorStep, OutcomeStatus,
    Scheduler, SchedulerStatus,
};
pub use logic::profiler::profile;
pub use logic::snapshot::{ColumnProfile, SnapshotStore, StatField, StoreError};
pub use logic::threshold::{ThresholdConfig, ThresholdDeriver, ThresholdKey, ThresholdRecord};
