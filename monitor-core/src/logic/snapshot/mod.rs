//! Snapshot Module - Persistent profile log
//!
//! # Architecture
//! - `types.rs`: `ColumnProfile`, `StatField`
//! - `store.rs`: `SnapshotStore` over SQLite with two tables:
//!   - `snapshots` - append-only, one row per (dataset, column, capture time)
//!   - `snapshots_threshold` - one live row per (dataset, statistic, column)
//!
//! # Failure Strategy
//! Every multi-row write runs in one transaction. A failed write leaves
//! both tables exactly as they were.

pub mod types;
pub mod store;


pub use store::SnapshotStore;
pub use types::{ColumnProfile, StatField};

/// Persistence layer failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
