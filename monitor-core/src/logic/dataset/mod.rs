//! Dataset Module - Input tables for profiling
//!
//! The monitor never owns source data. Every cycle an ingestion collaborator
//! (`DatasetSource`) hands over a fresh rectangular `Dataset`.

pub mod types;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::future::Future;

use parking_lot::RwLock;

pub use types::{Column, ColumnType, Dataset, Value};

// ============================================================================
// ERRORS
// ============================================================================

/// Source table could not be turned into a dataset
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("source unreachable: {0}")]
    Unreachable(String),

    #[error("malformed dataset: {0}")]
    Malformed(String),

    #[error("unknown dataset: {0}")]
    UnknownDataset(String),
}

// ============================================================================
// SOURCE
// ============================================================================

/// Ingestion seam: reads one table of one schema into memory
pub trait DatasetSource: Send + Sync {
    fn fetch(
        &self,
        schema: &str,
        table: &str,
    ) -> impl Future<Output = Result<Dataset, IngestError>> + Send;
}

/// Source backed by datasets registered in memory
#[derive(Debug, Default)]
pub struct InMemorySource {
    tables: RwLock<HashMap<(String, String), Dataset>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the table served for `schema.table`
    pub fn insert(&self, schema: &str, table: &str, dataset: Dataset) {
        self.tables
            .write()
            .insert((schema.to_string(), table.to_string()), dataset);
    }
}

impl DatasetSource for InMemorySource {
    async fn fetch(&self, schema: &str, table: &str) -> Result<Dataset, IngestError> {
        self.tables
            .read()
            .get(&(schema.to_string(), table.to_string()))
            .cloned()
            .ok_or_else(|| IngestError::UnknownDataset(format!("{}.{}", schema, table)))
    }
}
