//! Monitor Configuration
//!
//! Which tables are watched, which of their columns are checked, and how
//! often a cycle runs. Loaded by the embedding binary (env, file, ...).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::threshold::ThresholdConfig;

const DEFAULT_SCHEMA: &str = "public";
const DEFAULT_INTERVAL_SECS: u64 = 3600;

/// A source table under monitoring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredDataset {
    /// Table name inside the configured schema
    pub table: String,

    /// Columns checked for breaches. Empty = every profiled column.
    #[serde(default)]
    pub columns: Vec<String>,
}

impl MonitoredDataset {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
        }
    }

    pub fn with_columns<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Name under which profiles and thresholds of this table are stored
    pub fn dataset_name(&self, schema: &str) -> String {
        format!("{}.{}", schema, self.table)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Source schema all monitored tables live in
    pub schema: String,

    pub datasets: Vec<MonitoredDataset>,

    /// Seconds between two scheduled cycles
    pub interval_secs: u64,

    #[serde(default)]
    pub thresholds: ThresholdConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            schema: DEFAULT_SCHEMA.to_string(),
            datasets: Vec::new(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            thresholds: ThresholdConfig::default(),
        }
    }
}

impl MonitorConfig {
    pub fn new(schema: impl Into<String>, datasets: Vec<MonitoredDataset>) -> Self {
        Self {
            schema: schema.into(),
            datasets,
            ..Default::default()
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    /// Resolve a stored dataset name back to its monitored table
    pub fn find(&self, dataset_name: &str) -> Option<&MonitoredDataset> {
        self.datasets
            .iter()
            .find(|d| d.dataset_name(&self.schema) == dataset_name)
    }

    pub fn dataset_names(&self) -> Vec<String> {
        self.datasets
            .iter()
            .map(|d| d.dataset_name(&self.schema))
            .collect()
    }
}
