use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MonitorStep;
use crate::logic::breach::Breach;

/// Result of one monitoring cycle over every configured dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<DatasetOutcome>,
}

impl CycleReport {
    pub fn breach_count(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match &o.status {
                OutcomeStatus::Completed(summary) => summary.breaches.len(),
                OutcomeStatus::Failed { .. } => 0,
            })
            .sum()
    }

    pub fn failed(&self) -> impl Iterator<Item = &DatasetOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetOutcome {
    pub dataset_name: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl DatasetOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed { .. })
    }

    pub fn summary(&self) -> Option<&DatasetSummary> {
        match &self.status {
            OutcomeStatus::Completed(summary) => Some(summary),
            OutcomeStatus::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Completed(DatasetSummary),
    Failed { step: MonitorStep, error: String },
}

/// What one dataset's cycle produced
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub profiles_stored: usize,
    pub thresholds_written: usize,
    /// Breaches of the new profile against the bounds it was checked under
    pub breaches: Vec<Breach>,
    /// Breaches that only appear after re-deriving with the new profile
    /// included: the fence moved against its own data point
    pub deriver_anomalies: Vec<Breach>,
}
