//! Monitor Module - Cycle orchestration
//!
//! Per configured dataset, once per cycle:
//!
//! ```text
//! INGEST → PROFILE → STORE → DETECT(pre) → DERIVE_THRESHOLDS → DETECT(post) → DONE
//! ```
//!
//! Datasets are processed independently: a failure aborts only the failing
//! dataset's cycle and is recorded in the `CycleReport`.

pub mod report;
pub mod scheduler;


use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::breach::{Breach, BreachDetector};
use crate::logic::config::{MonitorConfig, MonitoredDataset};
use crate::logic::dataset::{DatasetSource, IngestError};
use crate::logic::profiler;
use crate::logic::snapshot::{SnapshotStore, StoreError};
use crate::logic::threshold::ThresholdDeriver;

pub use report::{CycleReport, DatasetOutcome, DatasetSummary, OutcomeStatus};
pub use scheduler::{Scheduler, SchedulerStatus};

// ============================================================================
// STEPS & ERRORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorStep {
    Ingest,
    Profile,
    Store,
    DetectPre,
    DeriveThresholds,
    DetectPost,
}

impl std::fmt::Display for MonitorStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MonitorStep::Ingest => "ingest",
            MonitorStep::Profile => "profile",
            MonitorStep::Store => "store",
            MonitorStep::DetectPre => "detect_pre",
            MonitorStep::DeriveThresholds => "derive_thresholds",
            MonitorStep::DetectPost => "detect_post",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("{0}")]
    Ingestion(#[from] IngestError),

    #[error("{step} failed: {source}")]
    Storage {
        step: MonitorStep,
        #[source]
        source: StoreError,
    },
}

impl MonitorError {
    fn storage(step: MonitorStep) -> impl FnOnce(StoreError) -> Self {
        move |source| MonitorError::Storage { step, source }
    }

    pub fn step(&self) -> MonitorStep {
        match self {
            MonitorError::Ingestion(_) => MonitorStep::Ingest,
            MonitorError::Storage { step, .. } => *step,
        }
    }
}

// ============================================================================
// MONITOR
// ============================================================================

pub struct Monitor<S> {
    source: S,
    store: SnapshotStore,
    config: MonitorConfig,
    deriver: ThresholdDeriver,
    detector: BreachDetector,
}

impl<S: DatasetSource> Monitor<S> {
    pub fn new(source: S, store: SnapshotStore, config: MonitorConfig) -> Self {
        let deriver = ThresholdDeriver::new(config.thresholds.clone());
        let detector = BreachDetector::new(store.clone()).with_config(config.thresholds.clone());
        Self {
            source,
            store,
            config,
            deriver,
            detector,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run every configured dataset once
    pub async fn run_cycle(&self) -> CycleReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        log::info!(
            "Monitoring cycle {} started ({} datasets)",
            run_id,
            self.config.datasets.len()
        );

        let mut outcomes = Vec::with_capacity(self.config.datasets.len());
        for dataset in &self.config.datasets {
            let dataset_name = dataset.dataset_name(&self.config.schema);
            let status = match self.run_dataset(dataset).await {
                Ok(summary) => OutcomeStatus::Completed(summary),
                Err(e) => {
                    log::error!("[{}] cycle aborted at {}: {}", dataset_name, e.step(), e);
                    OutcomeStatus::Failed {
                        step: e.step(),
                        error: e.to_string(),
                    }
                }
            };
            outcomes.push(DatasetOutcome {
                dataset_name,
                status,
            });
        }

        let report = CycleReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            outcomes,
        };
        log::info!(
            "Monitoring cycle {} finished: {} breaches, {} failed datasets",
            run_id,
            report.breach_count(),
            report.failed().count()
        );
        report
    }

    /// One dataset through the whole pipeline
    pub async fn run_dataset(&self, dataset: &MonitoredDataset) -> Result<DatasetSummary, MonitorError> {
        let dataset_name = dataset.dataset_name(&self.config.schema);

        let data = self.source.fetch(&self.config.schema, &dataset.table).await?;

        let profiles = profiler::profile(&data, &dataset_name);
        log::debug!("[{}] profiled {} columns", dataset_name, profiles.len());

        let stored = self
            .store
            .append(&profiles)
            .map_err(MonitorError::storage(MonitorStep::Store))?;

        let breaches = self
            .detector
            .check(&dataset_name, &dataset.columns)
            .map_err(MonitorError::storage(MonitorStep::DetectPre))?;

        let thresholds = self
            .deriver
            .derive_and_store(&self.store, &dataset_name)
            .map_err(MonitorError::storage(MonitorStep::DeriveThresholds))?;

        let post = self
            .detector
            .check(&dataset_name, &dataset.columns)
            .map_err(MonitorError::storage(MonitorStep::DetectPost))?;

        let deriver_anomalies = post_only(&breaches, post);
        for anomaly in &deriver_anomalies {
            log::warn!(
                "[{}] deriver anomaly: {}.{} breaches bounds derived from itself",
                dataset_name,
                anomaly.column_name,
                anomaly.statistic
            );
        }

        Ok(DatasetSummary {
            profiles_stored: stored.len(),
            thresholds_written: thresholds.len(),
            breaches,
            deriver_anomalies,
        })
    }

    /// Breach check of a configured dataset, using its column filter
    pub fn check(&self, dataset_name: &str) -> Result<Vec<Breach>, StoreError> {
        let columns = self
            .config
            .find(dataset_name)
            .map(|d| d.columns.as_slice())
            .unwrap_or_default();
        self.detector.check(dataset_name, columns)
    }
}

/// Breaches of the post-derivation pass absent from the first pass
fn post_only(pre: &[Breach], post: Vec<Breach>) -> Vec<Breach> {
    post.into_iter()
        .filter(|b| !pre.iter().any(|p| p.key() == b.key()))
        .collect()
}
