//! Breach Module - Latest profile vs. stored bounds
//!
//! A breach is a normal output, not an error. "No threshold yet" is not a
//! breach either: it just means there is no baseline to compare against.


use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::snapshot::{ColumnProfile, SnapshotStore, StatField, StoreError};
use crate::logic::threshold::{ThresholdConfig, ThresholdKey, ThresholdRecord};

/// One statistic of one column outside its bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breach {
    pub dataset_name: String,
    pub column_name: String,
    pub statistic: StatField,
    pub observed: f64,
    pub captured_at: DateTime<Utc>,

    // Column extremes at capture time, for context
    pub observed_min: Option<f64>,
    pub observed_max: Option<f64>,

    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl Breach {
    /// Identity within one detection pass
    pub fn key(&self) -> (&str, StatField) {
        (self.column_name.as_str(), self.statistic)
    }
}

/// Compare one statistic of a profile with its threshold.
/// Strict inequality: a value equal to a bound is not a breach.
pub fn evaluate(profile: &ColumnProfile, threshold: &ThresholdRecord) -> Option<Breach> {
    let observed = profile.stat(threshold.snapshot_field)?;
    if threshold.contains(observed) {
        return None;
    }

    Some(Breach {
        dataset_name: profile.dataset_name.clone(),
        column_name: profile.column_name.clone(),
        statistic: threshold.snapshot_field,
        observed,
        captured_at: profile.captured_at,
        observed_min: profile.min,
        observed_max: profile.max,
        lower_bound: threshold.lower_bound,
        upper_bound: threshold.upper_bound,
    })
}

#[derive(Clone)]
pub struct BreachDetector {
    store: SnapshotStore,
    config: ThresholdConfig,
}

impl BreachDetector {
    pub fn new(store: SnapshotStore) -> Self {
        Self {
            store,
            config: ThresholdConfig::default(),
        }
    }

    /// Statistics excluded from derivation are not checked either
    pub fn with_config(mut self, config: ThresholdConfig) -> Self {
        self.config = config;
        self
    }

    /// Check the newest profile of each requested numeric column (all
    /// columns when `column_names` is empty) against the live thresholds
    pub fn check(
        &self,
        dataset_name: &str,
        column_names: &[String],
    ) -> Result<Vec<Breach>, StoreError> {
        let latest = self.store.query_latest(dataset_name, column_names)?;
        let mut breaches = Vec::new();

        for profile in latest.iter().filter(|p| p.is_numeric()) {
            for (field, _) in profile.stats().filter(|(f, _)| !self.config.is_excluded(*f)) {
                let key = ThresholdKey::new(dataset_name, field, profile.column_name.as_str());
                let Some(threshold) = self.store.threshold(&key)? else {
                    continue;
                };

                if let Some(breach) = evaluate(profile, &threshold) {
                    log::warn!(
                        "BREACH {}.{} {}={} outside [{}, {}]",
                        breach.dataset_name,
                        breach.column_name,
                        breach.statistic,
                        breach.observed,
                        breach.lower_bound,
                        breach.upper_bound
                    );
                    breaches.push(breach);
                }
            }
        }

        log::debug!(
            "Checked {} profiles of {}: {} breaches",
            latest.len(),
            dataset_name,
            breaches.len()
        );
        Ok(breaches)
    }
}
