//! Threshold Module - Acceptable ranges from profile history
//!
//! Bounds describe the normal range a *statistic* has taken over the
//! history of a column (e.g. the history of its `mean`), not the range of
//! the raw column values. Each bound is a Tukey fence over that history:
//! `[Q1 - k*IQR, Q3 + k*IQR]`.
//!
//! Only numeric columns get bounds. Derivation is a full replace per key,
//! so re-running it on the same history always converges to the same bounds.

pub mod types;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use chrono::{DateTime, SubsecRound, Utc};

use crate::logic::profiler::stats::quantile;
use crate::logic::snapshot::{ColumnProfile, SnapshotStore, StoreError};

pub use types::{ThresholdConfig, ThresholdKey, ThresholdRecord};

/// Tukey fence of a sample; `None` for an empty sample
pub fn tukey_fence(sample: &[f64], multiplier: f64) -> Option<(f64, f64)> {
    let mut sorted: Vec<f64> = sample.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25)?;
    let q3 = quantile(&sorted, 0.75)?;
    let iqr = q3 - q1;

    Some((q1 - multiplier * iqr, q3 + multiplier * iqr))
}

pub struct ThresholdDeriver {
    config: ThresholdConfig,
}

impl ThresholdDeriver {
    pub fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Bounds for every (dataset, numeric column, statistic) present in `history`
    pub fn derive(&self, history: &[ColumnProfile]) -> Vec<ThresholdRecord> {
        self.derive_at(history, Utc::now())
    }

    pub fn derive_at(
        &self,
        history: &[ColumnProfile],
        computed_at: DateTime<Utc>,
    ) -> Vec<ThresholdRecord> {
        let computed_at = computed_at.trunc_subsecs(6);

        let mut groups: BTreeMap<(&str, &str), Vec<&ColumnProfile>> = BTreeMap::new();
        for profile in history.iter().filter(|p| p.is_numeric()) {
            groups
                .entry((profile.dataset_name.as_str(), profile.column_name.as_str()))
                .or_default()
                .push(profile);
        }

        let mut records = Vec::new();
        for ((dataset_name, column_name), group) in groups {
            for field in self.config.fields() {
                let sample: Vec<f64> = group.iter().filter_map(|p| p.stat(field)).collect();

                // Field never defined for this column: no baseline
                let Some((lower_bound, upper_bound)) =
                    tukey_fence(&sample, self.config.fence_multiplier)
                else {
                    continue;
                };

                records.push(ThresholdRecord {
                    dataset_name: dataset_name.to_string(),
                    snapshot_field: field,
                    source_field_name: column_name.to_string(),
                    data_type: field.value_type().to_string(),
                    lower_bound,
                    upper_bound,
                    computed_at,
                });
            }
        }

        records
    }

    /// Re-derive a dataset's bounds from its full stored history and
    /// replace the previous ones in a single transaction. Records of
    /// excluded statistics are dropped in the same transaction.
    pub fn derive_and_store(
        &self,
        store: &SnapshotStore,
        dataset_name: &str,
    ) -> Result<Vec<ThresholdRecord>, StoreError> {
        let history = store.history(dataset_name)?;
        let records = self.derive(&history);
        store.replace_dataset_thresholds(dataset_name, &records, &self.config.excluded_fields)?;

        log::info!(
            "Derived {} thresholds for {} from {} profiles",
            records.len(),
            dataset_name,
            history.len()
        );
        Ok(records)
    }
}

impl Default for ThresholdDeriver {
    fn default() -> Self {
        Self::new(ThresholdConfig::default())
    }
}
