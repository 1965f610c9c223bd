use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::snapshot::StatField;

// ============================================================================
// CONFIG
// ============================================================================

const DEFAULT_FENCE_MULTIPLIER: f64 = 1.5;

/// Threshold derivation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// IQR multiplier of the Tukey fence (1.5 = classic outlier rule)
    pub fence_multiplier: f64,

    /// Statistics never given bounds
    #[serde(default)]
    pub excluded_fields: Vec<StatField>,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            fence_multiplier: DEFAULT_FENCE_MULTIPLIER,
            excluded_fields: Vec::new(),
        }
    }
}

impl ThresholdConfig {
    pub fn new(fence_multiplier: f64) -> Self {
        Self {
            fence_multiplier,
            ..Default::default()
        }
    }

    /// Only watch the shape of the data, not its volume
    pub fn without_counters() -> Self {
        Self {
            excluded_fields: vec![
                StatField::Count,
                StatField::NullCount,
                StatField::DistinctCount,
            ],
            ..Default::default()
        }
    }

    pub fn is_excluded(&self, field: StatField) -> bool {
        self.excluded_fields.contains(&field)
    }

    /// Fields bounds are derived for, in `StatField::ALL` order
    pub fn fields(&self) -> impl Iterator<Item = StatField> + '_ {
        StatField::ALL
            .into_iter()
            .filter(move |f| !self.is_excluded(*f))
    }
}

// ============================================================================
// RECORDS
// ============================================================================

/// Identity of a threshold: one statistic of one column of one dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThresholdKey {
    pub dataset_name: String,
    /// Statistic the bounds apply to
    pub snapshot_field: StatField,
    /// Profiled source column
    pub source_field_name: String,
}

impl ThresholdKey {
    pub fn new(
        dataset_name: impl Into<String>,
        snapshot_field: StatField,
        source_field_name: impl Into<String>,
    ) -> Self {
        Self {
            dataset_name: dataset_name.into(),
            snapshot_field,
            source_field_name: source_field_name.into(),
        }
    }
}

/// Currently believed acceptable range of one statistic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRecord {
    pub dataset_name: String,
    pub snapshot_field: StatField,
    pub source_field_name: String,
    /// Storage type of the statistic (`int64` / `float64`)
    pub data_type: String,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub computed_at: DateTime<Utc>,
}

impl ThresholdRecord {
    pub fn key(&self) -> ThresholdKey {
        ThresholdKey::new(
            self.dataset_name.clone(),
            self.snapshot_field,
            self.source_field_name.clone(),
        )
    }

    /// Bounds are inclusive: a value on the fence is not a breach
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower_bound && value <= self.upper_bound
    }

    /// Any deviation from a zero-width range is a breach
    pub fn is_zero_width(&self) -> bool {
        self.upper_bound == self.lower_bound
    }
}
