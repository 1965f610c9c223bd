use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::dataset::ColumnType;

// ============================================================================
// STAT FIELDS
// ============================================================================

/// Every statistic a profile carries, named as persisted in `snapshots`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatField {
    #[serde(rename = "count")]
    Count,
    #[serde(rename = "count_of_null_records")]
    NullCount,
    #[serde(rename = "null_percentage")]
    NullPercentage,
    #[serde(rename = "unique_values")]
    DistinctCount,
    #[serde(rename = "min_value")]
    Min,
    #[serde(rename = "percentile_25")]
    P25,
    #[serde(rename = "percentile_50")]
    P50,
    #[serde(rename = "percentile_75")]
    P75,
    #[serde(rename = "max_value")]
    Max,
    #[serde(rename = "mean")]
    Mean,
    #[serde(rename = "median")]
    Median,
    #[serde(rename = "std")]
    Std,
    #[serde(rename = "skew")]
    Skew,
}

impl StatField {
    pub const ALL: [StatField; 13] = [
        StatField::Count,
        StatField::NullCount,
        StatField::NullPercentage,
        StatField::DistinctCount,
        StatField::Min,
        StatField::P25,
        StatField::P50,
        StatField::P75,
        StatField::Max,
        StatField::Mean,
        StatField::Median,
        StatField::Std,
        StatField::Skew,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatField::Count => "count",
            StatField::NullCount => "count_of_null_records",
            StatField::NullPercentage => "null_percentage",
            StatField::DistinctCount => "unique_values",
            StatField::Min => "min_value",
            StatField::P25 => "percentile_25",
            StatField::P50 => "percentile_50",
            StatField::P75 => "percentile_75",
            StatField::Max => "max_value",
            StatField::Mean => "mean",
            StatField::Median => "median",
            StatField::Std => "std",
            StatField::Skew => "skew",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }

    /// Counters are integers, everything else is floating point
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            StatField::Count | StatField::NullCount | StatField::DistinctCount
        )
    }

    /// Storage type recorded alongside derived thresholds
    pub fn value_type(&self) -> &'static str {
        if self.is_integer() {
            "int64"
        } else {
            "float64"
        }
    }
}

impl std::fmt::Display for StatField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// COLUMN PROFILE
// ============================================================================

/// Statistical fingerprint of one column at one capture time.
///
/// Range and moment fields are `None` for non-numeric columns, and for
/// numeric columns whose values could not be summarized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub dataset_name: String,
    pub column_name: String,
    pub data_type: ColumnType,

    pub count: i64,
    pub null_count: i64,
    pub null_percentage: f64,
    pub distinct_count: i64,

    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>,
    pub skew: Option<f64>,

    pub captured_at: DateTime<Utc>,
}

impl ColumnProfile {
    /// Value of one statistic, `None` when undefined
    pub fn stat(&self, field: StatField) -> Option<f64> {
        match field {
            StatField::Count => Some(self.count as f64),
            StatField::NullCount => Some(self.null_count as f64),
            StatField::NullPercentage => Some(self.null_percentage),
            StatField::DistinctCount => Some(self.distinct_count as f64),
            StatField::Min => self.min,
            StatField::P25 => self.p25,
            StatField::P50 => self.p50,
            StatField::P75 => self.p75,
            StatField::Max => self.max,
            StatField::Mean => self.mean,
            StatField::Median => self.median,
            StatField::Std => self.std,
            StatField::Skew => self.skew,
        }
    }

    /// Defined statistics in `StatField::ALL` order
    pub fn stats(&self) -> impl Iterator<Item = (StatField, f64)> + '_ {
        StatField::ALL
            .into_iter()
            .filter_map(move |field| self.stat(field).map(|v| (field, v)))
    }

    pub fn is_numeric(&self) -> bool {
        self.data_type.is_numeric()
    }

    /// Capture times are kept at microsecond precision, matching storage
    pub fn normalized(mut self) -> Self {
        self.captured_at = self.captured_at.trunc_subsecs(6);
        self
    }
}
