//! Fixtures shared by the module tests

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::logic::dataset::ColumnType;
use crate::logic::snapshot::ColumnProfile;

pub fn at_minute(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() + Duration::minutes(minute)
}

/// Numeric profile whose range and moment fields all derive from `mean`
pub fn numeric_profile(dataset: &str, column: &str, mean: f64, minute: i64) -> ColumnProfile {
    ColumnProfile {
        dataset_name: dataset.to_string(),
        column_name: column.to_string(),
        data_type: ColumnType::Float64,
        count: 100,
        null_count: 0,
        null_percentage: 0.0,
        distinct_count: 90,
        min: Some(mean - 10.0),
        p25: Some(mean - 5.0),
        p50: Some(mean),
        p75: Some(mean + 5.0),
        max: Some(mean + 10.0),
        mean: Some(mean),
        median: Some(mean),
        std: Some(4.0),
        skew: Some(0.0),
        captured_at: at_minute(minute),
    }
}

pub fn text_profile(dataset: &str, column: &str, distinct: i64, minute: i64) -> ColumnProfile {
    ColumnProfile {
        dataset_name: dataset.to_string(),
        column_name: column.to_string(),
        data_type: ColumnType::Text,
        count: 100,
        null_count: 0,
        null_percentage: 0.0,
        distinct_count: distinct,
        min: None,
        p25: None,
        p50: None,
        p75: None,
        max: None,
        mean: None,
        median: None,
        std: None,
        skew: None,
        captured_at: at_minute(minute),
    }
}

/// Five stable captures of `dataset.value` with means 50, 51, 49, 50, 52
pub fn stable_history(dataset: &str) -> Vec<ColumnProfile> {
    [50.0, 51.0, 49.0, 50.0, 52.0]
        .into_iter()
        .enumerate()
        .map(|(i, mean)| numeric_profile(dataset, "value", mean, i as i64))
        .collect()
}
