//! Profiler Module - Column fingerprints
//!
//! Computes a fixed set of summary statistics for every column of a dataset.
//! Pure over its input: no storage, no clock beyond the capture timestamp.

pub mod stats;

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};

use crate::logic::dataset::{Column, Dataset};
use crate::logic::snapshot::ColumnProfile;
use stats::NumericSummary;

/// Profile every column of `dataset`, stamped with the current time
pub fn profile(dataset: &Dataset, dataset_name: &str) -> Vec<ColumnProfile> {
    profile_at(dataset, dataset_name, Utc::now())
}

/// Profile every column with one shared capture timestamp
pub fn profile_at(
    dataset: &Dataset,
    dataset_name: &str,
    captured_at: DateTime<Utc>,
) -> Vec<ColumnProfile> {
    log::debug!(
        "Profiling {} ({} columns, {} rows)",
        dataset_name,
        dataset.column_count(),
        dataset.row_count()
    );

    dataset
        .columns()
        .iter()
        .map(|column| profile_column(column, dataset.row_count(), dataset_name, captured_at))
        .map(ColumnProfile::normalized)
        .collect()
}

fn profile_column(
    column: &Column,
    total_rows: usize,
    dataset_name: &str,
    captured_at: DateTime<Utc>,
) -> ColumnProfile {
    let count = column.count();
    let null_count = total_rows.saturating_sub(count);
    let null_percentage = if total_rows == 0 {
        0.0
    } else {
        null_count as f64 / total_rows as f64 * 100.0
    };

    let summary = if column.data_type.is_numeric() {
        numeric_values(column, dataset_name).and_then(|values| NumericSummary::compute(&values))
    } else {
        None
    };

    ColumnProfile {
        dataset_name: dataset_name.to_string(),
        column_name: column.name.clone(),
        data_type: column.data_type,
        count: count as i64,
        null_count: null_count as i64,
        null_percentage,
        distinct_count: column.distinct_count() as i64,
        min: summary.map(|s| s.min),
        p25: summary.map(|s| s.p25),
        p50: summary.map(|s| s.median),
        p75: summary.map(|s| s.p75),
        max: summary.map(|s| s.max),
        mean: summary.map(|s| s.mean),
        median: summary.map(|s| s.median),
        std: summary.and_then(|s| s.std),
        skew: summary.and_then(|s| s.skew),
        captured_at,
    }
}

/// Non-null values as `f64`; `None` if any value is not numeric
fn numeric_values(column: &Column, dataset_name: &str) -> Option<Vec<f64>> {
    let mut values = Vec::with_capacity(column.values.len());

    for value in column.values.iter().filter(|v| !v.is_null()) {
        match value.as_f64() {
            Some(v) if v.is_finite() => values.push(v),
            _ => {
                log::warn!(
                    "{}.{}: declared {} but holds unreadable value {:?}, statistics left undefined",
                    dataset_name,
                    column.name,
                    column.data_type,
                    value
                );
                return None;
            }
        }
    }

    Some(values)
}
