use super::*;
use crate::logic::dataset::{ColumnType, Value};
use crate::logic::snapshot::StatField;
use chrono::TimeZone;

fn age_dataset() -> Dataset {
    Dataset::new(
        "people",
        vec![
            Column::new(
                "age",
                ColumnType::Int64,
                [10i64, 12, 14, 15, 15, 16, 18, 19, 20, 95],
            ),
            Column::new(
                "name",
                ColumnType::Text,
                ["a", "b", "c", "d", "e", "f", "g", "h", "i", "a"],
            ),
            Column::new(
                "score",
                ColumnType::Float64,
                [
                    Value::Float(1.5),
                    Value::Null,
                    Value::Float(2.5),
                    Value::Float(f64::NAN),
                    Value::Float(3.5),
                    Value::Null,
                    Value::Float(4.5),
                    Value::Null,
                    Value::Null,
                    Value::Null,
                ],
            ),
        ],
    )
    .unwrap()
}

#[test]
fn test_one_profile_per_column() {
    let ds = age_dataset();
    let profiles = profile(&ds, "squabble.people");

    assert_eq!(profiles.len(), ds.column_count());
    let names: Vec<_> = profiles.iter().map(|p| p.column_name.as_str()).collect();
    assert_eq!(names, vec!["age", "name", "score"]);

    let first = profiles[0].captured_at;
    assert!(profiles.iter().all(|p| p.captured_at == first));
    assert!(profiles.iter().all(|p| p.dataset_name == "squabble.people"));
}

#[test]
fn test_numeric_profile() {
    let profiles = profile(&age_dataset(), "people");
    let age = &profiles[0];

    assert_eq!(age.data_type, ColumnType::Int64);
    assert_eq!(age.count, 10);
    assert_eq!(age.null_count, 0);
    assert_eq!(age.null_percentage, 0.0);
    assert_eq!(age.distinct_count, 9);
    assert_eq!(age.min, Some(10.0));
    assert_eq!(age.max, Some(95.0));
    assert_eq!(age.p50, age.median);

    let (min, p25, median, p75, max) = (
        age.min.unwrap(),
        age.p25.unwrap(),
        age.median.unwrap(),
        age.p75.unwrap(),
        age.max.unwrap(),
    );
    assert!(min <= p25 && p25 <= median && median <= p75 && p75 <= max);
    assert!(p25 < p75, "p25 and p75 must be distinct quantiles");
    assert!(age.std.is_some());
    assert!(age.skew.unwrap() > 0.0);
}

#[test]
fn test_non_numeric_profile_has_no_range_stats() {
    let profiles = profile(&age_dataset(), "people");
    let name = &profiles[1];

    assert_eq!(name.count, 10);
    assert_eq!(name.distinct_count, 9);
    for field in [
        StatField::Min,
        StatField::P25,
        StatField::P50,
        StatField::P75,
        StatField::Max,
        StatField::Mean,
        StatField::Median,
        StatField::Std,
        StatField::Skew,
    ] {
        assert_eq!(name.stat(field), None, "{} should be undefined", field);
    }
}

#[test]
fn test_nulls_and_nan_excluded_from_stats() {
    let profiles = profile(&age_dataset(), "people");
    let score = &profiles[2];

    assert_eq!(score.count, 4);
    assert_eq!(score.null_count, 6);
    assert!((score.null_percentage - 60.0).abs() < 1e-9);
    assert_eq!(score.min, Some(1.5));
    assert_eq!(score.max, Some(4.5));
    assert_eq!(score.mean, Some(3.0));
}

#[test]
fn test_all_null_column() {
    let ds = Dataset::new(
        "nulls",
        vec![Column::new("x", ColumnType::Float64, [Value::Null, Value::Null, Value::Null])],
    )
    .unwrap();
    let p = &profile(&ds, "nulls")[0];

    assert_eq!(p.count, 0);
    assert_eq!(p.null_count, 3);
    assert_eq!(p.null_percentage, 100.0);
    assert_eq!(p.distinct_count, 0);
    assert!(p.min.is_none() && p.max.is_none() && p.mean.is_none() && p.std.is_none());
}

#[test]
fn test_empty_dataset() {
    let no_columns = Dataset::new("empty", vec![]).unwrap();
    assert!(profile(&no_columns, "empty").is_empty());

    let no_rows = Dataset::new(
        "no_rows",
        vec![Column::new("x", ColumnType::Int64, Vec::<i64>::new())],
    )
    .unwrap();
    let p = &profile(&no_rows, "no_rows")[0];
    assert_eq!(p.count, 0);
    assert_eq!(p.null_percentage, 0.0);
    assert!(p.min.is_none());
}

#[test]
fn test_unreadable_numeric_column_keeps_counts() {
    let ds = Dataset::new(
        "mixed",
        vec![
            Column::new(
                "n",
                ColumnType::Int64,
                [Value::Int(1), Value::Text("oops".into()), Value::Int(3)],
            ),
            Column::new("ok", ColumnType::Int64, [1i64, 2, 3]),
        ],
    )
    .unwrap();
    let profiles = profile(&ds, "mixed");

    assert_eq!(profiles[0].count, 3);
    assert!(profiles[0].min.is_none());
    assert!(profiles[0].mean.is_none());
    assert_eq!(profiles[1].mean, Some(2.0));
}

#[test]
fn test_single_value_moments_undefined() {
    let ds = Dataset::new("one", vec![Column::new("x", ColumnType::Int64, [42i64])]).unwrap();
    let p = &profile(&ds, "one")[0];

    assert_eq!(p.min, Some(42.0));
    assert_eq!(p.p25, Some(42.0));
    assert_eq!(p.p75, Some(42.0));
    assert_eq!(p.std, None);
    assert_eq!(p.skew, None);
}

#[test]
fn test_profile_at_truncates_to_micros() {
    let ts = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
    let ds = Dataset::new("t", vec![Column::new("x", ColumnType::Int64, [1i64])]).unwrap();
    let p = &profile_at(&ds, "t", ts)[0];

    assert_eq!(p.captured_at.timestamp_subsec_nanos(), 123_456_000);
}

#[test]
fn test_quantiles_are_ordered() {
    let samples: Vec<Vec<f64>> = vec![
        vec![-40.0, -3.5, -3.5, 0.0, 12.25],
        vec![7.0, 7.0, 7.0, 7.0],
        vec![0.1, 1e6, -1e6, 0.2, 0.3, 0.3],
        vec![2.5, -0.75],
        vec![-1.0],
        vec![3.0, 1.0, 2.0, 1.0, 3.0, 2.0, 100.0, -100.0, 0.5],
    ];

    for (i, sample) in samples.iter().enumerate() {
        let ds = Dataset::new(
            "sample",
            vec![Column::new("x", ColumnType::Float64, sample.iter().copied())],
        )
        .unwrap();
        let p = &profile(&ds, "sample")[0];

        let ordered = [p.min, p.p25, p.median, p.p75, p.max]
            .map(|v| v.unwrap_or_else(|| panic!("sample #{} missing a quantile", i)));
        assert!(
            ordered.windows(2).all(|w| w[0] <= w[1]),
            "sample #{} not ordered: {:?}",
            i,
            ordered
        );
        assert_eq!(p.p50, p.median);
        assert!(p.min <= p.mean && p.mean <= p.max, "sample #{} mean out of range", i);
    }
}
