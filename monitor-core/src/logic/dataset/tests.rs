use super::*;
use chrono::{TimeZone, Utc};

#[test]
fn test_ragged_dataset_rejected() {
    let result = Dataset::new(
        "ragged",
        vec![
            Column::new("a", ColumnType::Int64, [1i64, 2, 3]),
            Column::new("b", ColumnType::Int64, [1i64, 2]),
        ],
    );

    match result {
        Err(IngestError::Malformed(msg)) => assert!(msg.contains("'b'")),
        other => panic!("Expected Malformed error, got {:?}", other),
    }
}

#[test]
fn test_duplicate_column_rejected() {
    let result = Dataset::new(
        "dup",
        vec![
            Column::new("a", ColumnType::Int64, [1i64]),
            Column::new("a", ColumnType::Text, ["x"]),
        ],
    );
    assert!(matches!(result, Err(IngestError::Malformed(_))));
}

#[test]
fn test_empty_dataset_has_no_rows() {
    let ds = Dataset::new("empty", vec![]).unwrap();
    assert_eq!(ds.row_count(), 0);
    assert_eq!(ds.column_count(), 0);
}

#[test]
fn test_nan_counts_as_null() {
    let col = Column::new(
        "f",
        ColumnType::Float64,
        [Value::Float(1.0), Value::Float(f64::NAN), Value::Null],
    );
    assert_eq!(col.count(), 1);
    assert_eq!(col.distinct_count(), 1);
}

#[test]
fn test_distinct_count_ignores_nulls() {
    let col = Column::new(
        "t",
        ColumnType::Text,
        [Some("a"), Some("b"), None, Some("a")],
    );
    assert_eq!(col.count(), 3);
    assert_eq!(col.distinct_count(), 2);

    let zeros = Column::new("z", ColumnType::Float64, [0.0f64, -0.0]);
    assert_eq!(zeros.distinct_count(), 1);

    let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let times = Column::new("ts", ColumnType::Timestamp, [ts, ts]);
    assert_eq!(times.distinct_count(), 1);
}

#[test]
fn test_column_type_round_trip_names() {
    for t in [
        ColumnType::Int64,
        ColumnType::Float64,
        ColumnType::Bool,
        ColumnType::Text,
        ColumnType::Timestamp,
        ColumnType::Date,
        ColumnType::Object,
    ] {
        assert_eq!(ColumnType::parse(t.as_str()), Some(t));
    }
    assert!(ColumnType::Int64.is_numeric());
    assert!(!ColumnType::Bool.is_numeric());
    assert_eq!(ColumnType::parse("varchar"), None);
}

#[tokio::test]
async fn test_in_memory_source_fetch() {
    let source = InMemorySource::new();
    let ds = Dataset::new(
        "squabble.debate",
        vec![Column::new("id", ColumnType::Int64, [1i64, 2])],
    )
    .unwrap();
    source.insert("squabble", "debate", ds.clone());

    let fetched = source.fetch("squabble", "debate").await.unwrap();
    assert_eq!(fetched, ds);

    match source.fetch("squabble", "missing").await {
        Err(IngestError::UnknownDataset(name)) => assert_eq!(name, "squabble.missing"),
        other => panic!("Expected UnknownDataset, got {:?}", other),
    }
}
