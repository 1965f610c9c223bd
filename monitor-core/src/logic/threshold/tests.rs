use super::*;
use crate::logic::snapshot::StatField;
use crate::logic::testing::{at_minute, numeric_profile, stable_history, text_profile};

fn find<'a>(records: &'a [ThresholdRecord], column: &str, field: StatField) -> Option<&'a ThresholdRecord> {
    records
        .iter()
        .find(|r| r.source_field_name == column && r.snapshot_field == field)
}

#[test]
fn test_tukey_fence() {
    // sorted [49, 50, 50, 51, 52]: Q1 = 50, Q3 = 51, IQR = 1
    assert_eq!(tukey_fence(&[50.0, 51.0, 49.0, 50.0, 52.0], 1.5), Some((48.5, 52.5)));
    assert_eq!(tukey_fence(&[7.0], 1.5), Some((7.0, 7.0)));
    assert_eq!(tukey_fence(&[], 1.5), None);
    assert_eq!(tukey_fence(&[f64::NAN], 1.5), None);
}

#[test]
fn test_mean_bounds_from_stable_history() {
    let deriver = ThresholdDeriver::default();
    let records = deriver.derive(&stable_history("ds"));

    let mean = find(&records, "value", StatField::Mean).unwrap();
    assert_eq!(mean.lower_bound, 48.5);
    assert_eq!(mean.upper_bound, 52.5);
    assert_eq!(mean.dataset_name, "ds");
    assert_eq!(mean.data_type, "float64");
    assert!(!mean.contains(200.0));
    assert!(mean.contains(50.0));

    let count = find(&records, "value", StatField::Count).unwrap();
    assert_eq!(count.data_type, "int64");
    assert!(count.is_zero_width());
}

#[test]
fn test_one_record_per_key() {
    let deriver = ThresholdDeriver::default();
    let mut history = stable_history("ds");
    history.push(text_profile("ds", "label", 3, 0));
    history.push(text_profile("ds", "label", 4, 1));

    let records = deriver.derive(&history);
    let mut keys: Vec<_> = records.iter().map(ThresholdRecord::key).collect();
    let total = keys.len();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), total);

    // 13 fields for "value", nothing for the text column "label"
    assert_eq!(records.iter().filter(|r| r.source_field_name == "value").count(), 13);
    assert_eq!(records.len(), 13);
}

#[test]
fn test_non_numeric_columns_get_no_bounds() {
    let deriver = ThresholdDeriver::default();
    let history = [
        text_profile("ds", "label", 3, 0),
        text_profile("ds", "label", 5, 1),
        text_profile("ds", "label", 40, 2),
    ];
    assert!(deriver.derive(&history).is_empty());
}

#[test]
fn test_excluded_fields() {
    let deriver = ThresholdDeriver::new(ThresholdConfig::without_counters());
    let records = deriver.derive(&stable_history("ds"));

    assert!(find(&records, "value", StatField::Count).is_none());
    assert!(find(&records, "value", StatField::NullCount).is_none());
    assert!(find(&records, "value", StatField::DistinctCount).is_none());
    assert!(find(&records, "value", StatField::NullPercentage).is_some());
    assert_eq!(records.len(), 10);
}

#[test]
fn test_groups_are_per_dataset_and_column() {
    let deriver = ThresholdDeriver::default();
    let history = vec![
        numeric_profile("a", "x", 10.0, 0),
        numeric_profile("b", "x", 1000.0, 0),
        numeric_profile("a", "y", 500.0, 0),
    ];
    let records = deriver.derive(&history);

    let ax = records
        .iter()
        .find(|r| r.dataset_name == "a" && r.source_field_name == "x" && r.snapshot_field == StatField::Mean)
        .unwrap();
    assert_eq!((ax.lower_bound, ax.upper_bound), (10.0, 10.0));
}

#[test]
fn test_derivation_is_deterministic() {
    let deriver = ThresholdDeriver::default();
    let history = stable_history("ds");
    let ts = at_minute(99);

    let first = deriver.derive_at(&history, ts);
    let second = deriver.derive_at(&history, ts);
    assert_eq!(first, second);
}

#[test]
fn test_derive_and_store_replaces_by_key() {
    let store = SnapshotStore::open_in_memory().unwrap();
    let deriver = ThresholdDeriver::default();
    store.append(&stable_history("ds")).unwrap();

    let first = deriver.derive_and_store(&store, "ds").unwrap();
    let second = deriver.derive_and_store(&store, "ds").unwrap();
    assert_eq!(first.len(), second.len());

    let stored = store.thresholds("ds").unwrap();
    assert_eq!(stored.len(), first.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.key(), b.key());
        assert_eq!(a.lower_bound.to_bits(), b.lower_bound.to_bits());
        assert_eq!(a.upper_bound.to_bits(), b.upper_bound.to_bits());
    }

    // A new outlier widens the fence; still a single live record
    store.append(&[numeric_profile("ds", "value", 200.0, 10)]).unwrap();
    deriver.derive_and_store(&store, "ds").unwrap();
    let key = ThresholdKey::new("ds", StatField::Mean, "value");
    let mean = store.threshold(&key).unwrap().unwrap();
    assert!(mean.upper_bound > 52.5);
    assert_eq!(store.thresholds("ds").unwrap().len(), first.len());
}

#[test]
fn test_excluded_fields_are_retired_from_store() {
    let store = SnapshotStore::open_in_memory().unwrap();
    store.append(&stable_history("ds")).unwrap();
    store.append(&stable_history("other")).unwrap();
    ThresholdDeriver::default().derive_and_store(&store, "ds").unwrap();
    ThresholdDeriver::default().derive_and_store(&store, "other").unwrap();

    let narrowed = ThresholdDeriver::new(ThresholdConfig::without_counters());
    let written = narrowed.derive_and_store(&store, "ds").unwrap();

    let live = store.thresholds("ds").unwrap();
    assert_eq!(live.len(), written.len());
    assert_eq!(live.len(), 10);
    assert!(live.iter().all(|r| !narrowed.config().is_excluded(r.snapshot_field)));
    assert!(store
        .threshold(&ThresholdKey::new("ds", StatField::Count, "value"))
        .unwrap()
        .is_none());

    // Other datasets keep their records
    assert_eq!(store.thresholds("other").unwrap().len(), 13);
}
