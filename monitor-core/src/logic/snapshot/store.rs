use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, Transaction};

use super::types::{ColumnProfile, StatField};
use super::StoreError;
use crate::logic::dataset::ColumnType;
use crate::logic::threshold::{ThresholdKey, ThresholdRecord};

// ============================================================================
// CONSTANTS
// ============================================================================

const BUSY_TIMEOUT_MS: u64 = 5_000;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS snapshots (
    dataset_name TEXT NOT NULL,
    column_name TEXT NOT NULL,
    data_type TEXT NOT NULL,
    count INTEGER CHECK (count >= 0),
    count_of_null_records INTEGER CHECK (count_of_null_records >= 0),
    null_percentage REAL CHECK (null_percentage BETWEEN 0 AND 100),
    unique_values INTEGER CHECK (unique_values >= 0),
    min_value REAL,
    percentile_25 REAL,
    percentile_50 REAL,
    percentile_75 REAL,
    max_value REAL,
    mean REAL,
    median REAL,
    std REAL,
    skew REAL,
    snapshot_created_at TIMESTAMP NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_snapshots_key
    ON snapshots (dataset_name, column_name, snapshot_created_at);

CREATE TABLE IF NOT EXISTS snapshots_threshold (
    dataset_name TEXT NOT NULL,
    snapshot_field TEXT NOT NULL,
    source_field_name TEXT NOT NULL,
    data_type TEXT NOT NULL,
    lower_bound REAL,
    upper_bound REAL,
    snapshot_created_at TIMESTAMP NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_snapshots_threshold_key
    ON snapshots_threshold (dataset_name, snapshot_field, source_field_name);
"#;

const PROFILE_COLUMNS: &str = "dataset_name, column_name, data_type, count, count_of_null_records, \
     null_percentage, unique_values, min_value, percentile_25, percentile_50, percentile_75, \
     max_value, mean, median, std, skew, snapshot_created_at";

const THRESHOLD_COLUMNS: &str = "dataset_name, snapshot_field, source_field_name, data_type, \
     lower_bound, upper_bound, snapshot_created_at";

// ============================================================================
// STORE
// ============================================================================

/// Append-only profile log and keyed threshold table on one SQLite database.
///
/// Cloning is cheap; clones share the connection.
#[derive(Clone)]
pub struct SnapshotStore {
    pub(super) connection: Arc<Mutex<Connection>>,
}

impl SnapshotStore {
    /// Open (or create) the store at `path` and apply the schema
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let connection = Connection::open(path)?;
        connection.execute_batch("PRAGMA journal_mode = WAL;")?;
        connection.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;

        let store = Self::from_connection(connection);
        store.create_schema()?;
        log::info!("Snapshot store opened at {}", path.display());
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self::from_connection(Connection::open_in_memory()?);
        store.create_schema()?;
        Ok(store)
    }

    fn from_connection(connection: Connection) -> Self {
        Self {
            connection: Arc::new(Mutex::new(connection)),
        }
    }

    /// Create both tables if absent. Safe to call repeatedly.
    pub fn create_schema(&self) -> Result<(), StoreError> {
        self.connection.lock().execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Profiles
    // ------------------------------------------------------------------------

    /// Append one row per profile, all or nothing
    pub fn append(&self, profiles: &[ColumnProfile]) -> Result<Vec<ColumnProfile>, StoreError> {
        let stored: Vec<ColumnProfile> = profiles.iter().cloned().map(ColumnProfile::normalized).collect();

        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(&format!(
                "INSERT INTO snapshots ({}) VALUES \
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                PROFILE_COLUMNS
            ))?;

            for p in &stored {
                stmt.execute(params![
                    p.dataset_name,
                    p.column_name,
                    p.data_type.as_str(),
                    p.count,
                    p.null_count,
                    finite(Some(p.null_percentage)),
                    p.distinct_count,
                    finite(p.min),
                    finite(p.p25),
                    finite(p.p50),
                    finite(p.p75),
                    finite(p.max),
                    finite(p.mean),
                    finite(p.median),
                    finite(p.std),
                    finite(p.skew),
                    encode_timestamp(&p.captured_at),
                ])?;
            }
        }
        tx.commit()?;

        log::debug!("Appended {} profiles", stored.len());
        Ok(stored)
    }

    /// Most recent profile per column of `dataset_name`.
    /// An empty `column_names` selects every column.
    pub fn query_latest(
        &self,
        dataset_name: &str,
        column_names: &[String],
    ) -> Result<Vec<ColumnProfile>, StoreError> {
        let column_filter = if column_names.is_empty() {
            String::new()
        } else {
            let placeholders: Vec<String> = (0..column_names.len())
                .map(|i| format!("?{}", i + 2))
                .collect();
            format!(" AND column_name IN ({})", placeholders.join(", "))
        };

        let sql = format!(
            "SELECT {cols} FROM (
                SELECT {cols}, ROW_NUMBER() OVER (
                    PARTITION BY dataset_name, column_name
                    ORDER BY snapshot_created_at DESC, rowid DESC
                ) AS rn
                FROM snapshots
                WHERE dataset_name = ?1{filter}
             )
             WHERE rn = 1
             ORDER BY column_name",
            cols = PROFILE_COLUMNS,
            filter = column_filter
        );

        let bind = std::iter::once(dataset_name).chain(column_names.iter().map(String::as_str));

        let conn = self.connection.lock();
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params_from_iter(bind), map_profile_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Full profile history of a dataset, oldest first
    pub fn history(&self, dataset_name: &str) -> Result<Vec<ColumnProfile>, StoreError> {
        let conn = self.connection.lock();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM snapshots WHERE dataset_name = ?1 \
             ORDER BY column_name, snapshot_created_at, rowid",
            PROFILE_COLUMNS
        ))?;
        let rows = stmt.query_map(params![dataset_name], map_profile_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Number of stored profiles for a dataset
    pub fn snapshot_count(&self, dataset_name: &str) -> Result<usize, StoreError> {
        let count: i64 = self.connection.lock().query_row(
            "SELECT COUNT(*) FROM snapshots WHERE dataset_name = ?1",
            params![dataset_name],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    // ------------------------------------------------------------------------
    // Thresholds
    // ------------------------------------------------------------------------

    /// Delete-then-insert every record by key inside one transaction.
    /// Readers see either all old or all new bounds.
    pub fn replace_thresholds(&self, records: &[ThresholdRecord]) -> Result<usize, StoreError> {
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        write_thresholds(&tx, records)?;
        tx.commit()?;

        Ok(records.len())
    }

    /// Like `replace_thresholds`, and in the same transaction drops every
    /// record of `dataset_name` whose statistic is in `retired`
    pub fn replace_dataset_thresholds(
        &self,
        dataset_name: &str,
        records: &[ThresholdRecord],
        retired: &[StatField],
    ) -> Result<usize, StoreError> {
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;

        let mut removed = 0;
        {
            let mut delete = tx.prepare_cached(
                "DELETE FROM snapshots_threshold WHERE dataset_name = ?1 AND snapshot_field = ?2",
            )?;
            for field in retired {
                removed += delete.execute(params![dataset_name, field.as_str()])?;
            }
        }
        write_thresholds(&tx, records)?;
        tx.commit()?;

        if removed > 0 {
            log::info!("Retired {} thresholds of {}", removed, dataset_name);
        }
        Ok(records.len())
    }

    /// Parameterized lookup of the live threshold for one key
    pub fn threshold(&self, key: &ThresholdKey) -> Result<Option<ThresholdRecord>, StoreError> {
        let conn = self.connection.lock();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM snapshots_threshold \
             WHERE dataset_name = ?1 AND snapshot_field = ?2 AND source_field_name = ?3",
            THRESHOLD_COLUMNS
        ))?;
        let record = stmt
            .query_row(
                params![
                    key.dataset_name,
                    key.snapshot_field.as_str(),
                    key.source_field_name
                ],
                map_threshold_row,
            )
            .optional()?;
        Ok(record.flatten())
    }

    /// All live thresholds of a dataset
    pub fn thresholds(&self, dataset_name: &str) -> Result<Vec<ThresholdRecord>, StoreError> {
        let conn = self.connection.lock();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM snapshots_threshold WHERE dataset_name = ?1 \
             ORDER BY source_field_name, snapshot_field",
            THRESHOLD_COLUMNS
        ))?;
        let rows = stmt.query_map(params![dataset_name], map_threshold_row)?;

        let mut records = Vec::new();
        for row in rows {
            if let Some(record) = row? {
                records.push(record);
            }
        }
        Ok(records)
    }
}

fn write_thresholds(tx: &Transaction<'_>, records: &[ThresholdRecord]) -> Result<(), StoreError> {
    let mut delete = tx.prepare_cached(
        "DELETE FROM snapshots_threshold \
         WHERE dataset_name = ?1 AND snapshot_field = ?2 AND source_field_name = ?3",
    )?;
    let mut insert = tx.prepare_cached(&format!(
        "INSERT INTO snapshots_threshold ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        THRESHOLD_COLUMNS
    ))?;

    for r in records {
        delete.execute(params![
            r.dataset_name,
            r.snapshot_field.as_str(),
            r.source_field_name
        ])?;
        insert.execute(params![
            r.dataset_name,
            r.snapshot_field.as_str(),
            r.source_field_name,
            r.data_type,
            finite(Some(r.lower_bound)),
            finite(Some(r.upper_bound)),
            encode_timestamp(&r.computed_at),
        ])?;
    }
    Ok(())
}

// ============================================================================
// ROW MAPPING
// ============================================================================

fn map_profile_row(row: &Row<'_>) -> rusqlite::Result<ColumnProfile> {
    let data_type: String = row.get(2)?;
    let captured_at: String = row.get(16)?;

    Ok(ColumnProfile {
        dataset_name: row.get(0)?,
        column_name: row.get(1)?,
        data_type: ColumnType::parse(&data_type)
            .ok_or_else(|| conversion_error(2, format!("unknown data type '{}'", data_type)))?,
        count: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
        null_count: row.get::<_, Option<i64>>(4)?.unwrap_or(0),
        null_percentage: row.get::<_, Option<f64>>(5)?.unwrap_or(0.0),
        distinct_count: row.get::<_, Option<i64>>(6)?.unwrap_or(0),
        min: row.get(7)?,
        p25: row.get(8)?,
        p50: row.get(9)?,
        p75: row.get(10)?,
        max: row.get(11)?,
        mean: row.get(12)?,
        median: row.get(13)?,
        std: row.get(14)?,
        skew: row.get(15)?,
        captured_at: decode_timestamp(&captured_at).map_err(|e| conversion_error(16, e))?,
    })
}

/// Rows with an unknown statistic or NULL bounds carry no usable baseline
fn map_threshold_row(row: &Row<'_>) -> rusqlite::Result<Option<ThresholdRecord>> {
    let field: String = row.get(1)?;
    let computed_at: String = row.get(6)?;
    let lower: Option<f64> = row.get(4)?;
    let upper: Option<f64> = row.get(5)?;

    let (Some(snapshot_field), Some(lower_bound), Some(upper_bound)) =
        (StatField::parse(&field), lower, upper)
    else {
        log::warn!("Ignoring unusable threshold row for field '{}'", field);
        return Ok(None);
    };

    Ok(Some(ThresholdRecord {
        dataset_name: row.get(0)?,
        snapshot_field,
        source_field_name: row.get(2)?,
        data_type: row.get(3)?,
        lower_bound,
        upper_bound,
        computed_at: decode_timestamp(&computed_at).map_err(|e| conversion_error(6, e))?,
    }))
}

fn conversion_error(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, msg.into())
}

/// Missing statistics are stored as NULL, never as NaN
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Fixed-width RFC 3339 so that text order equals time order
pub(crate) fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp '{}': {}", s, e))
}
