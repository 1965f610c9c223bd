use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::IngestError;

// ============================================================================
// COLUMN TYPE
// ============================================================================

/// Declared logical type of a source column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int64,
    Float64,
    Bool,
    Text,
    Timestamp,
    Date,
    /// Mixed or unrecognized values
    Object,
}

impl ColumnType {
    /// Only integer and floating-point columns get range statistics
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Int64 | ColumnType::Float64)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Int64 => "int64",
            ColumnType::Float64 => "float64",
            ColumnType::Bool => "bool",
            ColumnType::Text => "text",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Date => "date",
            ColumnType::Object => "object",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "int64" => Some(ColumnType::Int64),
            "float64" => Some(ColumnType::Float64),
            "bool" => Some(ColumnType::Bool),
            "text" => Some(ColumnType::Text),
            "timestamp" => Some(ColumnType::Timestamp),
            "date" => Some(ColumnType::Date),
            "object" => Some(ColumnType::Object),
            _ => None,
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// VALUE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Timestamp(DateTime<Utc>),
}

/// Hashable identity of a non-null value, for distinct counting
#[derive(Debug, PartialEq, Eq, Hash)]
enum DistinctKey<'a> {
    Int(i64),
    Float(u64),
    Bool(bool),
    Text(&'a str),
    Timestamp(i64),
}

impl Value {
    /// NaN floats count as missing, like SQL NULL
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) if !f.is_nan() => Some(*f),
            _ => None,
        }
    }

    fn distinct_key(&self) -> Option<DistinctKey<'_>> {
        match self {
            Value::Null => None,
            Value::Int(i) => Some(DistinctKey::Int(*i)),
            Value::Float(f) if f.is_nan() => None,
            // -0.0 and 0.0 are the same value
            Value::Float(f) => Some(DistinctKey::Float((*f + 0.0).to_bits())),
            Value::Bool(b) => Some(DistinctKey::Bool(*b)),
            Value::Text(s) => Some(DistinctKey::Text(s)),
            Value::Timestamp(t) => Some(DistinctKey::Timestamp(
                t.timestamp_nanos_opt().unwrap_or_else(|| t.timestamp()),
            )),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

// ============================================================================
// COLUMN
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data_type: ColumnType,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new<I, V>(name: impl Into<String>, data_type: ColumnType, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            name: name.into(),
            data_type,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of non-null values
    pub fn count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_null()).count()
    }

    /// Number of distinct non-null values
    pub fn distinct_count(&self) -> usize {
        self.values
            .iter()
            .filter_map(Value::distinct_key)
            .collect::<HashSet<_>>()
            .len()
    }
}

// ============================================================================
// DATASET
// ============================================================================

/// A named rectangular table, supplied fresh on every cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    name: String,
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Build a dataset, rejecting ragged or duplicated columns
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self, IngestError> {
        let name = name.into();
        let row_count = columns.first().map_or(0, |c| c.values.len());

        let mut seen = HashSet::new();
        for column in &columns {
            if column.values.len() != row_count {
                return Err(IngestError::Malformed(format!(
                    "{}: column '{}' has {} rows, expected {}",
                    name,
                    column.name,
                    column.values.len(),
                    row_count
                )));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(IngestError::Malformed(format!(
                    "{}: duplicate column '{}'",
                    name, column.name
                )));
            }
        }

        Ok(Self {
            name,
            columns,
            row_count,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}
