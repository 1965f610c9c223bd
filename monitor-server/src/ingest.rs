//! Ingestion - source tables read from PostgreSQL
//!
//! Column types come from `information_schema.columns`. Every column is
//! selected with a normalizing cast so rows decode into a handful of
//! Rust types regardless of the exact Postgres type.

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};

use driftwatch_core::{Column, ColumnType, Dataset, DatasetSource, IngestError, Value};

const COLUMNS_SQL: &str = r#"
SELECT column_name::text, data_type::text
FROM information_schema.columns
WHERE table_schema = $1 AND table_name = $2
ORDER BY ordinal_position
"#;

pub struct PgSource {
    pool: PgPool,
}

impl PgSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DatasetSource for PgSource {
    async fn fetch(&self, schema: &str, table: &str) -> Result<Dataset, IngestError> {
        let columns: Vec<(String, String)> = sqlx::query_as(COLUMNS_SQL)
            .bind(schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(source_unreachable)?;

        if columns.is_empty() {
            return Err(IngestError::UnknownDataset(format!("{}.{}", schema, table)));
        }

        let specs: Vec<(String, ColumnType)> = columns
            .into_iter()
            .map(|(name, pg_type)| (name, column_type(&pg_type)))
            .collect();

        let rows = sqlx::query(&select_sql(schema, table, &specs))
            .fetch_all(&self.pool)
            .await
            .map_err(source_unreachable)?;

        tracing::debug!(
            "Fetched {}.{}: {} columns, {} rows",
            schema,
            table,
            specs.len(),
            rows.len()
        );

        let mut values: Vec<Vec<Value>> = vec![Vec::with_capacity(rows.len()); specs.len()];
        for row in &rows {
            for (index, (_, column_type)) in specs.iter().enumerate() {
                values[index].push(decode(row, index, *column_type)?);
            }
        }

        let columns = specs
            .into_iter()
            .zip(values)
            .map(|((name, column_type), values)| Column::new(name, column_type, values))
            .collect();

        Dataset::new(table, columns)
    }
}

fn source_unreachable(err: sqlx::Error) -> IngestError {
    IngestError::Unreachable(err.to_string())
}

/// Map an `information_schema` data type onto the profiled column types
pub(crate) fn column_type(pg_type: &str) -> ColumnType {
    match pg_type {
        "smallint" | "integer" | "bigint" => ColumnType::Int64,
        "real" | "double precision" | "numeric" => ColumnType::Float64,
        "boolean" => ColumnType::Bool,
        "timestamp without time zone" | "timestamp with time zone" => ColumnType::Timestamp,
        "date" => ColumnType::Date,
        "json" | "jsonb" | "ARRAY" | "USER-DEFINED" | "bytea" => ColumnType::Object,
        _ => ColumnType::Text,
    }
}

fn cast(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Int64 => "int8",
        ColumnType::Float64 => "float8",
        ColumnType::Bool => "bool",
        ColumnType::Timestamp => "timestamptz",
        ColumnType::Text | ColumnType::Date | ColumnType::Object => "text",
    }
}

pub(crate) fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

pub(crate) fn select_sql(schema: &str, table: &str, specs: &[(String, ColumnType)]) -> String {
    let projection = specs
        .iter()
        .map(|(name, column_type)| format!("{}::{}", quote_ident(name), cast(*column_type)))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "SELECT {} FROM {}.{}",
        projection,
        quote_ident(schema),
        quote_ident(table)
    )
}

fn decode(row: &PgRow, index: usize, column_type: ColumnType) -> Result<Value, IngestError> {
    let value = match column_type {
        ColumnType::Int64 => row.try_get::<Option<i64>, _>(index).map(Value::from),
        ColumnType::Float64 => row.try_get::<Option<f64>, _>(index).map(Value::from),
        ColumnType::Bool => row.try_get::<Option<bool>, _>(index).map(Value::from),
        ColumnType::Timestamp => row
            .try_get::<Option<DateTime<Utc>>, _>(index)
            .map(Value::from),
        ColumnType::Text | ColumnType::Date | ColumnType::Object => {
            row.try_get::<Option<String>, _>(index).map(Value::from)
        }
    };

    value.map_err(|e| IngestError::Malformed(format!("column #{}: {}", index, e)))
}
