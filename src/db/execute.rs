//! Statement execution against a live connection.
//!
//! The executor binds a [`CompiledStatement`]'s values positionally, runs
//! it, and converts driver rows into JSON-valued maps. Single-row mode
//! truncates to row 0 (or an explicit absent value) without erroring;
//! driver failures propagate untouched as [`Error::Execution`] — no retry,
//! no classification.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::{Map, Value as Json};
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Client, Row as PgRow};

use crate::ast::CompiledStatement;
use crate::error::{Error, Result};

/// One result row: column name → raw driver value.
pub type Row = Map<String, Json>;

/// Executor output. Carries the single-row/multi-row distinction so the
/// post-processing step never has to branch on it.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultSet {
    Single(Option<Row>),
    Rows(Vec<Row>),
}

impl ResultSet {
    /// Apply single-row truncation: row 0 for a point lookup, absent when
    /// the set is empty — never an error.
    pub fn from_rows(one: bool, mut rows: Vec<Row>) -> Self {
        if one {
            let first = if rows.is_empty() {
                None
            } else {
                Some(rows.swap_remove(0))
            };
            ResultSet::Single(first)
        } else {
            ResultSet::Rows(rows)
        }
    }

    pub fn into_json(self) -> Json {
        match self {
            ResultSet::Single(None) => Json::Null,
            ResultSet::Single(Some(row)) => Json::Object(row),
            ResultSet::Rows(rows) => Json::Array(rows.into_iter().map(Json::Object).collect()),
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            ResultSet::Single(None) => 0,
            ResultSet::Single(Some(_)) => 1,
            ResultSet::Rows(rows) => rows.len(),
        }
    }
}

/// Run a compiled statement. `one` selects single-row mode.
pub async fn execute(client: &Client, stmt: &CompiledStatement, one: bool) -> Result<ResultSet> {
    let params: Vec<&(dyn ToSql + Sync)> = stmt
        .values
        .iter()
        .map(|v| v as &(dyn ToSql + Sync))
        .collect();
    tracing::debug!(sql = %stmt.sql, params = params.len(), one, "executing statement");
    let rows = client
        .query(&stmt.sql, &params)
        .await
        .map_err(Error::execution)?;
    Ok(ResultSet::from_rows(
        one,
        rows.iter().map(row_to_json).collect(),
    ))
}

fn row_to_json(row: &PgRow) -> Row {
    let mut out = Map::new();
    for (idx, col) in row.columns().iter().enumerate() {
        out.insert(col.name().to_string(), extract_value(row, idx, col.type_()));
    }
    out
}

fn extract_value(row: &PgRow, idx: usize, pg_type: &Type) -> Json {
    match *pg_type {
        Type::BOOL => row
            .try_get::<_, Option<bool>>(idx)
            .ok()
            .flatten()
            .map(Json::Bool)
            .unwrap_or(Json::Null),
        Type::INT2 => row
            .try_get::<_, Option<i16>>(idx)
            .ok()
            .flatten()
            .map(|v| Json::from(v as i64))
            .unwrap_or(Json::Null),
        Type::INT4 => row
            .try_get::<_, Option<i32>>(idx)
            .ok()
            .flatten()
            .map(|v| Json::from(v as i64))
            .unwrap_or(Json::Null),
        Type::INT8 => row
            .try_get::<_, Option<i64>>(idx)
            .ok()
            .flatten()
            .map(Json::from)
            .unwrap_or(Json::Null),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(idx)
            .ok()
            .flatten()
            .and_then(|v| serde_json::Number::from_f64(v as f64))
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Type::FLOAT8 | Type::NUMERIC => row
            .try_get::<_, Option<f64>>(idx)
            .ok()
            .flatten()
            .and_then(serde_json::Number::from_f64)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Type::TEXT | Type::VARCHAR | Type::NAME | Type::CHAR | Type::BPCHAR => row
            .try_get::<_, Option<String>>(idx)
            .ok()
            .flatten()
            .map(Json::String)
            .unwrap_or(Json::Null),
        Type::BYTEA => row
            .try_get::<_, Option<Vec<u8>>>(idx)
            .ok()
            .flatten()
            .map(|bytes| Json::String(hex_encode(&bytes)))
            .unwrap_or(Json::Null),
        Type::DATE => row
            .try_get::<_, Option<NaiveDate>>(idx)
            .ok()
            .flatten()
            .map(|v| Json::String(v.to_string()))
            .unwrap_or(Json::Null),
        Type::TIME => row
            .try_get::<_, Option<NaiveTime>>(idx)
            .ok()
            .flatten()
            .map(|v| Json::String(v.to_string()))
            .unwrap_or(Json::Null),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(idx)
            .ok()
            .flatten()
            .map(|v| Json::String(v.to_string()))
            .unwrap_or(Json::Null),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)
            .ok()
            .flatten()
            .map(|v| Json::String(v.to_rfc3339()))
            .unwrap_or(Json::Null),
        Type::JSON | Type::JSONB => row
            .try_get::<_, Option<Json>>(idx)
            .ok()
            .flatten()
            .unwrap_or(Json::Null),
        _ => {
            // Fallback: read as text where the driver allows it.
            row.try_get::<_, Option<String>>(idx)
                .ok()
                .flatten()
                .map(Json::String)
                .unwrap_or(Json::Null)
        }
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("\\x");
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
