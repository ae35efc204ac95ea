//! Positional statement parameters.
//!
//! Requests carry a heterogeneous JSON list of scalars. Each element maps to
//! one [`SqlParam`] variant and binds through rusqlite's [`ToSql`].

use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single positional parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub enum SqlParam {
    Null,
    /// Bound as integer `0` / `1`.
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

/// A JSON value that has no scalar SQLite representation.
#[derive(Debug, Error)]
#[error("unsupported parameter type: expected string, number, boolean or null, got {0}")]
pub struct UnsupportedParam(&'static str);

impl TryFrom<serde_json::Value> for SqlParam {
    type Error = UnsupportedParam;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value as Json;

        match value {
            Json::Null => Ok(Self::Null),
            Json::Bool(b) => Ok(Self::Bool(b)),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Ok(Self::Integer(i)),
                // u64 above i64::MAX and all fractional values land here
                None => n.as_f64().map(Self::Real).ok_or(UnsupportedParam("number")),
            },
            Json::String(s) => Ok(Self::Text(s)),
            Json::Array(_) => Err(UnsupportedParam("array")),
            Json::Object(_) => Err(UnsupportedParam("object")),
        }
    }
}

impl From<SqlParam> for serde_json::Value {
    fn from(param: SqlParam) -> Self {
        match param {
            SqlParam::Null => serde_json::Value::Null,
            SqlParam::Bool(b) => b.into(),
            SqlParam::Integer(i) => i.into(),
            SqlParam::Real(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            SqlParam::Text(s) => s.into(),
        }
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for SqlParam {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<bool> for SqlParam {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlParam::Null => ToSqlOutput::Owned(Value::Null),
            SqlParam::Bool(b) => ToSqlOutput::Owned(Value::Integer(i64::from(*b))),
            SqlParam::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            SqlParam::Real(f) => ToSqlOutput::Owned(Value::Real(*f)),
            SqlParam::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}
