//! Parameter binding for PostgreSQL queries.
//!
//! `SqlParam` is the positional-parameter value type accepted by the query
//! and exec operations; `bind_param` attaches one value to a query object.

use serde_json::Value as JsonValue;
use sqlx::Postgres;
use sqlx::postgres::PgArguments;
use sqlx::types::Json;

/// A positional statement parameter.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum SqlParam {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Json(JsonValue),
}

impl From<bool> for SqlParam {
    fn from(v: bool) -> Self {
        SqlParam::Bool(v)
    }
}

impl From<i32> for SqlParam {
    fn from(v: i32) -> Self {
        SqlParam::Int(v as i64)
    }
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::Int(v)
    }
}

impl From<f64> for SqlParam {
    fn from(v: f64) -> Self {
        SqlParam::Float(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::String(v.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::String(v)
    }
}

/// Bind a parameter to a PostgreSQL query.
pub(crate) fn bind_param<'q>(
    query: sqlx::query::Query<'q, Postgres, PgArguments>,
    param: &'q SqlParam,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match param {
        SqlParam::Null => query.bind(None::<String>),
        SqlParam::Bool(v) => query.bind(*v),
        SqlParam::Int(v) => query.bind(*v),
        SqlParam::Float(v) => query.bind(*v),
        SqlParam::String(v) => query.bind(v.as_str()),
        SqlParam::Json(v) => query.bind(Json(v)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_conversions() {
        assert_eq!(SqlParam::from(7i64), SqlParam::Int(7));
        assert_eq!(SqlParam::from(7i32), SqlParam::Int(7));
        assert_eq!(SqlParam::from(true), SqlParam::Bool(true));
        assert_eq!(SqlParam::from("x"), SqlParam::String("x".to_string()));
    }

    #[test]
    fn test_serde_untagged() {
        let param: SqlParam = serde_json::from_str("42").unwrap();
        assert_eq!(param, SqlParam::Int(42));

        let param: SqlParam = serde_json::from_str("\"hello\"").unwrap();
        assert_eq!(param, SqlParam::String("hello".to_string()));

        let param: SqlParam = serde_json::from_str("null").unwrap();
        assert_eq!(param, SqlParam::Null);
    }
}
