//! PostgreSQL type mappings.
//!
//! Row values are decoded into JSON maps keyed by column name. Type
//! conversion uses a two-phase approach:
//! 1. `TypeCategory` classifies column types into logical categories
//! 2. Category-specific decoders handle the actual value extraction

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgRow, PgTypeInfo, PgValueRef};
use sqlx::{Column, Decode, Row as _, Type, TypeInfo};

/// One decoded result row: column name to JSON value.
pub type Row = serde_json::Map<String, JsonValue>;

// =============================================================================
// Type Classification
// =============================================================================

/// Logical category for column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Binary,
    Json,
    Uuid,
    Timestamp,
    Date,
    Time,
    Unknown,
}

/// Classify a PostgreSQL type name into a logical category.
pub fn categorize_type(type_name: &str) -> TypeCategory {
    let lower = type_name.to_lowercase();

    if lower.contains("decimal") || lower.contains("numeric") {
        return TypeCategory::Decimal;
    }

    if lower.contains("int") || lower.contains("serial") {
        return TypeCategory::Integer;
    }

    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }

    if lower.contains("float") || lower == "real" || lower == "double precision" {
        return TypeCategory::Float;
    }

    if lower == "json" || lower == "jsonb" {
        return TypeCategory::Json;
    }

    if lower == "uuid" {
        return TypeCategory::Uuid;
    }

    if lower == "bytea" {
        return TypeCategory::Binary;
    }

    if lower == "timestamp" || lower == "timestamptz" {
        return TypeCategory::Timestamp;
    }

    if lower == "date" {
        return TypeCategory::Date;
    }

    if lower == "time" || lower == "timetz" {
        return TypeCategory::Time;
    }

    // Everything else (varchar, text, char, name, ...) decodes as text
    TypeCategory::Unknown
}

// =============================================================================
// Decimal Type Support
// =============================================================================

/// Wrapper type for raw DECIMAL/NUMERIC values as strings.
/// This preserves the exact database representation.
#[derive(Debug)]
pub struct RawDecimal(pub String);

impl Type<sqlx::Postgres> for RawDecimal {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("numeric") || name.contains("decimal")
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for RawDecimal {
    fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::Postgres>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

// =============================================================================
// Timestamp Formatting
// =============================================================================

/// Format a timestamp as the engine-accepted ISO 8601 literal
/// (UTC, millisecond precision, `Z` suffix).
pub fn iso_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// =============================================================================
// Binary Encoding
// =============================================================================

/// Encode binary column data as a base64 JSON string.
pub fn encode_binary_value(bytes: &[u8]) -> JsonValue {
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    JsonValue::String(STANDARD.encode(bytes))
}

// =============================================================================
// Row to JSON Trait
// =============================================================================

/// Trait for converting database rows to JSON maps.
pub trait RowToJson {
    fn to_json_map(&self) -> Row;
}

impl RowToJson for PgRow {
    fn to_json_map(&self) -> Row {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let category = categorize_type(col.type_info().name());
                let value = decode_column(self, idx, category);
                (col.name().to_string(), value)
            })
            .collect()
    }
}

// =============================================================================
// Column Decoders
// =============================================================================

fn decode_column(row: &PgRow, idx: usize, category: TypeCategory) -> JsonValue {
    match category {
        TypeCategory::Decimal => decode_decimal(row, idx),
        TypeCategory::Integer => decode_integer(row, idx),
        TypeCategory::Boolean => decode_boolean(row, idx),
        TypeCategory::Float => decode_float(row, idx),
        TypeCategory::Binary => decode_binary(row, idx),
        TypeCategory::Json => decode_json(row, idx),
        TypeCategory::Uuid => decode_uuid(row, idx),
        TypeCategory::Timestamp => decode_timestamp(row, idx),
        TypeCategory::Date => decode_date(row, idx),
        TypeCategory::Time => decode_time(row, idx),
        TypeCategory::Unknown => decode_text(row, idx),
    }
}

fn decode_decimal(row: &PgRow, idx: usize) -> JsonValue {
    match row.try_get::<Option<RawDecimal>, _>(idx) {
        Ok(Some(v)) => JsonValue::String(v.0),
        Ok(None) => JsonValue::Null,
        Err(e) => {
            tracing::error!("Failed to decode NUMERIC: {:?}", e);
            JsonValue::Null
        }
    }
}

fn decode_integer(row: &PgRow, idx: usize) -> JsonValue {
    if let Ok(None) = row.try_get::<Option<i64>, _>(idx) {
        return JsonValue::Null;
    }
    if let Ok(Some(v)) = row.try_get::<Option<i16>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(Some(v)) = row.try_get::<Option<i32>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    JsonValue::Null
}

fn decode_boolean(row: &PgRow, idx: usize) -> JsonValue {
    row.try_get::<Option<bool>, _>(idx)
        .ok()
        .flatten()
        .map(JsonValue::Bool)
        .unwrap_or(JsonValue::Null)
}

fn decode_float(row: &PgRow, idx: usize) -> JsonValue {
    if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
        return serde_json::Number::from_f64(v)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(v.to_string()));
    }
    if let Ok(Some(v)) = row.try_get::<Option<f32>, _>(idx) {
        return serde_json::Number::from_f64(v as f64)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(v.to_string()));
    }
    JsonValue::Null
}

fn decode_binary(row: &PgRow, idx: usize) -> JsonValue {
    row.try_get::<Option<Vec<u8>>, _>(idx)
        .ok()
        .flatten()
        .map(|v| encode_binary_value(&v))
        .unwrap_or(JsonValue::Null)
}

fn decode_json(row: &PgRow, idx: usize) -> JsonValue {
    row.try_get::<Option<serde_json::Value>, _>(idx)
        .ok()
        .flatten()
        .unwrap_or(JsonValue::Null)
}

fn decode_uuid(row: &PgRow, idx: usize) -> JsonValue {
    row.try_get::<Option<uuid::Uuid>, _>(idx)
        .ok()
        .flatten()
        .map(|v| JsonValue::String(v.to_string()))
        .unwrap_or(JsonValue::Null)
}

fn decode_timestamp(row: &PgRow, idx: usize) -> JsonValue {
    // TIMESTAMPTZ decodes as DateTime<Utc>, plain TIMESTAMP as NaiveDateTime
    if let Ok(Some(v)) = row.try_get::<Option<DateTime<Utc>>, _>(idx) {
        return JsonValue::String(iso_timestamp(v));
    }
    if let Ok(Some(v)) = row.try_get::<Option<NaiveDateTime>, _>(idx) {
        return JsonValue::String(v.format("%Y-%m-%dT%H:%M:%S%.3f").to_string());
    }
    JsonValue::Null
}

fn decode_date(row: &PgRow, idx: usize) -> JsonValue {
    row.try_get::<Option<NaiveDate>, _>(idx)
        .ok()
        .flatten()
        .map(|v| JsonValue::String(v.format("%Y-%m-%d").to_string()))
        .unwrap_or(JsonValue::Null)
}

fn decode_time(row: &PgRow, idx: usize) -> JsonValue {
    row.try_get::<Option<NaiveTime>, _>(idx)
        .ok()
        .flatten()
        .map(|v| JsonValue::String(v.format("%H:%M:%S%.3f").to_string()))
        .unwrap_or(JsonValue::Null)
}

fn decode_text(row: &PgRow, idx: usize) -> JsonValue {
    row.try_get::<Option<String>, _>(idx)
        .ok()
        .flatten()
        .map(JsonValue::String)
        .unwrap_or(JsonValue::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_categorize_type_integer() {
        assert_eq!(categorize_type("INT4"), TypeCategory::Integer);
        assert_eq!(categorize_type("BIGINT"), TypeCategory::Integer);
        assert_eq!(categorize_type("SERIAL"), TypeCategory::Integer);
    }

    #[test]
    fn test_categorize_type_decimal() {
        assert_eq!(categorize_type("NUMERIC"), TypeCategory::Decimal);
        assert_eq!(categorize_type("DECIMAL"), TypeCategory::Decimal);
    }

    #[test]
    fn test_categorize_type_temporal() {
        assert_eq!(categorize_type("TIMESTAMP"), TypeCategory::Timestamp);
        assert_eq!(categorize_type("TIMESTAMPTZ"), TypeCategory::Timestamp);
        assert_eq!(categorize_type("DATE"), TypeCategory::Date);
        assert_eq!(categorize_type("TIME"), TypeCategory::Time);
    }

    #[test]
    fn test_categorize_type_text_falls_through() {
        assert_eq!(categorize_type("TEXT"), TypeCategory::Unknown);
        assert_eq!(categorize_type("VARCHAR"), TypeCategory::Unknown);
        assert_eq!(categorize_type("NAME"), TypeCategory::Unknown);
    }

    #[test]
    fn test_iso_timestamp_format() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 17, 30, 9).unwrap();
        assert_eq!(iso_timestamp(ts), "2024-03-05T17:30:09.000Z");
    }

    #[test]
    fn test_encode_binary_value() {
        assert_eq!(
            encode_binary_value(b"hello world"),
            JsonValue::String("aGVsbG8gd29ybGQ=".to_string())
        );
        assert_eq!(encode_binary_value(&[]), JsonValue::String("".to_string()));
    }
}
