//! Decoding of BigQuery REST result pages into [`WarehouseRow`]s.
//!
//! The REST API sends every cell as a JSON string (or null) and leaves it to
//! the caller to interpret it against the result schema. This module does
//! that interpretation once, at the adapter boundary.

use chrono::{DateTime, Utc};
use gcp_bigquery_client::model::table_row::TableRow;
use gcp_bigquery_client::model::table_schema::TableSchema;
use serde_json::Value;

use userlake_core::{WarehouseRow, WarehouseValue};

/// Column definition returned with a query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WarehouseColumn {
    /// Column name as declared in the result set.
    pub name: String,
    /// BigQuery type, lowercased (e.g. "string", "integer", "timestamp").
    pub data_type: String,
}

/// Column list from a result schema. Missing schema yields no columns.
pub(crate) fn columns_from_schema(schema: Option<&TableSchema>) -> Vec<WarehouseColumn> {
    schema
        .and_then(|s| s.fields.as_ref())
        .map(|fields| {
            fields
                .iter()
                .map(|f| WarehouseColumn {
                    name: f.name.clone(),
                    data_type: format!("{:?}", f.r#type).to_lowercase(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Zip raw rows against `columns`. Cells beyond the schema are ignored and
/// short rows are padded with NULL.
pub(crate) fn decode_rows(columns: &[WarehouseColumn], rows: &[TableRow]) -> Vec<WarehouseRow> {
    rows.iter()
        .map(|row| {
            let cells = row.columns.as_deref().unwrap_or_default();
            columns
                .iter()
                .enumerate()
                .map(|(i, col)| {
                    let value = cells.get(i).and_then(|c| c.value.as_ref());
                    (col.name.clone(), decode_cell(value, &col.data_type))
                })
                .collect()
        })
        .collect()
}

/// Interpret one cell against its (lowercased) BigQuery type.
///
/// | BigQuery type | Value |
/// |---|---|
/// | `string` | `Text` |
/// | `integer`, `int64` | `Integer64` (fallback `Text`) |
/// | `float`, `float64`, `numeric`, `bignumeric` | `Decimal` (fallback `Text`) |
/// | `timestamp` | `Timestamp` (fallback `Text`) |
/// | `datetime`, `date` | `Text` |
/// | anything else | `Other` |
pub(crate) fn decode_cell(value: Option<&Value>, data_type: &str) -> WarehouseValue {
    let raw = match value {
        None | Some(Value::Null) => return WarehouseValue::Null,
        Some(Value::String(s)) => s.as_str(),
        Some(Value::Number(n)) => {
            return match n.as_i64() {
                Some(i) => WarehouseValue::Integer64(i),
                None => n
                    .as_f64()
                    .map(WarehouseValue::Decimal)
                    .unwrap_or_else(|| WarehouseValue::Other(n.to_string())),
            };
        }
        Some(other) => return WarehouseValue::Other(other.to_string()),
    };

    match data_type {
        "string" => WarehouseValue::Text(raw.to_string()),
        "integer" | "int64" => raw
            .parse::<i64>()
            .map(WarehouseValue::Integer64)
            .unwrap_or_else(|_| WarehouseValue::Text(raw.to_string())),
        "float" | "float64" | "numeric" | "bignumeric" | "big_numeric" => raw
            .parse::<f64>()
            .map(WarehouseValue::Decimal)
            .unwrap_or_else(|_| WarehouseValue::Text(raw.to_string())),
        "timestamp" => parse_epoch_seconds(raw)
            .map(WarehouseValue::Timestamp)
            .unwrap_or_else(|| WarehouseValue::Text(raw.to_string())),
        "datetime" | "date" => WarehouseValue::Text(raw.to_string()),
        _ => WarehouseValue::Other(raw.to_string()),
    }
}

/// Parse the REST encoding of a TIMESTAMP: seconds since the epoch as a
/// decimal, usually in scientific notation (`"1.704164645123456E9"`).
///
/// Done with integer arithmetic so microseconds survive; going through
/// `f64` would lose the last digit for present-day instants.
pub(crate) fn parse_epoch_seconds(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    let (mantissa, exponent) = match s.find(|c: char| c == 'e' || c == 'E') {
        Some(i) => (&s[..i], s[i + 1..].parse::<i32>().ok()?),
        None => (s, 0),
    };
    let (negative, mantissa) = match mantissa.strip_prefix('-') {
        Some(m) => (true, m),
        None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part
        .bytes()
        .chain(frac_part.bytes())
        .all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let digits: i128 = format!("{int_part}{frac_part}").parse().ok()?;
    // digits * 10^(exponent - frac_len) seconds, scaled to microseconds.
    let scale = exponent.checked_sub(i32::try_from(frac_part.len()).ok()?)?.checked_add(6)?;
    let magnitude = if scale >= 0 {
        digits.checked_mul(10i128.checked_pow(scale.unsigned_abs())?)?
    } else {
        digits / 10i128.checked_pow(scale.unsigned_abs())?
    };
    let micros = i64::try_from(if negative { -magnitude } else { magnitude }).ok()?;

    let secs = micros.div_euclid(1_000_000);
    let nanos = u32::try_from(micros.rem_euclid(1_000_000) * 1_000).ok()?;
    DateTime::from_timestamp(secs, nanos)
}
