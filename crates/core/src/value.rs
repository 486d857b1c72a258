use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single warehouse cell, tagged by the runtime type it was decoded as.
///
/// The warehouse reports every cell over the wire as text; the adapter uses
/// the result schema to lift it into one of these variants so that callers
/// can match exhaustively instead of re-sniffing strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WarehouseValue {
    Null,
    Text(String),
    Integer64(i64),
    /// FLOAT64 / NUMERIC / BIGNUMERIC, carried as a double.
    Decimal(f64),
    Timestamp(DateTime<Utc>),
    /// Anything else (BOOL, BYTES, RECORD, ...) in its string form.
    Other(String),
}

impl WarehouseValue {
    pub fn is_null(&self) -> bool {
        matches!(self, WarehouseValue::Null)
    }
}

/// Canonical string form. NULL renders as the empty string.
impl fmt::Display for WarehouseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarehouseValue::Null => Ok(()),
            WarehouseValue::Text(s) | WarehouseValue::Other(s) => f.write_str(s),
            WarehouseValue::Integer64(n) => write!(f, "{n}"),
            WarehouseValue::Decimal(d) => write!(f, "{d}"),
            WarehouseValue::Timestamp(ts) => f.write_str(&format_round_trip(ts)),
        }
    }
}

/// Render a UTC instant as ISO-8601 with seven fractional digits and a `Z`
/// suffix, e.g. `2024-01-02T03:04:05.1234560Z`.
pub fn format_round_trip(ts: &DateTime<Utc>) -> String {
    // Leap-second nanos (>= 1e9) are clamped into the last representable tick.
    let ticks = ts.timestamp_subsec_nanos().min(999_999_999) / 100;
    let seconds = ts.to_rfc3339_opts(SecondsFormat::Secs, true);
    let base = seconds.trim_end_matches('Z');
    format!("{base}.{ticks:07}Z")
}

static NULL: WarehouseValue = WarehouseValue::Null;

/// One result row: column name to value, in result-set column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarehouseRow {
    columns: IndexMap<String, WarehouseValue>,
}

impl WarehouseRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for tests and fixtures.
    pub fn with(mut self, column: impl Into<String>, value: WarehouseValue) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: WarehouseValue) {
        self.columns.insert(column.into(), value);
    }

    /// Value of `column`, or `Null` when the row has no such column.
    pub fn get(&self, column: &str) -> &WarehouseValue {
        self.columns.get(column).unwrap_or(&NULL)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl FromIterator<(String, WarehouseValue)> for WarehouseRow {
    fn from_iter<I: IntoIterator<Item = (String, WarehouseValue)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}
