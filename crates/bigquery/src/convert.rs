//! Row mapping: one [`WarehouseRow`] in, one [`UserRecord`] out.
//!
//! Mapping is total. Unexpected types or unparseable values never fail a
//! request; they degrade to `null` (or to the generic string form for the
//! timestamp fields, which should not happen against the real table).

mod parsing;


use userlake_core::{format_round_trip, UserRecord, WarehouseRow, WarehouseValue};

use parsing::{decimal_to_i32, parse_role_text, parse_timestamp};

/// Convert a page of warehouse rows, preserving row order.
pub fn map_rows(rows: &[WarehouseRow]) -> Vec<UserRecord> {
    rows.iter().map(map_row).collect()
}

/// Convert one warehouse row into a [`UserRecord`].
///
/// # Field rules
///
/// - `user_id`, `email`: canonical string form, NULL → `""`
/// - `phone_number`, `full_name`: canonical string form, NULL stays `None`
/// - `role`: INT64 / NUMERIC narrowed to `i32`, text parsed as an integer;
///   anything else or out of range → `None`
/// - `created_at`, `updated_at`: rendered as UTC round-trip ISO-8601
pub fn map_row(row: &WarehouseRow) -> UserRecord {
    UserRecord {
        user_id: row.get("user_id").to_string(),
        email: row.get("email").to_string(),
        phone_number: optional_text(row.get("phone_number")),
        full_name: optional_text(row.get("full_name")),
        role: role(row.get("role")),
        created_at: timestamp(row.get("created_at")),
        updated_at: timestamp(row.get("updated_at")),
    }
}

fn optional_text(value: &WarehouseValue) -> Option<String> {
    (!value.is_null()).then(|| value.to_string())
}

fn role(value: &WarehouseValue) -> Option<i32> {
    match value {
        WarehouseValue::Integer64(n) => i32::try_from(*n).ok(),
        WarehouseValue::Decimal(d) => decimal_to_i32(*d),
        WarehouseValue::Text(s) => parse_role_text(s),
        WarehouseValue::Null | WarehouseValue::Timestamp(_) | WarehouseValue::Other(_) => None,
    }
}

fn timestamp(value: &WarehouseValue) -> Option<String> {
    match value {
        WarehouseValue::Null => None,
        WarehouseValue::Timestamp(ts) => Some(format_round_trip(ts)),
        WarehouseValue::Text(s) => parse_timestamp(s).map(|ts| format_round_trip(&ts)),
        // Not expected for a TIMESTAMP column; keep whatever we got.
        WarehouseValue::Integer64(_) | WarehouseValue::Decimal(_) | WarehouseValue::Other(_) => {
            Some(value.to_string())
        }
    }
}
