use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Naive layouts tried after RFC3339; all are read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Layouts that carry an explicit offset.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

/// Parse a textual timestamp into a `DateTime<Utc>`, assuming UTC when the
/// text carries no offset.
///
/// Tries in order:
/// 1. RFC3339: `"2025-06-14T10:30:00Z"`, `"2025-06-14T10:30:00+02:00"`
/// 2. Explicit offset with a space separator: `"2025-06-14 10:30:00+00"`
/// 3. BigQuery's text rendering: `"2025-06-14 10:30:00.123 UTC"`
/// 4. Naive datetime: `"2025-06-14 10:30:00"`, `"2025-06-14T10:30:00.5"`
/// 5. Just date: `"2025-06-14"` (midnight UTC)
///
/// Returns `None` if all formats fail.
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let naive = value
        .strip_suffix(" UTC")
        .or_else(|| value.strip_suffix('Z'))
        .unwrap_or(value);
    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Some(ndt.and_utc());
        }
    }

    if let Ok(nd) = NaiveDate::parse_from_str(naive, "%Y-%m-%d") {
        return Some(nd.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}

/// Integer parse for a textual role: surrounding whitespace and a sign are
/// tolerated, anything else (including out-of-range) is `None`.
pub(crate) fn parse_role_text(value: &str) -> Option<i32> {
    value.trim().parse::<i32>().ok()
}

/// Round-half-to-even, then narrow to `i32` if it fits.
pub(crate) fn decimal_to_i32(value: f64) -> Option<i32> {
    let rounded = value.round_ties_even();
    if rounded.is_finite() && rounded >= f64::from(i32::MIN) && rounded <= f64::from(i32::MAX) {
        Some(rounded as i32)
    } else {
        None
    }
}
