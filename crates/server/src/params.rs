//! Query-string validation for the paginated listing.
//!
//! Values are never clamped: anything outside the allowed range is a 400.

/// A `limit` / `offset` value the client sent that we cannot accept.
///
/// The message is echoed to the client verbatim; it only ever contains the
/// client's own input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    #[error("Invalid integer value: '{raw}'.")]
    InvalidInteger { raw: String },

    #[error("Value '{raw}' must be between {min} and {max}.")]
    OutOfRange { raw: String, min: u32, max: u32 },
}

/// Default and inclusive bounds for one integer query parameter.
#[derive(Debug, Clone, Copy)]
pub struct BoundedParam {
    pub default: u32,
    pub min: u32,
    pub max: u32,
}

pub const LIMIT: BoundedParam = BoundedParam {
    default: 200,
    min: 1,
    max: 1000,
};

pub const OFFSET: BoundedParam = BoundedParam {
    default: 0,
    min: 0,
    max: 100_000,
};

impl BoundedParam {
    pub fn parse(&self, raw: Option<&str>) -> Result<u32, ParamError> {
        parse_bounded_int(raw, self.default, self.min, self.max)
    }
}

/// Parse an optional raw query value into `min..=max`.
///
/// - absent or whitespace-only → `default`
/// - anything but ASCII digits (signs included) → [`ParamError::InvalidInteger`]
/// - digits beyond `i32::MAX` → [`ParamError::InvalidInteger`]
/// - in-range digits → the value, otherwise [`ParamError::OutOfRange`]
pub fn parse_bounded_int(
    raw: Option<&str>,
    default: u32,
    min: u32,
    max: u32,
) -> Result<u32, ParamError> {
    let raw = match raw {
        Some(r) if !r.trim().is_empty() => r,
        _ => return Ok(default),
    };

    let invalid = || ParamError::InvalidInteger {
        raw: raw.to_string(),
    };
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let value = raw
        .parse::<i32>()
        .ok()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(invalid)?;

    if !(min..=max).contains(&value) {
        return Err(ParamError::OutOfRange {
            raw: raw.to_string(),
            min,
            max,
        });
    }
    Ok(value)
}
