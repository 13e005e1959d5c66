//! Conversion between native storage classes and application values.
//!
//! Encoding never needs the column's declared type. Decoding always does: the declared
//! type picks an [`Affinity`], and the affinity picks the decoder. A value whose
//! storage class or text does not fit its affinity is an error, never a silent fallback.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use time::macros::format_description as fd;
use time::{Date, PrimitiveDateTime};

use crate::datum::Datum;
use crate::error::DecodeError;
use crate::sqlite::{Affinity, Value};

const TIMESTAMP_PATTERN: &str = "YYYY-MM-DD HH:MM:SS[.ffffff]";
const DATE_PATTERN: &str = "YYYY-MM-DD";
const BOOLEAN_PATTERN: &str = "0 or 1";
const DECIMAL_PATTERN: &str = "a decimal number";

/// Encode an application value as a native value.
pub fn encode(datum: Datum) -> Value {
    match datum {
        Datum::Null => Value::Null,
        Datum::Bool(v) => Value::Integer(v as i64),
        Datum::Integer(v) => Value::Integer(v),
        Datum::Float(v) => Value::Float(v),
        Datum::Text(v) => Value::Text(v),
        Datum::Blob(v) => Value::Blob(v),
        Datum::Timestamp(v) => Value::Text(format_timestamp(&v)),
        Datum::Date(v) => Value::Text(format_date(&v)),
        Datum::Decimal(v) => Value::Text(v.to_string()),
    }
}

/// Decode a native value using the column's declared type.
pub fn decode(value: &Value, decltype: Option<&str>) -> Result<Datum, DecodeError> {
    decode_with(value, Affinity::from_decltype(decltype))
}

/// Decode a native value with an already resolved affinity.
///
/// `NULL` decodes to [`Datum::Null`] whatever the affinity.
pub fn decode_with(value: &Value, affinity: Affinity) -> Result<Datum, DecodeError> {
    if value.is_null() {
        return Ok(Datum::Null);
    }

    match affinity {
        Affinity::Timestamp => decode_timestamp(value),
        Affinity::Date => decode_date(value),
        Affinity::Boolean => decode_bool(value),
        Affinity::Decimal { scale } => decode_decimal(value, scale),
        Affinity::Native => Ok(native(value)),
    }
}

/// Format as `YYYY-MM-DD HH:MM:SS.ffffff`. Sub-microsecond precision is truncated.
pub(crate) fn format_timestamp(ts: &PrimitiveDateTime) -> String {
    format!(
        "{} {:02}:{:02}:{:02}.{:06}",
        format_date(&ts.date()),
        ts.hour(),
        ts.minute(),
        ts.second(),
        ts.microsecond()
    )
}

pub(crate) fn format_date(date: &Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

fn native(value: &Value) -> Datum {
    match value {
        Value::Null => Datum::Null,
        Value::Integer(v) => Datum::Integer(*v),
        Value::Float(v) => Datum::Float(*v),
        Value::Text(v) => Datum::Text(v.clone()),
        Value::Blob(v) => Datum::Blob(v.clone()),
    }
}

fn storage_mismatch(value: &Value, declared: Affinity) -> DecodeError {
    DecodeError::StorageClass {
        found: value.storage_class(),
        declared,
    }
}

fn pattern_mismatch(value: &Value, expected: &'static str) -> DecodeError {
    DecodeError::Pattern {
        raw: value.render(),
        expected,
    }
}

fn decode_timestamp(value: &Value) -> Result<Datum, DecodeError> {
    let Value::Text(text) = value else {
        return Err(storage_mismatch(value, Affinity::Timestamp));
    };

    let formats = &[
        fd!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
        fd!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ];

    formats
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(text, format).ok())
        .map(Datum::Timestamp)
        .ok_or_else(|| pattern_mismatch(value, TIMESTAMP_PATTERN))
}

fn decode_date(value: &Value) -> Result<Datum, DecodeError> {
    let Value::Text(text) = value else {
        return Err(storage_mismatch(value, Affinity::Date));
    };

    Date::parse(text, fd!("[year]-[month]-[day]"))
        .map(Datum::Date)
        .map_err(|_| pattern_mismatch(value, DATE_PATTERN))
}

fn decode_bool(value: &Value) -> Result<Datum, DecodeError> {
    match value {
        Value::Integer(0) => Ok(Datum::Bool(false)),
        Value::Integer(1) => Ok(Datum::Bool(true)),
        Value::Integer(_) => Err(pattern_mismatch(value, BOOLEAN_PATTERN)),
        _ => Err(storage_mismatch(value, Affinity::Boolean)),
    }
}

fn decode_decimal(value: &Value, scale: Option<u32>) -> Result<Datum, DecodeError> {
    let parsed = match value {
        Value::Integer(v) => Decimal::from(*v),
        Value::Float(v) => {
            if !v.is_finite() {
                return Err(pattern_mismatch(value, DECIMAL_PATTERN));
            }
            // Go through the shortest round-tripping text so 244.37 stays 244.37.
            parse_decimal(&v.to_string())
                .or_else(|| Decimal::from_f64_retain(*v))
                .ok_or_else(|| {
                    DecodeError::Conversion(format!("{v} is out of range for a decimal"))
                })?
        }
        Value::Text(text) => {
            parse_decimal(text.trim()).ok_or_else(|| pattern_mismatch(value, DECIMAL_PATTERN))?
        }
        _ => {
            return Err(storage_mismatch(value, Affinity::Decimal { scale }));
        }
    };

    Ok(Datum::Decimal(match scale {
        Some(scale) => parsed.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero),
        None => parsed,
    }))
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}
