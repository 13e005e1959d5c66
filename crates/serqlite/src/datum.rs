use std::fmt::{self, Display, Formatter};

use rust_decimal::Decimal;
use time::{Date, PrimitiveDateTime, Time};

/// An application-level value: a native storage class refined by the column's declared type.
///
/// Columns with no special declared type decode to the variant matching their storage class.
#[derive(Clone, Debug, PartialEq)]
pub enum Datum {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
    /// Date and time of day with microsecond precision.
    Timestamp(PrimitiveDateTime),
    /// A date-only timestamp; the time of day is implicitly midnight.
    Date(Date),
    /// Written as text. A `DECIMAL` column has NUMERIC affinity, so SQLite may store it
    /// as a REAL, and digits beyond double precision (about 15 significant) are lost.
    Decimal(Decimal),
}

impl Datum {
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    /// The value as a full timestamp. Dates widen to midnight.
    pub fn as_timestamp(&self) -> Option<PrimitiveDateTime> {
        match self {
            Datum::Timestamp(ts) => Some(*ts),
            Datum::Date(d) => Some(PrimitiveDateTime::new(*d, Time::MIDNIGHT)),
            _ => None,
        }
    }

    /// Name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Datum::Null => "NULL",
            Datum::Bool(_) => "BOOLEAN",
            Datum::Integer(_) => "INTEGER",
            Datum::Float(_) => "REAL",
            Datum::Text(_) => "TEXT",
            Datum::Blob(_) => "BLOB",
            Datum::Timestamp(_) => "TIMESTAMP",
            Datum::Date(_) => "DATE",
            Datum::Decimal(_) => "DECIMAL",
        }
    }
}

impl Display for Datum {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Null => f.write_str("NULL"),
            Datum::Bool(v) => write!(f, "{v}"),
            Datum::Integer(v) => write!(f, "{v}"),
            Datum::Float(v) => write!(f, "{v}"),
            Datum::Text(v) => write!(f, "{v:?}"),
            Datum::Blob(v) => write!(f, "<{} byte blob>", v.len()),
            Datum::Timestamp(v) => write!(f, "{v}"),
            Datum::Date(v) => write!(f, "{v}"),
            Datum::Decimal(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for Datum {
    fn from(v: bool) -> Self {
        Datum::Bool(v)
    }
}

impl From<i64> for Datum {
    fn from(v: i64) -> Self {
        Datum::Integer(v)
    }
}

impl From<f64> for Datum {
    fn from(v: f64) -> Self {
        Datum::Float(v)
    }
}

impl From<&str> for Datum {
    fn from(v: &str) -> Self {
        Datum::Text(v.to_owned())
    }
}

impl From<String> for Datum {
    fn from(v: String) -> Self {
        Datum::Text(v)
    }
}

impl From<Vec<u8>> for Datum {
    fn from(v: Vec<u8>) -> Self {
        Datum::Blob(v)
    }
}

impl From<PrimitiveDateTime> for Datum {
    fn from(v: PrimitiveDateTime) -> Self {
        Datum::Timestamp(v)
    }
}

impl From<Date> for Datum {
    fn from(v: Date) -> Self {
        Datum::Date(v)
    }
}

impl From<Decimal> for Datum {
    fn from(v: Decimal) -> Self {
        Datum::Decimal(v)
    }
}

impl<T: Into<Datum>> From<Option<T>> for Datum {
    fn from(v: Option<T>) -> Self {
        v.map_or(Datum::Null, Into::into)
    }
}
