use std::fmt::{self, Display, Formatter};

use atoi::atoi;

/// The decode strategy chosen for a result column from its declared type.
///
/// SQLite only records the declared type name as text. Matching is case-insensitive
/// and substring based, following SQLite's own affinity rules
/// (<https://www.sqlite.org/datatype3.html#affname>). This means custom type names
/// such as `MY_DATE_THING` or `BOOLEANISH` also select an affinity.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Affinity {
    /// `DATETIME`, `TIMESTAMP`: text as `YYYY-MM-DD HH:MM:SS[.ffffff]`.
    Timestamp,
    /// `DATE`: text as `YYYY-MM-DD`.
    Date,
    /// `BOOLEAN`, `BOOL`: integer 0 or 1.
    Boolean,
    /// `DECIMAL` and `DECIMAL(p, s)`: exact decimal, rounded to `scale` when declared.
    ///
    /// The engine applies NUMERIC affinity to these columns and may store values as REAL,
    /// so only about 15 significant digits survive a round trip.
    Decimal { scale: Option<u32> },
    /// No declared type, or one without a special affinity: pass the storage class through.
    Native,
}

/// The largest scale `rust_decimal` can represent.
pub(crate) const MAX_DECIMAL_SCALE: u32 = 28;

type Classify = fn(&str) -> Affinity;

/// Markers checked in order against the lower-cased declared type; the first hit wins.
///
/// `datetime` must precede `date` so that `DATETIME` is not read as a date-only column.
const MARKERS: &[(&str, Classify)] = &[
    ("datetime", timestamp),
    ("timestamp", timestamp),
    ("date", date),
    ("boolean", boolean),
    ("bool", boolean),
    ("decimal", decimal),
];

fn timestamp(_: &str) -> Affinity {
    Affinity::Timestamp
}

fn date(_: &str) -> Affinity {
    Affinity::Date
}

fn boolean(_: &str) -> Affinity {
    Affinity::Boolean
}

fn decimal(decl: &str) -> Affinity {
    Affinity::Decimal {
        scale: decimal_scale(decl),
    }
}

/// Extract `s` from a declaration like `DECIMAL(p, s)`.
///
/// A bare `DECIMAL` or `DECIMAL(p)` carries no scale and is not rounded.
fn decimal_scale(decl: &str) -> Option<u32> {
    let open = decl.find('(')?;
    let close = open + decl[open..].find(')')?;
    let mut parts = decl[open + 1..close].split(',');
    let _precision = parts.next()?;
    let scale = parts.next()?.trim();
    atoi::<u32>(scale.as_bytes()).map(|s| s.min(MAX_DECIMAL_SCALE))
}

impl Affinity {
    pub fn from_decltype(decltype: Option<&str>) -> Self {
        let Some(decl) = decltype else {
            return Affinity::Native;
        };
        let lowered = decl.to_ascii_lowercase();

        MARKERS
            .iter()
            .find(|(marker, _)| lowered.contains(marker))
            .map(|(_, classify)| classify(&lowered))
            .unwrap_or(Affinity::Native)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Affinity::Timestamp => "TIMESTAMP",
            Affinity::Date => "DATE",
            Affinity::Boolean => "BOOLEAN",
            Affinity::Decimal { .. } => "DECIMAL",
            Affinity::Native => "NATIVE",
        }
    }
}

impl Display for Affinity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}
