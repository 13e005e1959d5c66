//! Provides [`Decode`] for reading Rust values out of decoded rows.
use crate::{Datum, error::DecodeError};

/// A type that can be read from a decoded column value.
pub trait Decode<'r>: Sized {
    fn decode(value: &'r Datum) -> Result<Self, DecodeError>;
}

impl<'r, T> Decode<'r> for Option<T>
where
    T: Decode<'r>,
{
    fn decode(value: &'r Datum) -> Result<Self, DecodeError> {
        if value.is_null() {
            Ok(None)
        } else {
            Ok(Some(T::decode(value)?))
        }
    }
}

/// The error for a value that has the wrong kind for the requested type.
pub(crate) fn mismatch(value: &Datum, target: &str) -> DecodeError {
    if value.is_null() {
        DecodeError::UnexpectedNull
    } else {
        DecodeError::Conversion(format!("cannot decode {} as {target}", value.kind()))
    }
}
