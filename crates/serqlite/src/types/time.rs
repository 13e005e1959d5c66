use time::{Date, PrimitiveDateTime};

use crate::{
    Datum, Value, codec,
    decode::{Decode, mismatch},
    encode::Encode,
    error::DecodeError,
};

impl Encode for PrimitiveDateTime {
    fn encode(self) -> Value {
        codec::encode(Datum::Timestamp(self))
    }
}

impl<'r> Decode<'r> for PrimitiveDateTime {
    fn decode(value: &'r Datum) -> Result<Self, DecodeError> {
        value
            .as_timestamp()
            .ok_or_else(|| mismatch(value, "PrimitiveDateTime"))
    }
}

impl Encode for Date {
    fn encode(self) -> Value {
        codec::encode(Datum::Date(self))
    }
}

impl<'r> Decode<'r> for Date {
    fn decode(value: &'r Datum) -> Result<Self, DecodeError> {
        match value {
            Datum::Date(d) => Ok(*d),
            _ => Err(mismatch(value, "Date")),
        }
    }
}
