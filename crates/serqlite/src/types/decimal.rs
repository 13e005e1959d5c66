use rust_decimal::Decimal;

use crate::{
    Datum, Value, codec,
    decode::{Decode, mismatch},
    encode::Encode,
    error::DecodeError,
};

impl Encode for Decimal {
    fn encode(self) -> Value {
        codec::encode(Datum::Decimal(self))
    }
}

impl<'r> Decode<'r> for Decimal {
    fn decode(value: &'r Datum) -> Result<Self, DecodeError> {
        match value {
            Datum::Decimal(v) => Ok(*v),
            Datum::Integer(v) => Ok(Decimal::from(*v)),
            _ => Err(mismatch(value, "Decimal")),
        }
    }
}
