use crate::{
    Datum, Value,
    decode::{Decode, mismatch},
    encode::Encode,
    error::DecodeError,
};

impl Encode for bool {
    fn encode(self) -> Value {
        Value::Integer(self.into())
    }
}

impl<'r> Decode<'r> for bool {
    fn decode(value: &'r Datum) -> Result<bool, DecodeError> {
        match value {
            Datum::Bool(v) => Ok(*v),
            // Expression columns carry no declared type.
            Datum::Integer(0) => Ok(false),
            Datum::Integer(1) => Ok(true),
            _ => Err(mismatch(value, "bool")),
        }
    }
}
