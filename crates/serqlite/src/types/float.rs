use crate::{
    Datum, Value,
    decode::{Decode, mismatch},
    encode::Encode,
    error::DecodeError,
};

impl Encode for f32 {
    fn encode(self) -> Value {
        Value::Float(self.into())
    }
}

impl<'r> Decode<'r> for f32 {
    fn decode(value: &'r Datum) -> Result<f32, DecodeError> {
        Ok(f64::decode(value)? as f32)
    }
}

impl Encode for f64 {
    fn encode(self) -> Value {
        Value::Float(self)
    }
}

impl<'r> Decode<'r> for f64 {
    fn decode(value: &'r Datum) -> Result<f64, DecodeError> {
        match value {
            Datum::Float(v) => Ok(*v),
            // REAL columns store integral values as INTEGER.
            Datum::Integer(v) => Ok(*v as f64),
            _ => Err(mismatch(value, "f64")),
        }
    }
}
