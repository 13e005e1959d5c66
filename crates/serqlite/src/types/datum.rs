use crate::{Datum, Value, codec, decode::Decode, encode::Encode, error::DecodeError};

impl Encode for Datum {
    fn encode(self) -> Value {
        codec::encode(self)
    }
}

impl<'r> Decode<'r> for Datum {
    fn decode(value: &'r Datum) -> Result<Self, DecodeError> {
        Ok(value.clone())
    }
}
