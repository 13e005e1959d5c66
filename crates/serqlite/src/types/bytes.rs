use crate::{
    Datum, Value,
    decode::{Decode, mismatch},
    encode::Encode,
    error::DecodeError,
};

impl Encode for &[u8] {
    fn encode(self) -> Value {
        Value::Blob(self.to_owned())
    }
}

impl<'r> Decode<'r> for &'r [u8] {
    fn decode(value: &'r Datum) -> Result<Self, DecodeError> {
        match value {
            Datum::Blob(v) => Ok(v),
            Datum::Text(v) => Ok(v.as_bytes()),
            _ => Err(mismatch(value, "&[u8]")),
        }
    }
}

impl Encode for Vec<u8> {
    fn encode(self) -> Value {
        Value::Blob(self)
    }
}

impl<'r> Decode<'r> for Vec<u8> {
    fn decode(value: &'r Datum) -> Result<Self, DecodeError> {
        <&[u8]>::decode(value).map(ToOwned::to_owned)
    }
}
