use crate::{
    Datum, Value,
    decode::{Decode, mismatch},
    encode::Encode,
    error::DecodeError,
};

impl Encode for &str {
    fn encode(self) -> Value {
        Value::Text(self.to_owned())
    }
}

impl<'r> Decode<'r> for &'r str {
    fn decode(value: &'r Datum) -> Result<Self, DecodeError> {
        match value {
            Datum::Text(v) => Ok(v),
            _ => Err(mismatch(value, "&str")),
        }
    }
}

impl Encode for String {
    fn encode(self) -> Value {
        Value::Text(self)
    }
}

impl Encode for &String {
    fn encode(self) -> Value {
        Value::Text(self.clone())
    }
}

impl<'r> Decode<'r> for String {
    fn decode(value: &'r Datum) -> Result<Self, DecodeError> {
        <&str>::decode(value).map(ToOwned::to_owned)
    }
}
