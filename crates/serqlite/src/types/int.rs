use crate::{
    Datum, Value,
    decode::{Decode, mismatch},
    encode::Encode,
    error::DecodeError,
};

macro_rules! integer {
    ($($ty:ty),+) => {
        $(
            impl Encode for $ty {
                fn encode(self) -> Value {
                    Value::Integer(self.into())
                }
            }

            impl<'r> Decode<'r> for $ty {
                fn decode(value: &'r Datum) -> Result<Self, DecodeError> {
                    match value {
                        Datum::Integer(v) => Ok((*v).try_into()?),
                        _ => Err(mismatch(value, stringify!($ty))),
                    }
                }
            }
        )+
    };
}

// u64 does not fit every value in an INTEGER column and is left out.
integer!(i8, i16, i32, i64, u8, u16, u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_encode() {
        assert_eq!((&42i32).encode(), Value::Integer(42));
        assert_eq!((&127i8).encode(), Value::Integer(127));
        assert_eq!((&123u32).encode(), Value::Integer(123));
    }

    #[test]
    fn test_narrowing_overflow() {
        let err = i8::decode(&Datum::Integer(300)).unwrap_err();
        assert!(matches!(err, DecodeError::Conversion(_)));
        assert_eq!(u16::decode(&Datum::Integer(300)).unwrap(), 300);
    }

    #[test]
    fn test_null_into_integer() {
        assert_eq!(i64::decode(&Datum::Null), Err(DecodeError::UnexpectedNull));
        assert_eq!(Option::<i64>::decode(&Datum::Null), Ok(None));
    }
}
