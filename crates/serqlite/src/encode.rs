//! Provides [`Encode`] for turning Rust values into bind parameters.
use crate::Value;

/// Encode a single value to be bound to a statement parameter.
///
/// Encoding is total: every implementor maps to exactly one native [`Value`] without
/// consulting the column it will be stored in.
pub trait Encode {
    fn encode(self) -> Value
    where
        Self: Sized;
}

/// Marker trait for primitive types that can be encoded by reference.
pub trait PrimitiveEncode: Encode + Copy + 'static {}

impl PrimitiveEncode for bool {}
impl PrimitiveEncode for i8 {}
impl PrimitiveEncode for i16 {}
impl PrimitiveEncode for i32 {}
impl PrimitiveEncode for i64 {}
impl PrimitiveEncode for u8 {}
impl PrimitiveEncode for u16 {}
impl PrimitiveEncode for u32 {}
impl PrimitiveEncode for f32 {}
impl PrimitiveEncode for f64 {}

impl<T> Encode for &T
where
    T: PrimitiveEncode,
{
    fn encode(self) -> Value {
        (*self).encode()
    }
}

impl<T> Encode for Option<T>
where
    T: Encode,
{
    fn encode(self) -> Value {
        match self {
            Some(v) => v.encode(),
            None => Value::Null,
        }
    }
}

impl Encode for Value {
    fn encode(self) -> Value {
        self
    }
}
