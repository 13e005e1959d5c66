//! Conversions between Rust types and column values.
//!
//! # Types
//!
//! | Rust type                       | Bound as | Read from declared type |
//! |---------------------------------|----------|-------------------------|
//! | `bool`                          | INTEGER  | BOOLEAN, BOOL           |
//! | `i8`, `i16`, `i32`, `i64`       | INTEGER  | any INTEGER storage     |
//! | `u8`, `u16`, `u32`              | INTEGER  | any INTEGER storage     |
//! | `f32`, `f64`                    | REAL     | REAL or INTEGER storage |
//! | `&str`, [`String`]              | TEXT     | TEXT storage            |
//! | `&[u8]`, `Vec<u8>`              | BLOB     | BLOB storage            |
//! | `time::PrimitiveDateTime`       | TEXT     | DATETIME, TIMESTAMP     |
//! | `time::Date`                    | TEXT     | DATE                    |
//! | `rust_decimal::Decimal`         | TEXT     | DECIMAL, DECIMAL(p, s)  |
//! | [`Datum`](crate::Datum)         | any      | any                     |
//!
//! Reading works on the already decoded [`Datum`](crate::Datum), so a `DATETIME` column
//! yields a `PrimitiveDateTime` but never a `String`.
//!
//! # Nullable
//!
//! `Option<T>` is supported where `T` implements `Encode` or `Decode`. Reading `NULL`
//! into a non-`Option` type fails with [`DecodeError::UnexpectedNull`](crate::DecodeError).

mod bool;
mod bytes;
mod datum;
mod decimal;
mod float;
mod int;
mod str;
mod time;
