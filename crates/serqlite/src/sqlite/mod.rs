//! Thin, safe layer over the SQLite C API.

pub use arguments::Arguments;
pub use connection::Connection;
pub use error::{ExtendedErrCode, PrimaryErrCode, SqliteError};
pub use statement::Statement;
pub use statement::unlock_notify::DEFAULT_MAX_RETRIES;
pub use type_info::Affinity;
pub use value::{StorageClass, Value};

/// Values bound to statement parameters.
mod arguments;
/// Connection lifecycle and the query pipeline.
pub(crate) mod connection;
/// Engine error codes.
pub mod error;
/// Raw FFI bindings.
mod ffi;
/// Prepared statements.
pub(crate) mod statement;
/// Declared column types and the affinity derived from them.
mod type_info;
mod value;
