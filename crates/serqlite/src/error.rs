//! Types for working with errors produced by serqlite.

use std::convert::Infallible;
use std::io;
use std::num::TryFromIntError;
use std::sync::PoisonError;
use std::time::Duration;

use crate::sqlite::{Affinity, SqliteError, StorageClass};

/// A specialized `Result` type for serqlite.
pub type Result<T> = std::result::Result<T, Error>;

/// A value read from the database could not be turned into the requested type.
///
/// Decoding never falls back to raw text: a value that does not match its column's
/// declared type is reported, not passed through.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Text did not match the pattern its declared type requires.
    #[error("{raw:?} does not match the expected pattern {expected}")]
    Pattern { raw: String, expected: &'static str },

    /// The storage class cannot carry the column's declared type.
    #[error("cannot decode {found} storage as {declared}")]
    StorageClass {
        found: StorageClass,
        declared: Affinity,
    },

    #[error("decoding conversion error: {0}")]
    Conversion(String),

    #[error("unexpected NULL")]
    UnexpectedNull,
}

impl From<TryFromIntError> for DecodeError {
    fn from(err: TryFromIntError) -> Self {
        DecodeError::Conversion(err.to_string())
    }
}

impl From<Infallible> for DecodeError {
    fn from(err: Infallible) -> Self {
        match err {}
    }
}

impl From<String> for DecodeError {
    fn from(err: String) -> Self {
        DecodeError::Conversion(err)
    }
}

/// Represents all the ways a method can fail within serqlite.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Error returned from the database engine.
    #[error("error returned from database: {0}")]
    Sqlite(#[source] SqliteError),

    /// Error communicating with the database backend.
    #[error("error communicating with database: {0}")]
    Io(#[from] io::Error),

    /// Unexpected or invalid input or state, such as SQL containing nul bytes or
    /// stepping a statement that has already been finalized.
    #[error("encountered unexpected or invalid data: {0}")]
    Protocol(String),

    /// The number of bound values does not match the statement's parameter count.
    #[error("statement expects {expected} bind parameters but {actual} were supplied")]
    BindArity { expected: usize, actual: usize },

    /// Column index was out of bounds.
    #[error("column index out of bounds: the len is {len}, but the index is {index}")]
    ColumnIndexOutOfBounds { index: usize, len: usize },

    /// No column found for the given name.
    #[error("no column found for name: {0}")]
    ColumnNotFound(String),

    /// A value in a specific column could not be decoded.
    #[error("error occurred while decoding column {column}: {source}")]
    ColumnDecode {
        column: String,

        #[source]
        source: DecodeError,
    },

    /// The caller stopped waiting for a server reply.
    ///
    /// This is not a statement failure: the request is still executed by the server
    /// and its effects may land after the caller has given up.
    #[error("timed out after {0:?} waiting for a reply from the server")]
    Timeout(Duration),

    /// The server's worker thread has stopped, or stopped before replying.
    #[error("attempted to communicate with a stopped server worker")]
    WorkerStopped,

    /// [`sqlite3_unlock_notify`] kept returning `SQLITE_LOCKED` even after
    /// resetting the blocking statement.
    #[error("unlock_notify failed after multiple attempts")]
    UnlockNotify,
}

impl Error {
    pub fn into_sqlite_error(self) -> Option<SqliteError> {
        match self {
            Error::Sqlite(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_sqlite_error(&self) -> Option<&SqliteError> {
        match self {
            Error::Sqlite(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}

impl From<SqliteError> for Error {
    fn from(error: SqliteError) -> Self {
        Error::Sqlite(error)
    }
}

impl<T> From<PoisonError<T>> for Error {
    fn from(_: PoisonError<T>) -> Self {
        Error::WorkerStopped
    }
}
