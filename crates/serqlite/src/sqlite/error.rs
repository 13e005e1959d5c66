use std::ffi::CStr;

use libsqlite3_sys::{self as sys, sqlite3};

use crate::sqlite::ffi;

// Error Codes And Messages
// https://www.sqlite.org/c3ref/errcode.html

/// Primary SQLite result codes.
///
/// The primary code is the low byte of the extended code reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PrimaryErrCode {
    Error,
    Internal,
    Perm,
    Abort,
    Busy,
    Locked,
    NoMem,
    ReadOnly,
    Interrupt,
    IoErr,
    Corrupt,
    NotFound,
    Full,
    CantOpen,
    Protocol,
    Schema,
    TooBig,
    Constraint,
    Mismatch,
    Misuse,
    Auth,
    Range,
    NotADB,
    Unknown(i32),
}

impl PrimaryErrCode {
    pub(crate) fn from_code(code: i32) -> Self {
        match code & 0xff {
            sys::SQLITE_ERROR => Self::Error,
            sys::SQLITE_INTERNAL => Self::Internal,
            sys::SQLITE_PERM => Self::Perm,
            sys::SQLITE_ABORT => Self::Abort,
            sys::SQLITE_BUSY => Self::Busy,
            sys::SQLITE_LOCKED => Self::Locked,
            sys::SQLITE_NOMEM => Self::NoMem,
            sys::SQLITE_READONLY => Self::ReadOnly,
            sys::SQLITE_INTERRUPT => Self::Interrupt,
            sys::SQLITE_IOERR => Self::IoErr,
            sys::SQLITE_CORRUPT => Self::Corrupt,
            sys::SQLITE_NOTFOUND => Self::NotFound,
            sys::SQLITE_FULL => Self::Full,
            sys::SQLITE_CANTOPEN => Self::CantOpen,
            sys::SQLITE_PROTOCOL => Self::Protocol,
            sys::SQLITE_SCHEMA => Self::Schema,
            sys::SQLITE_TOOBIG => Self::TooBig,
            sys::SQLITE_CONSTRAINT => Self::Constraint,
            sys::SQLITE_MISMATCH => Self::Mismatch,
            sys::SQLITE_MISUSE => Self::Misuse,
            sys::SQLITE_AUTH => Self::Auth,
            sys::SQLITE_RANGE => Self::Range,
            sys::SQLITE_NOTADB => Self::NotADB,
            other => Self::Unknown(other),
        }
    }
}

/// The extended result codes callers most commonly need to tell apart.
///
/// Anything not listed here is reported as [`ExtendedErrCode::Other`] with the raw code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExtendedErrCode {
    ConstraintCheck,
    ConstraintForeignKey,
    ConstraintNotNull,
    ConstraintPrimaryKey,
    ConstraintTrigger,
    ConstraintUnique,
    LockedSharedCache,
    BusyRecovery,
    BusySnapshot,
    BusyTimeout,
    ReadOnlyDbMoved,
    CantOpenIsDir,
    Other(i32),
}

impl ExtendedErrCode {
    pub(crate) fn from_code(code: i32) -> Self {
        match code {
            sys::SQLITE_CONSTRAINT_CHECK => Self::ConstraintCheck,
            sys::SQLITE_CONSTRAINT_FOREIGNKEY => Self::ConstraintForeignKey,
            sys::SQLITE_CONSTRAINT_NOTNULL => Self::ConstraintNotNull,
            sys::SQLITE_CONSTRAINT_PRIMARYKEY => Self::ConstraintPrimaryKey,
            sys::SQLITE_CONSTRAINT_TRIGGER => Self::ConstraintTrigger,
            sys::SQLITE_CONSTRAINT_UNIQUE => Self::ConstraintUnique,
            sys::SQLITE_LOCKED_SHAREDCACHE => Self::LockedSharedCache,
            sys::SQLITE_BUSY_RECOVERY => Self::BusyRecovery,
            sys::SQLITE_BUSY_SNAPSHOT => Self::BusySnapshot,
            sys::SQLITE_BUSY_TIMEOUT => Self::BusyTimeout,
            sys::SQLITE_READONLY_DBMOVED => Self::ReadOnlyDbMoved,
            sys::SQLITE_CANTOPEN_ISDIR => Self::CantOpenIsDir,
            other => Self::Other(other),
        }
    }
}

/// An error reported by the SQLite engine: a result code plus the engine's message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("(code: {code}, {primary:?}) {message}")]
pub struct SqliteError {
    pub(crate) code: i32,
    pub(crate) primary: PrimaryErrCode,
    pub(crate) extended: ExtendedErrCode,
    pub(crate) message: String,
}

impl SqliteError {
    /// Capture the most recent error recorded on a database handle.
    pub(crate) fn new(handle: *mut sqlite3) -> Self {
        let code = ffi::extended_errcode(handle);
        let message = unsafe {
            let msg = ffi::errmsg(handle);
            debug_assert!(!msg.is_null());
            CStr::from_ptr(msg).to_string_lossy().into_owned()
        };

        Self::from_code(code, message)
    }

    /// Build an error from a raw result code when no handle is available.
    pub(crate) fn from_code(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            primary: PrimaryErrCode::from_code(code),
            extended: ExtendedErrCode::from_code(code),
            message: message.into(),
        }
    }

    /// The raw extended result code.
    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn primary(&self) -> PrimaryErrCode {
        self.primary
    }

    pub fn extended(&self) -> ExtendedErrCode {
        self.extended
    }

    /// The human-readable message produced by the engine.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// A shared-cache lock held by another connection, which an unlock notification clears.
    pub(crate) fn should_retry(&self) -> bool {
        self.extended == ExtendedErrCode::LockedSharedCache
    }
}
