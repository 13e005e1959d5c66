use std::ffi::CStr;
use std::os::raw::c_char;
use std::ptr::NonNull;

use libsqlite3_sys::{SQLITE_DONE, SQLITE_OK, SQLITE_ROW, sqlite3, sqlite3_stmt};

use crate::error::{DecodeError, Error};
use crate::sqlite::error::SqliteError;
use crate::sqlite::{StorageClass, Value, ffi};

use super::unlock_notify;

/// Owned prepared statement. Finalized when dropped.
#[derive(Debug)]
pub(crate) struct StatementHandle(NonNull<sqlite3_stmt>);

// Statement handles may move between threads as long as they are only ever used by
// one thread at a time, which `&mut self` on every stepping method guarantees.
unsafe impl Send for StatementHandle {}

fn owned_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

impl StatementHandle {
    pub(super) fn new(ptr: NonNull<sqlite3_stmt>) -> Self {
        Self(ptr)
    }

    fn as_ptr(&self) -> *mut sqlite3_stmt {
        self.0.as_ptr()
    }

    pub(crate) fn db_handle(&self) -> *mut sqlite3 {
        // https://sqlite.org/c3ref/db_handle.html
        ffi::db_handle(self.as_ptr())
    }

    pub(crate) fn column_count(&self) -> usize {
        ffi::column_count(self.as_ptr()).max(0) as usize
    }

    pub(crate) fn column_name(&self, index: usize) -> String {
        owned_str(ffi::column_name(self.as_ptr(), index as i32)).unwrap_or_default()
    }

    /// The declared type of a result column. `None` for expressions and subqueries.
    pub(crate) fn column_decltype(&self, index: usize) -> Option<String> {
        owned_str(ffi::column_decltype(self.as_ptr(), index as i32))
    }

    pub(crate) fn is_read_only(&self) -> bool {
        ffi::stmt_readonly(self.as_ptr())
    }

    pub(crate) fn bind_parameter_count(&self) -> usize {
        ffi::bind_parameter_count(self.as_ptr()).max(0) as usize
    }

    /// Bind a value to a parameter. The first parameter has index 1.
    pub(crate) fn bind(&mut self, index: usize, value: &Value) -> Result<(), SqliteError> {
        let stmt = self.as_ptr();
        let index = index as i32;
        match value {
            Value::Null => ffi::bind_null(stmt, index),
            Value::Integer(v) => ffi::bind_int64(stmt, index, *v),
            Value::Float(v) => ffi::bind_double(stmt, index, *v),
            Value::Text(v) => ffi::bind_text64(stmt, index, v),
            Value::Blob(v) => ffi::bind_blob64(stmt, index, v),
        }
    }

    /// Read the current row's value for a column in its native storage class.
    pub(crate) fn column_value(&self, index: usize) -> Result<Value, DecodeError> {
        let stmt = self.as_ptr();
        let index = index as i32;
        let code = ffi::column_type(stmt, index);
        let class = StorageClass::from_code(code)
            .ok_or_else(|| DecodeError::Conversion(format!("unknown storage class code {code}")))?;

        Ok(match class {
            StorageClass::Null => Value::Null,
            StorageClass::Integer => Value::Integer(ffi::column_int64(stmt, index)),
            StorageClass::Float => Value::Float(ffi::column_double(stmt, index)),
            StorageClass::Blob => Value::Blob(ffi::column_bytes(stmt, index, false)),
            StorageClass::Text => {
                let bytes = ffi::column_bytes(stmt, index, true);
                Value::Text(String::from_utf8(bytes).map_err(|e| {
                    DecodeError::Conversion(format!("text is not valid UTF-8: {e}"))
                })?)
            }
        })
    }

    pub(crate) fn clear_bindings(&mut self) {
        ffi::clear_bindings(self.as_ptr());
    }

    pub(crate) fn reset(&mut self) -> Result<(), SqliteError> {
        ffi::reset(self.as_ptr())
    }

    /// Advance the statement. Returns `true` when a row is available.
    ///
    /// A statement blocked by another connection on a shared cache waits for an unlock
    /// notification, then is reset and stepped again. Resetting starts the result set
    /// over, so callers that have already taken rows pass `restart_on_lock = false` and
    /// get the lock error instead.
    pub(crate) fn step(&mut self, restart_on_lock: bool) -> Result<bool, Error> {
        loop {
            match ffi::step(self.as_ptr()) {
                SQLITE_ROW => return Ok(true),
                SQLITE_DONE => return Ok(false),
                _ => {
                    let err = SqliteError::new(self.db_handle());
                    if !restart_on_lock || !err.should_retry() {
                        return Err(err.into());
                    }
                    unlock_notify::wait(
                        self.db_handle(),
                        Some(self.as_ptr()),
                        unlock_notify::DEFAULT_MAX_RETRIES,
                    )?;
                    let _ = ffi::reset(self.as_ptr());
                }
            }
        }
    }
}

impl Drop for StatementHandle {
    fn drop(&mut self) {
        let db = self.db_handle();

        // Reset first so finalize does not report the last step error again.
        let _ = ffi::reset(self.as_ptr());

        // https://sqlite.org/c3ref/finalize.html
        let status = ffi::finalize(self.as_ptr());
        if status != SQLITE_OK {
            tracing::error!("sqlite3_finalize failed: {}", SqliteError::new(db));
        }
    }
}
