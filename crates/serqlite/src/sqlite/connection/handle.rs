use std::ffi::CString;
use std::ptr::{self, NonNull};

use libsqlite3_sys::sqlite3;

use crate::{
    error::{Error, Result},
    sqlite::{SqliteError, ffi, statement::unlock_notify},
};

/// Owned raw database handle. Closed when dropped.
#[derive(Debug)]
pub(crate) struct ConnectionHandle(NonNull<sqlite3>);

// A database handle may move between threads as long as only one thread uses it at a
// time. The handle is not `Sync`, and connections are opened with SQLITE_OPEN_NOMUTEX
// against a threadsafe library build.
// <https://www.sqlite.org/threadsafe.html>
unsafe impl Send for ConnectionHandle {}

impl ConnectionHandle {
    pub(super) fn new(ptr: NonNull<sqlite3>) -> Self {
        Self(ptr)
    }

    pub(crate) fn as_ptr(&self) -> *mut sqlite3 {
        self.0.as_ptr()
    }

    pub(crate) fn last_insert_rowid(&self) -> i64 {
        ffi::last_insert_rowid(self.as_ptr())
    }

    /// Rows changed by the most recent INSERT, UPDATE or DELETE on this connection.
    pub(crate) fn changes(&self) -> i64 {
        ffi::changes(self.as_ptr())
    }

    /// Rows changed by every INSERT, UPDATE or DELETE since the connection opened.
    pub(crate) fn total_changes(&self) -> i64 {
        ffi::total_changes(self.as_ptr())
    }

    /// Count the statements still prepared against this connection.
    pub(crate) fn open_statements(&self) -> usize {
        let mut count = 0;
        let mut stmt = ffi::next_stmt(self.as_ptr(), ptr::null_mut());
        while !stmt.is_null() {
            count += 1;
            stmt = ffi::next_stmt(self.as_ptr(), stmt);
        }
        count
    }

    /// Run SQL text that may hold several statements, discarding any rows.
    pub(crate) fn exec(&self, sql: &str) -> Result<()> {
        let sql = CString::new(sql).map_err(|_| Error::Protocol("query contains nul bytes".into()))?;

        loop {
            match ffi::exec(self.as_ptr(), sql.as_ptr()) {
                Ok(()) => return Ok(()),
                Err(e) if e.should_retry() => {
                    unlock_notify::wait(self.as_ptr(), None, unlock_notify::DEFAULT_MAX_RETRIES)?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Close the handle, reporting failure instead of panicking in `drop`.
    pub(crate) fn close(self) -> std::result::Result<(), SqliteError> {
        let ptr = self.as_ptr();
        std::mem::forget(self);
        ffi::close(ptr)
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        // https://sqlite.org/c3ref/close.html
        if let Err(e) = ffi::close(self.as_ptr()) {
            // Only possible if a statement outlived its connection, which borrowing forbids.
            tracing::error!("sqlite3_close failed: {e}");
        }
    }
}
