use std::ffi::c_void;
use std::slice;
use std::sync::{Condvar, Mutex};

use libsqlite3_sys::{SQLITE_LOCKED, sqlite3, sqlite3_stmt};

use crate::error::{Error, Result};
use crate::sqlite::error::{PrimaryErrCode, SqliteError};
use crate::sqlite::ffi;

/// Number of times [`wait`] resets a blocking statement before giving up.
pub const DEFAULT_MAX_RETRIES: usize = 5;

/// Block until the engine reports that the lock held against `conn` has been released.
///
/// See <https://www.sqlite.org/unlock_notify.html>. When registration itself reports
/// `SQLITE_LOCKED` a deadlock was detected; if `stmt` is given it is reset and
/// registration retried, up to `max_retries` times.
pub(crate) fn wait(
    conn: *mut sqlite3,
    stmt: Option<*mut sqlite3_stmt>,
    max_retries: usize,
) -> Result<()> {
    let notify = Notify::new();
    let mut attempts = 0;

    loop {
        let registered = ffi::unlock_notify(
            conn,
            Some(unlock_notify_cb),
            &notify as *const Notify as *mut c_void,
        );

        match registered {
            Ok(()) => break,
            Err(e) if e.primary() == PrimaryErrCode::Locked => {
                let Some(stmt) = stmt else {
                    return Err(Error::Sqlite(SqliteError::from_code(
                        SQLITE_LOCKED,
                        "sqlite3_unlock_notify detected a deadlock",
                    )));
                };

                attempts += 1;
                if attempts > max_retries {
                    return Err(Error::UnlockNotify);
                }
                let _ = ffi::reset(stmt);
            }
            Err(e) => return Err(Error::Sqlite(e)),
        }
    }

    notify.wait();
    Ok(())
}

unsafe extern "C" fn unlock_notify_cb(ptr: *mut *mut c_void, len: i32) {
    let ptr = ptr as *mut *mut Notify;
    let slice = unsafe { slice::from_raw_parts(ptr, len as usize) };

    for &notify in slice {
        unsafe { (*notify).fire() };
    }
}

struct Notify {
    fired: Mutex<bool>,
    condvar: Condvar,
}

impl Notify {
    fn new() -> Self {
        Self {
            fired: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    fn wait(&self) {
        let guard = self.fired.lock().unwrap_or_else(|e| e.into_inner());
        let _guard = self
            .condvar
            .wait_while(guard, |fired| !*fired)
            .unwrap_or_else(|e| e.into_inner());
    }

    fn fire(&self) {
        let mut fired = self.fired.lock().unwrap_or_else(|e| e.into_inner());
        *fired = true;
        self.condvar.notify_one();
    }
}
