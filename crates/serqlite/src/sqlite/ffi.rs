// Safe wrappers around the libsqlite3_sys functions used by this crate.
// All raw calls into the SQLite C API live here; callers pass pointers they
// own and get results mapped onto `SqliteError`.

use std::ffi::c_void;
use std::os::raw::{c_char, c_int};
use std::ptr;

use libsqlite3_sys::{self as sys, sqlite3, sqlite3_stmt};

use crate::sqlite::error::SqliteError;

const _ASSERT_C_INT_32BIT: () = assert!(std::mem::size_of::<c_int>() == 4);

fn check(db: *mut sqlite3, rc: c_int) -> Result<(), SqliteError> {
    if rc == sys::SQLITE_OK {
        Ok(())
    } else {
        Err(SqliteError::new(db))
    }
}

fn check_stmt(stmt: *mut sqlite3_stmt, rc: c_int) -> Result<(), SqliteError> {
    if rc == sys::SQLITE_OK {
        Ok(())
    } else {
        Err(SqliteError::new(db_handle(stmt)))
    }
}

/// Wrapper around [`sqlite3_open_v2`].
///
/// On failure the partially opened handle is closed before returning.
pub(crate) fn open_v2(
    filename: *const c_char,
    handle: *mut *mut sqlite3,
    flags: i32,
) -> Result<(), SqliteError> {
    let rc = unsafe { sys::sqlite3_open_v2(filename, handle, flags as c_int, ptr::null()) };
    if rc == sys::SQLITE_OK {
        return Ok(());
    }

    let db = unsafe { *handle };
    if db.is_null() {
        return Err(SqliteError::from_code(rc, "sqlite3_open_v2 failed"));
    }

    let err = SqliteError::new(db);
    unsafe {
        sys::sqlite3_close(db);
        *handle = ptr::null_mut();
    }
    Err(err)
}

/// Wrapper around [`sqlite3_extended_result_codes`].
pub(crate) fn extended_result_codes(db: *mut sqlite3, onoff: bool) -> Result<(), SqliteError> {
    check(db, unsafe {
        sys::sqlite3_extended_result_codes(db, onoff as c_int)
    })
}

/// Wrapper around [`sqlite3_busy_timeout`].
pub(crate) fn busy_timeout(db: *mut sqlite3, ms: i32) -> Result<(), SqliteError> {
    check(db, unsafe { sys::sqlite3_busy_timeout(db, ms as c_int) })
}

/// Wrapper around [`sqlite3_prepare_v3`].
pub(crate) fn prepare_v3(
    db: *mut sqlite3,
    sql: *const c_char,
    n_byte: i32,
    stmt: *mut *mut sqlite3_stmt,
    tail: *mut *const c_char,
) -> Result<(), SqliteError> {
    check(db, unsafe {
        sys::sqlite3_prepare_v3(db, sql, n_byte as c_int, 0, stmt, tail)
    })
}

/// Wrapper around [`sqlite3_unlock_notify`].
pub(crate) fn unlock_notify(
    db: *mut sqlite3,
    callback: Option<unsafe extern "C" fn(*mut *mut c_void, c_int)>,
    arg: *mut c_void,
) -> Result<(), SqliteError> {
    check(db, unsafe { sys::sqlite3_unlock_notify(db, callback, arg) })
}

/// Wrapper around [`sqlite3_extended_errcode`].
pub(crate) fn extended_errcode(db: *mut sqlite3) -> i32 {
    unsafe { sys::sqlite3_extended_errcode(db) }
}

/// Wrapper around [`sqlite3_errmsg`].
pub(crate) fn errmsg(db: *mut sqlite3) -> *const c_char {
    unsafe { sys::sqlite3_errmsg(db) }
}

/// Wrapper around [`sqlite3_close`].
pub(crate) fn close(db: *mut sqlite3) -> Result<(), SqliteError> {
    check(db, unsafe { sys::sqlite3_close(db) })
}

/// Wrapper around [`sqlite3_exec`] with no row callback.
pub(crate) fn exec(db: *mut sqlite3, sql: *const c_char) -> Result<(), SqliteError> {
    check(db, unsafe {
        sys::sqlite3_exec(db, sql, None, ptr::null_mut(), ptr::null_mut())
    })
}

/// Wrapper around [`sqlite3_last_insert_rowid`].
pub(crate) fn last_insert_rowid(db: *mut sqlite3) -> i64 {
    unsafe { sys::sqlite3_last_insert_rowid(db) }
}

/// Wrapper around [`sqlite3_changes64`].
pub(crate) fn changes(db: *mut sqlite3) -> i64 {
    unsafe { sys::sqlite3_changes64(db) }
}

/// Wrapper around [`sqlite3_total_changes64`].
pub(crate) fn total_changes(db: *mut sqlite3) -> i64 {
    unsafe { sys::sqlite3_total_changes64(db) }
}

/// Wrapper around [`sqlite3_next_stmt`]; pass null to get the first statement.
pub(crate) fn next_stmt(db: *mut sqlite3, stmt: *mut sqlite3_stmt) -> *mut sqlite3_stmt {
    unsafe { sys::sqlite3_next_stmt(db, stmt) }
}

/// Wrapper around [`sqlite3_db_handle`].
pub(crate) fn db_handle(stmt: *mut sqlite3_stmt) -> *mut sqlite3 {
    unsafe { sys::sqlite3_db_handle(stmt) }
}

/// Wrapper around [`sqlite3_column_count`].
pub(crate) fn column_count(stmt: *mut sqlite3_stmt) -> i32 {
    unsafe { sys::sqlite3_column_count(stmt) }
}

/// Wrapper around [`sqlite3_column_name`]. Returns a pointer to a nul-terminated string.
pub(crate) fn column_name(stmt: *mut sqlite3_stmt, index: i32) -> *const c_char {
    unsafe { sys::sqlite3_column_name(stmt, index as c_int) }
}

/// Wrapper around [`sqlite3_column_decltype`]. Null for expression columns.
pub(crate) fn column_decltype(stmt: *mut sqlite3_stmt, index: i32) -> *const c_char {
    unsafe { sys::sqlite3_column_decltype(stmt, index as c_int) }
}

/// Wrapper around [`sqlite3_stmt_readonly`].
pub(crate) fn stmt_readonly(stmt: *mut sqlite3_stmt) -> bool {
    unsafe { sys::sqlite3_stmt_readonly(stmt) != 0 }
}

/// Wrapper around [`sqlite3_bind_parameter_count`].
pub(crate) fn bind_parameter_count(stmt: *mut sqlite3_stmt) -> i32 {
    unsafe { sys::sqlite3_bind_parameter_count(stmt) }
}

/// Wrapper around [`sqlite3_bind_blob64`].
pub(crate) fn bind_blob64(stmt: *mut sqlite3_stmt, index: i32, data: &[u8]) -> Result<(), SqliteError> {
    check_stmt(stmt, unsafe {
        sys::sqlite3_bind_blob64(
            stmt,
            index as c_int,
            data.as_ptr() as *const c_void,
            data.len() as u64,
            sys::SQLITE_TRANSIENT(),
        )
    })
}

/// Wrapper around [`sqlite3_bind_text64`].
pub(crate) fn bind_text64(stmt: *mut sqlite3_stmt, index: i32, data: &str) -> Result<(), SqliteError> {
    check_stmt(stmt, unsafe {
        sys::sqlite3_bind_text64(
            stmt,
            index as c_int,
            data.as_ptr() as *const c_char,
            data.len() as u64,
            sys::SQLITE_TRANSIENT(),
            sys::SQLITE_UTF8 as u8,
        )
    })
}

/// Wrapper around [`sqlite3_bind_int64`].
pub(crate) fn bind_int64(stmt: *mut sqlite3_stmt, index: i32, value: i64) -> Result<(), SqliteError> {
    check_stmt(stmt, unsafe {
        sys::sqlite3_bind_int64(stmt, index as c_int, value)
    })
}

/// Wrapper around [`sqlite3_bind_double`].
pub(crate) fn bind_double(stmt: *mut sqlite3_stmt, index: i32, value: f64) -> Result<(), SqliteError> {
    check_stmt(stmt, unsafe {
        sys::sqlite3_bind_double(stmt, index as c_int, value)
    })
}

/// Wrapper around [`sqlite3_bind_null`].
pub(crate) fn bind_null(stmt: *mut sqlite3_stmt, index: i32) -> Result<(), SqliteError> {
    check_stmt(stmt, unsafe { sys::sqlite3_bind_null(stmt, index as c_int) })
}

/// Wrapper around [`sqlite3_column_type`].
pub(crate) fn column_type(stmt: *mut sqlite3_stmt, index: i32) -> i32 {
    unsafe { sys::sqlite3_column_type(stmt, index as c_int) }
}

/// Wrapper around [`sqlite3_column_int64`].
pub(crate) fn column_int64(stmt: *mut sqlite3_stmt, index: i32) -> i64 {
    unsafe { sys::sqlite3_column_int64(stmt, index as c_int) }
}

/// Wrapper around [`sqlite3_column_double`].
pub(crate) fn column_double(stmt: *mut sqlite3_stmt, index: i32) -> f64 {
    unsafe { sys::sqlite3_column_double(stmt, index as c_int) }
}

/// Copy the bytes of a TEXT or BLOB column.
///
/// `sqlite3_column_bytes` must be called after the pointer has been fetched, so the
/// two calls are kept together here.
pub(crate) fn column_bytes(stmt: *mut sqlite3_stmt, index: i32, text: bool) -> Vec<u8> {
    unsafe {
        let ptr = if text {
            sys::sqlite3_column_text(stmt, index as c_int) as *const u8
        } else {
            sys::sqlite3_column_blob(stmt, index as c_int) as *const u8
        };
        let len = sys::sqlite3_column_bytes(stmt, index as c_int) as usize;

        if ptr.is_null() || len == 0 {
            Vec::new()
        } else {
            std::slice::from_raw_parts(ptr, len).to_vec()
        }
    }
}

/// Wrapper around [`sqlite3_clear_bindings`].
pub(crate) fn clear_bindings(stmt: *mut sqlite3_stmt) {
    unsafe { sys::sqlite3_clear_bindings(stmt) };
}

/// Wrapper around [`sqlite3_reset`].
pub(crate) fn reset(stmt: *mut sqlite3_stmt) -> Result<(), SqliteError> {
    check_stmt(stmt, unsafe { sys::sqlite3_reset(stmt) })
}

/// Wrapper around [`sqlite3_step`]. Returns the raw result code.
pub(crate) fn step(stmt: *mut sqlite3_stmt) -> i32 {
    unsafe { sys::sqlite3_step(stmt) }
}

/// Wrapper around [`sqlite3_finalize`]. Returns the raw result code.
pub(crate) fn finalize(stmt: *mut sqlite3_stmt) -> i32 {
    unsafe { sys::sqlite3_finalize(stmt) }
}
