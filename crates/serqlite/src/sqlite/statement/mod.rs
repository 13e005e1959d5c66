use std::os::raw::c_char;
use std::ptr::{NonNull, null, null_mut};
use std::sync::Arc;

use libsqlite3_sys::{sqlite3, sqlite3_stmt};

use crate::{
    Column, Row, Rows, Shape, codec,
    error::{Error, Result},
    sqlite::{Arguments, Connection, ffi},
};

mod handle;
pub(crate) mod unlock_notify;

pub(crate) use handle::StatementHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NotStarted,
    Running,
    Done,
}

/// A single prepared statement, borrowed from its [`Connection`].
///
/// The native handle is finalized exactly once: by [`finalize`](Self::finalize) or on drop,
/// whichever comes first. Because the statement borrows the connection it can never
/// outlive it.
#[derive(Debug)]
pub struct Statement<'c> {
    conn: &'c Connection,
    sql: String,
    /// `None` for text holding no SQL at all, or once finalized.
    handle: Option<StatementHandle>,
    finalized: bool,
    columns: Arc<[Column]>,
    state: State,
    /// Connection-wide change counter when the current run started.
    total_changes_at_start: i64,
}

impl<'c> Statement<'c> {
    /// Compile one statement. Text holding more than one statement is rejected.
    pub(crate) fn prepare(conn: &'c Connection, sql: &str) -> Result<Self> {
        if sql.contains('\0') {
            return Err(Error::Protocol("query contains nul bytes".into()));
        }
        if sql.len() > i32::MAX as usize {
            return Err(Error::Protocol(format!(
                "query string must be smaller than {} bytes",
                i32::MAX
            )));
        }

        let db = conn.handle.as_ptr();
        let mut remaining = sql.as_bytes();
        let handle = prepare_next(db, &mut remaining)?;

        if prepare_next(db, &mut remaining)?.is_some() {
            // The second handle is dropped, and so finalized, right here.
            return Err(Error::Protocol(
                "prepared text must hold exactly one statement; use exec for scripts".into(),
            ));
        }

        let columns: Arc<[Column]> = match &handle {
            Some(h) => (0..h.column_count())
                .map(|i| Column::new(h.column_name(i), h.column_decltype(i)))
                .collect(),
            None => Arc::new([]),
        };

        Ok(Self {
            conn,
            sql: sql.to_owned(),
            handle,
            finalized: false,
            columns,
            state: State::NotStarted,
            total_changes_at_start: conn.handle.total_changes(),
        })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Result columns captured at prepare time.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn parameter_count(&self) -> usize {
        self.handle
            .as_ref()
            .map_or(0, StatementHandle::bind_parameter_count)
    }

    /// `true` if running the statement cannot change the database.
    pub fn is_read_only(&self) -> bool {
        self.handle.as_ref().is_none_or(StatementHandle::is_read_only)
    }

    /// Rows changed by the last run of this statement.
    ///
    /// Statements that changed no rows, DDL and pragmas included, report zero rather than
    /// the count left behind by an earlier INSERT, UPDATE or DELETE.
    pub fn rows_affected(&self) -> u64 {
        let changed = self.conn.handle.total_changes() != self.total_changes_at_start;
        if self.is_read_only() || !changed {
            0
        } else {
            self.conn.handle.changes().max(0) as u64
        }
    }

    fn check_live(&self) -> Result<()> {
        if self.finalized {
            return Err(Error::Protocol(format!(
                "statement has been finalized: {}",
                self.sql
            )));
        }
        Ok(())
    }

    /// Bind positional parameters, replacing any earlier bindings.
    ///
    /// The statement is reset first, so re-binding after rows have been produced starts
    /// the result set over.
    pub fn bind(&mut self, arguments: &Arguments) -> Result<()> {
        self.check_live()?;
        match self.handle.as_mut() {
            Some(handle) => {
                // A failed earlier step is reported again by reset; it does not concern the rebind.
                let _ = handle.reset();
                handle.clear_bindings();
                arguments.bind(handle)?;
            }
            None if !arguments.is_empty() => {
                return Err(Error::BindArity {
                    expected: 0,
                    actual: arguments.len(),
                });
            }
            None => {}
        }
        self.state = State::NotStarted;
        Ok(())
    }

    /// Advance one row. `Ok(None)` means the result set is exhausted.
    ///
    /// Once exhausted the statement keeps returning `Ok(None)` until it is re-bound.
    pub fn step(&mut self) -> Result<Option<Row>> {
        self.check_live()?;
        if self.state == State::Done {
            return Ok(None);
        }

        let not_started = self.state == State::NotStarted;
        if not_started {
            self.total_changes_at_start = self.conn.handle.total_changes();
        }

        let Some(handle) = self.handle.as_mut() else {
            self.state = State::Done;
            return Ok(None);
        };

        // Rows already handed out would be produced again by a restart.
        match handle.step(not_started) {
            Ok(true) => self.state = State::Running,
            Ok(false) => {
                self.state = State::Done;
                return Ok(None);
            }
            Err(e) => {
                self.state = State::Done;
                return Err(e);
            }
        }

        let mut values = Vec::with_capacity(self.columns.len());
        for (i, column) in self.columns.iter().enumerate() {
            let decoded = handle
                .column_value(i)
                .and_then(|value| codec::decode_with(&value, column.affinity));
            values.push(decoded.map_err(|source| Error::ColumnDecode {
                column: column.name.clone(),
                source,
            })?);
        }

        Ok(Some(Row::new(Arc::clone(&self.columns), values)))
    }

    /// Step until exhausted, collecting rows in the requested shape.
    pub fn fetch_all(&mut self, shape: Shape) -> Result<Rows> {
        let mut rows = Vec::new();
        while let Some(row) = self.step()? {
            rows.push(row);
        }
        Ok(Rows::collect(rows, shape))
    }

    /// Release the native handle. Safe to call any number of times.
    pub fn finalize(&mut self) {
        self.handle = None;
        self.finalized = true;
    }
}

/// Prepare the next statement in `sql`, advancing it past the consumed text.
///
/// Whitespace, comments and empty statements are skipped. Returns `None` once no
/// SQL remains.
fn prepare_next(db: *mut sqlite3, sql: &mut &[u8]) -> Result<Option<StatementHandle>> {
    while !sql.is_empty() {
        let mut stmt: *mut sqlite3_stmt = null_mut();
        let mut tail: *const c_char = null();
        let sql_ptr = sql.as_ptr() as *const c_char;

        // <https://www.sqlite.org/c3ref/prepare.html>
        loop {
            match ffi::prepare_v3(db, sql_ptr, sql.len() as i32, &mut stmt, &mut tail) {
                Ok(()) => break,
                Err(e) if e.should_retry() => {
                    unlock_notify::wait(db, None, unlock_notify::DEFAULT_MAX_RETRIES)?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        let handle = NonNull::new(stmt).map(StatementHandle::new);
        let consumed = (tail as usize).saturating_sub(sql_ptr as usize);
        *sql = &sql[consumed.min(sql.len())..];

        if handle.is_some() || consumed == 0 {
            return Ok(handle);
        }
    }

    Ok(None)
}
