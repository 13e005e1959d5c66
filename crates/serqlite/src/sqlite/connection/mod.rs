use std::fmt::{self, Debug, Formatter};

use crate::{
    Column, QueryOptions, QueryResult, Result, Rows,
    error::Error,
    logger::{LogSettings, QueryLogger},
    sqlite::statement::Statement,
    transaction::Transaction,
};

pub(crate) use handle::ConnectionHandle;

pub(crate) mod establish;
mod handle;

/// A connection to an open database, for use by one caller at a time.
///
/// `Connection` is `Send` but not `Sync`: it may move to another thread, but it cannot be
/// shared between threads. To share one connection between many tasks, start a
/// [`Server`](crate::Server) instead.
///
/// Statements borrow the connection, so a connection cannot be closed while a statement
/// prepared on it is alive.
pub struct Connection {
    pub(crate) handle: ConnectionHandle,
    pub(crate) transaction_depth: usize,
    log_settings: LogSettings,
}

impl Debug for Connection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("transaction_depth", &self.transaction_depth)
            .field("open_statements", &self.open_statements())
            .finish()
    }
}

impl Connection {
    pub(crate) fn new(handle: ConnectionHandle, log_settings: LogSettings) -> Self {
        Self {
            handle,
            transaction_depth: 0,
            log_settings,
        }
    }

    /// Compile a single statement.
    pub fn prepare(&self, sql: &str) -> Result<Statement<'_>> {
        Statement::prepare(self, sql)
    }

    /// Run one or more `;`-separated statements, discarding any rows they produce.
    pub fn exec(&self, sql: &str) -> Result<()> {
        self.handle.exec(sql)
    }

    /// Prepare, bind, collect every row and finalize.
    ///
    /// Statements without result columns, such as DDL, yield no rows. The statement is
    /// finalized on every path, including errors.
    pub fn query(&self, sql: &str, options: &QueryOptions) -> Result<Rows> {
        let mut logger = QueryLogger::new(sql, self.log_settings.clone());

        let mut statement = self.prepare(sql)?;
        statement.bind(&options.arguments)?;
        let rows = statement.fetch_all(options.shape)?;

        logger.increase_rows_returned(rows.len() as u64);
        logger.increase_rows_affected(statement.rows_affected());
        statement.finalize();
        Ok(rows)
    }

    /// Like [`query`](Self::query), but panics with the error instead of returning it.
    ///
    /// # Panics
    ///
    /// Panics if the query fails.
    pub fn query_or_fail(&self, sql: &str, options: &QueryOptions) -> Rows {
        match self.query(sql, options) {
            Ok(rows) => rows,
            Err(e) => panic!("query failed: {e}"),
        }
    }

    /// Run a statement for its side effects.
    pub fn execute(&self, sql: &str, options: &QueryOptions) -> Result<QueryResult> {
        let mut logger = QueryLogger::new(sql, self.log_settings.clone());

        let mut statement = self.prepare(sql)?;
        statement.bind(&options.arguments)?;
        let mut rows_returned = 0;
        while statement.step()?.is_some() {
            rows_returned += 1;
        }

        let result = QueryResult {
            rows_affected: statement.rows_affected(),
            last_insert_rowid: self.handle.last_insert_rowid(),
        };
        logger.increase_rows_returned(rows_returned);
        logger.increase_rows_affected(result.rows_affected);
        statement.finalize();
        Ok(result)
    }

    /// The result columns a statement would produce, without running it.
    pub fn describe(&self, sql: &str) -> Result<Vec<Column>> {
        Ok(self.prepare(sql)?.columns().to_vec())
    }

    /// Begin a transaction, or a savepoint inside the current one.
    pub fn begin(&mut self) -> Result<Transaction<'_>> {
        Transaction::begin(self)
    }

    /// Run `f` inside a transaction: committed if `f` returns `Ok`, rolled back otherwise.
    ///
    /// Nested calls use savepoints.
    pub fn transaction<F, R, E>(&mut self, f: F) -> std::result::Result<R, E>
    where
        F: FnOnce(&mut Connection) -> std::result::Result<R, E>,
        E: From<Error>,
    {
        let mut transaction = self.begin()?;
        match f(&mut transaction) {
            Ok(ret) => {
                transaction.commit()?;
                Ok(ret)
            }
            Err(err) => {
                transaction.rollback()?;
                Err(err)
            }
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction_depth > 0
    }

    /// Statements currently prepared against this connection, as counted by the engine.
    pub fn open_statements(&self) -> usize {
        self.handle.open_statements()
    }

    pub fn last_insert_rowid(&self) -> i64 {
        self.handle.last_insert_rowid()
    }

    /// Close the connection, reporting any error from the engine.
    ///
    /// Dropping a connection also closes it, but errors are then only logged.
    pub fn close(self) -> Result<()> {
        self.handle.close().map_err(Error::from)
    }
}
