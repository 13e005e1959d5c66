use std::{
    fmt::{self, Debug, Formatter},
    ops::{Deref, DerefMut},
};

use crate::{Connection, Result};

/// An in-progress transaction or savepoint.
///
/// A transaction starts with [`Connection::begin`] and should end with [`commit`] or
/// [`rollback`]. If neither is called before it goes out of scope, it is rolled back.
/// Beginning a transaction on a transaction opens a savepoint.
///
/// [`commit`]: Self::commit()
/// [`rollback`]: Self::rollback()
pub struct Transaction<'c> {
    connection: &'c mut Connection,
    open: bool,
}

impl<'c> Transaction<'c> {
    pub(crate) fn begin(connection: &'c mut Connection) -> Result<Self> {
        let depth = connection.transaction_depth;
        connection.exec(&begin_savepoint_sql(depth))?;
        connection.transaction_depth += 1;
        Ok(Self {
            connection,
            open: true,
        })
    }

    /// Commits this transaction or releases this savepoint.
    pub fn commit(mut self) -> Result<()> {
        let depth = self.connection.transaction_depth;
        self.connection.exec(&commit_savepoint_sql(depth))?;
        self.connection.transaction_depth -= 1;
        self.open = false;
        Ok(())
    }

    /// Aborts this transaction or rolls back to this savepoint.
    pub fn rollback(mut self) -> Result<()> {
        self.rollback_in_place()
    }

    fn rollback_in_place(&mut self) -> Result<()> {
        let depth = self.connection.transaction_depth;
        // Whether or not the rollback succeeds, this level is over.
        self.open = false;
        self.connection.transaction_depth -= 1;
        self.connection.exec(&rollback_savepoint_sql(depth))
    }
}

impl Debug for Transaction<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("open", &self.open)
            .field("transaction_depth", &self.connection.transaction_depth)
            .finish()
    }
}

impl Deref for Transaction<'_> {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        self.connection
    }
}

impl DerefMut for Transaction<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.connection
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.open
            && let Err(error) = self.rollback_in_place()
        {
            tracing::error!(%error, "failed to roll back dropped transaction");
        }
    }
}

fn savepoint_name(depth: usize) -> String {
    format!("_serqlite_savepoint_{depth}")
}

/// The outermost savepoint also starts the transaction.
pub(crate) fn begin_savepoint_sql(depth: usize) -> String {
    format!("SAVEPOINT {}", savepoint_name(depth))
}

pub(crate) fn commit_savepoint_sql(depth: usize) -> String {
    format!("RELEASE SAVEPOINT {}", savepoint_name(depth - 1))
}

pub(crate) fn rollback_savepoint_sql(depth: usize) -> String {
    if depth == 1 {
        "ROLLBACK".into()
    } else {
        let name = savepoint_name(depth - 1);
        format!("ROLLBACK TO SAVEPOINT {name}; RELEASE SAVEPOINT {name}")
    }
}
