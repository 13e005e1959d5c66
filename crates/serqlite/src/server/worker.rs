use tokio::sync::oneshot;

use crate::{
    Column, QueryOptions, QueryResult, Rows,
    error::Result,
    sqlite::Connection,
};

pub(crate) type Job = Box<dyn FnOnce(&mut Connection) + Send>;

/// A request queued for the worker thread.
pub(crate) enum Command {
    Query {
        sql: String,
        options: QueryOptions,
        tx: oneshot::Sender<Result<Rows>>,
    },
    Execute {
        sql: String,
        options: QueryOptions,
        tx: oneshot::Sender<Result<QueryResult>>,
    },
    Exec {
        sql: String,
        tx: oneshot::Sender<Result<()>>,
    },
    Describe {
        sql: String,
        tx: oneshot::Sender<Result<Vec<Column>>>,
    },
    /// Run arbitrary code against the connection. The job sends its own reply.
    Run(Job),
    Shutdown {
        tx: oneshot::Sender<Result<()>>,
    },
}

/// Deliver a reply. A caller that timed out or went away is no longer listening.
pub(crate) fn reply<T>(tx: oneshot::Sender<Result<T>>, result: Result<T>) {
    if tx.send(result).is_err() {
        tracing::debug!("caller stopped waiting; reply discarded");
    }
}

/// The worker loop: service commands one at a time, in arrival order, until told to
/// stop or until every sender is gone.
pub(crate) fn run(mut conn: Connection, commands: flume::Receiver<Command>) {
    tracing::debug!("server worker started");

    for command in commands.iter() {
        match command {
            Command::Query { sql, options, tx } => reply(tx, conn.query(&sql, &options)),
            Command::Execute { sql, options, tx } => reply(tx, conn.execute(&sql, &options)),
            Command::Exec { sql, tx } => reply(tx, conn.exec(&sql)),
            Command::Describe { sql, tx } => reply(tx, conn.describe(&sql)),
            Command::Run(job) => job(&mut conn),
            Command::Shutdown { tx } => {
                let result = conn.close();
                tracing::debug!("server worker stopped");
                reply(tx, result);
                return;
            }
        }
    }

    if let Err(error) = conn.close() {
        tracing::error!(%error, "failed to close connection of abandoned server");
    }
    tracing::debug!("server worker stopped: all handles dropped");
}
