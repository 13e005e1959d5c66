//! A connection shared by many callers through a single worker thread.
//!
//! Because SQLite is accessed through blocking calls and a connection must not be used
//! by two threads at once, the [`Server`] gives one dedicated OS thread exclusive
//! ownership of the connection. Callers send requests over a bounded channel; the
//! worker services them strictly in arrival order and answers each over its own
//! oneshot channel.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use futures_executor::block_on;
use tokio::sync::{oneshot, watch};

use crate::{
    Column, QueryOptions, QueryResult, Rows, Serqlite,
    error::{Error, Result},
    sqlite::{Connection, connection::establish::EstablishParams},
};

mod worker;

use worker::Command;

/// A cloneable handle to a connection owned by a worker thread.
///
/// # Timeouts
///
/// A timeout, from [`QueryOptions::timeout`] or else [`Serqlite::call_timeout`], bounds
/// how long the caller waits for its reply, including time spent queued behind other
/// requests. It does not cancel anything: once a request is queued the worker runs it to
/// completion even if its caller has given up, so a timed out write may still land. A
/// request whose deadline passes before it could even be queued is not run.
///
/// # Stopping
///
/// [`stop`](Self::stop) is queued like any other request. Requests queued before it are
/// serviced; afterwards every call fails with [`Error::WorkerStopped`]. Dropping the last
/// clone stops the server too, blocking until the queue has drained.
#[derive(Clone, Debug)]
pub struct Server {
    inner: Arc<ServerInner>,
}

#[derive(Debug)]
struct ServerInner {
    command_tx: flume::Sender<Command>,
    join_handle: Mutex<Option<thread::JoinHandle<()>>>,
    // Closed when the worker thread exits, for whatever reason.
    alive: watch::Receiver<()>,
    default_timeout: Option<Duration>,
}

impl Server {
    pub(crate) async fn start(options: &Serqlite) -> Result<Self> {
        let params = EstablishParams::from_options(options)?;
        let default_timeout = params.call_timeout;
        let (establish_tx, establish_rx) = oneshot::channel();
        let (command_tx, command_rx) = flume::bounded(params.command_channel_size);
        let (alive_tx, alive) = watch::channel(());

        let join_handle = thread::Builder::new()
            .name(params.thread_name.clone())
            .spawn(move || {
                let _alive = alive_tx;
                let conn = match params.open() {
                    Ok(conn) => conn,
                    Err(e) => {
                        establish_tx.send(Err(e)).ok();
                        return;
                    }
                };

                if establish_tx.send(Ok(())).is_err() {
                    return;
                }

                worker::run(conn, command_rx);
            })?;

        let established: Result<()> = establish_rx.await.map_err(|_| Error::WorkerStopped)?;
        if let Err(e) = established {
            let _ = join_handle.join();
            return Err(e);
        }

        Ok(Self {
            inner: Arc::new(ServerInner {
                command_tx,
                join_handle: Mutex::new(Some(join_handle)),
                alive,
                default_timeout,
            }),
        })
    }

    /// Queue a command and wait for its reply, bounded by `timeout` if set.
    ///
    /// A zero limit queues the command without waiting and always reports a timeout. The
    /// command still runs unless the queue was full.
    async fn call<T>(
        &self,
        timeout: Option<Duration>,
        command: impl FnOnce(oneshot::Sender<Result<T>>) -> Command,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        let command = command(tx);
        let limit = timeout.or(self.inner.default_timeout);

        if let Some(limit) = limit.filter(Duration::is_zero) {
            return match self.inner.command_tx.try_send(command) {
                Ok(()) | Err(flume::TrySendError::Full(_)) => Err(Error::Timeout(limit)),
                Err(flume::TrySendError::Disconnected(_)) => Err(Error::WorkerStopped),
            };
        }

        let round_trip = async {
            self.inner
                .command_tx
                .send_async(command)
                .await
                .map_err(|_| Error::WorkerStopped)?;

            // Commands still queued when the worker exits are never answered.
            let mut alive = self.inner.alive.clone();
            tokio::select! {
                biased;
                reply = rx => reply.unwrap_or(Err(Error::WorkerStopped)),
                _ = alive.changed() => Err(Error::WorkerStopped),
            }
        };

        match limit {
            Some(limit) => tokio::time::timeout(limit, round_trip)
                .await
                .map_err(|_| Error::Timeout(limit))?,
            None => round_trip.await,
        }
    }

    /// Run a query on the worker and collect its rows.
    pub async fn query(&self, sql: impl Into<String>, options: QueryOptions) -> Result<Rows> {
        let sql = sql.into();
        let timeout = options.timeout;
        self.call(timeout, |tx| Command::Query { sql, options, tx })
            .await
    }

    /// Like [`query`](Self::query), but panics with the error instead of returning it.
    ///
    /// # Panics
    ///
    /// Panics if the query fails, times out, or the server has stopped.
    pub async fn query_or_fail(&self, sql: impl Into<String>, options: QueryOptions) -> Rows {
        match self.query(sql, options).await {
            Ok(rows) => rows,
            Err(e) => panic!("query failed: {e}"),
        }
    }

    /// Run a statement for its side effects.
    pub async fn execute(
        &self,
        sql: impl Into<String>,
        options: QueryOptions,
    ) -> Result<QueryResult> {
        let sql = sql.into();
        let timeout = options.timeout;
        self.call(timeout, |tx| Command::Execute { sql, options, tx })
            .await
    }

    /// Run one or more `;`-separated statements, discarding any rows.
    pub async fn exec(&self, sql: impl Into<String>) -> Result<()> {
        let sql = sql.into();
        self.call(None, |tx| Command::Exec { sql, tx }).await
    }

    /// The result columns a statement would produce, without running it.
    pub async fn describe(&self, sql: impl Into<String>) -> Result<Vec<Column>> {
        let sql = sql.into();
        self.call(None, |tx| Command::Describe { sql, tx }).await
    }

    /// Run a closure on the worker thread with exclusive use of the connection.
    ///
    /// Other requests wait until the closure returns, so it should not block on
    /// anything but the database.
    pub async fn with_connection<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Connection) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.call(None, |tx| {
            Command::Run(Box::new(move |conn: &mut Connection| {
                worker::reply(tx, Ok(f(conn)))
            }))
        })
        .await
    }

    /// Run a closure inside a transaction on the worker thread.
    ///
    /// The transaction commits if the closure returns `Ok` and rolls back otherwise.
    pub async fn with_transaction<F, R, E>(&self, f: F) -> std::result::Result<R, E>
    where
        F: FnOnce(&mut Connection) -> std::result::Result<R, E> + Send + 'static,
        R: Send + 'static,
        E: From<Error> + Send + 'static,
    {
        match self.with_connection(move |conn| conn.transaction(f)).await {
            Ok(result) => result,
            Err(e) => Err(E::from(e)),
        }
    }

    /// Service everything already queued, then close the connection and end the worker.
    pub async fn stop(&self) -> Result<()> {
        self.call(None, |tx| Command::Shutdown { tx }).await?;
        self.inner.join()
    }

    /// `true` once the worker has stopped accepting requests.
    pub fn is_stopped(&self) -> bool {
        self.inner.command_tx.is_disconnected()
    }
}

impl ServerInner {
    fn join(&self) -> Result<()> {
        let handle = self.join_handle.lock()?.take();
        if let Some(handle) = handle {
            handle.join().map_err(|_| Error::WorkerStopped)?;
        }
        Ok(())
    }
}

impl Drop for ServerInner {
    fn drop(&mut self) {
        if self.command_tx.is_disconnected() {
            let _ = self.join();
            return;
        }

        // Best effort: wait for the queue to drain and the connection to close.
        let (tx, rx) = oneshot::channel();
        if self.command_tx.send(Command::Shutdown { tx }).is_ok() {
            let mut alive = self.alive.clone();
            block_on(async {
                tokio::select! {
                    biased;
                    _ = rx => {}
                    _ = alive.changed() => {}
                }
            });
        }
        if let Err(error) = self.join() {
            tracing::error!(%error, "server worker did not shut down cleanly");
        }
    }
}
