use std::{
    fmt::{self, Debug, Display, Formatter, Write},
    path::{Path, PathBuf},
    sync::Arc,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use indexmap::IndexMap;
use log::LevelFilter;

use crate::{
    Result,
    logger::LogSettings,
    server::Server,
    sqlite::{Connection, connection::establish::EstablishParams},
};

static IN_MEMORY_DB_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Refer to [SQLite documentation] for the meaning of the database journaling mode.
///
/// [SQLite documentation]: https://www.sqlite.org/pragma.html#pragma_journal_mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JournalMode {
    #[default]
    Delete,
    Truncate,
    Persist,
    Memory,
    Wal,
    Off,
}

impl JournalMode {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            JournalMode::Delete => "DELETE",
            JournalMode::Truncate => "TRUNCATE",
            JournalMode::Persist => "PERSIST",
            JournalMode::Memory => "MEMORY",
            JournalMode::Wal => "WAL",
            JournalMode::Off => "OFF",
        }
    }
}

impl Display for JournalMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wraps a closure so that it can sit in a `Debug` struct.
pub(crate) struct DebugFn<F: ?Sized>(pub F);

impl<F: ?Sized> Debug for DebugFn<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Function").finish()
    }
}

/// Configuration for opening a database, either directly or behind a [`Server`].
///
/// ```no_run
/// # async fn example() -> serqlite::Result<()> {
/// use serqlite::{QueryOptions, Serqlite};
///
/// let server = Serqlite::new()
///     .filename("app.db")
///     .create_if_missing(true)
///     .start()
///     .await?;
/// server.query("SELECT 1", QueryOptions::new()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Serqlite {
    pub(crate) filename: PathBuf,
    pub(crate) in_memory: bool,
    pub(crate) shared_cache: bool,
    pub(crate) read_only: bool,
    pub(crate) create_if_missing: bool,
    pub(crate) busy_timeout: Duration,
    pub(crate) log_settings: LogSettings,
    pub(crate) pragmas: IndexMap<String, Option<String>>,
    pub(crate) command_channel_size: usize,
    pub(crate) thread_name: Arc<DebugFn<dyn Fn(u64) -> String + Send + Sync + 'static>>,
    pub(crate) call_timeout: Option<Duration>,
}

impl Default for Serqlite {
    fn default() -> Self {
        Self::new()
    }
}

impl Serqlite {
    /// Options for a private in-memory database with default settings.
    #[must_use]
    pub fn new() -> Self {
        let mut pragmas: IndexMap<String, Option<String>> = IndexMap::new();

        // Reserve the position of pragmas that have to run in a fixed order, whether or
        // not they are later given a value.
        pragmas.insert("journal_mode".into(), None);

        // SQLite leaves foreign keys off for backward compatibility; we turn them on.
        // https://www.sqlite.org/foreignkeys.html#fk_enable
        pragmas.insert("foreign_keys".into(), Some("ON".into()));

        Self {
            filename: ":memory:".into(),
            in_memory: true,
            shared_cache: false,
            read_only: false,
            create_if_missing: false,
            busy_timeout: Duration::from_secs(5),
            log_settings: Default::default(),
            pragmas,
            command_channel_size: 50,
            thread_name: Arc::new(DebugFn(|id: u64| format!("serqlite-worker-{id}"))),
            call_timeout: None,
        }
    }

    /// Sets the name of the database file.
    #[must_use]
    pub fn filename(mut self, filename: impl AsRef<Path>) -> Self {
        self.filename = filename.as_ref().to_owned();
        self.in_memory = false;
        self.shared_cache = false;
        self
    }

    /// Use a private in-memory database, visible only to the connection that opens it.
    #[must_use]
    pub fn in_memory(mut self) -> Self {
        self.filename = ":memory:".into();
        self.in_memory = true;
        self.shared_cache = false;
        self
    }

    /// Use a named in-memory database shared by every connection in this process that
    /// opens the same name.
    ///
    /// The database lives as long as at least one connection to it stays open.
    #[must_use]
    pub fn shared_memory(mut self, name: impl Into<String>) -> Self {
        self.filename = PathBuf::from(name.into());
        self.in_memory = true;
        self.shared_cache = true;
        self
    }

    /// A shared in-memory database with a process-unique name.
    #[must_use]
    pub fn unique_shared_memory(self) -> Self {
        let seqno = IN_MEMORY_DB_SEQ.fetch_add(1, Ordering::Relaxed);
        self.shared_memory(format!("serqlite-in-memory-{seqno}"))
    }

    /// The database file, or the shared name of an in-memory database.
    pub fn get_filename(&self) -> &Path {
        &self.filename
    }

    /// Open the database for read-only access.
    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Create the database file if it does not exist.
    ///
    /// By default, a new file **will not be created** if one is not found.
    #[must_use]
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// How long the engine waits on a locked database file before reporting busy.
    ///
    /// The default busy timeout is 5 seconds.
    #[must_use]
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Set the enforcement of [foreign key constraints](https://www.sqlite.org/pragma.html#pragma_foreign_keys).
    ///
    /// On by default.
    #[must_use]
    pub fn foreign_keys(self, on: bool) -> Self {
        self.pragma("foreign_keys", if on { "ON" } else { "OFF" })
    }

    /// Sets the [journal mode](https://www.sqlite.org/pragma.html#pragma_journal_mode).
    ///
    /// Not set by default, so an existing database keeps its mode.
    #[must_use]
    pub fn journal_mode(self, mode: JournalMode) -> Self {
        self.pragma("journal_mode", mode.as_str())
    }

    /// Sets a pragma applied, in insertion order, whenever a connection is opened.
    #[must_use]
    pub fn pragma(mut self, key: &str, value: &str) -> Self {
        self.pragmas.insert(key.into(), Some(value.into()));
        self
    }

    #[must_use]
    pub fn log_statements(mut self, level: LevelFilter) -> Self {
        self.log_settings.log_statements(level);
        self
    }

    #[must_use]
    pub fn log_slow_statements(mut self, level: LevelFilter, duration: Duration) -> Self {
        self.log_settings.log_slow_statements(level, duration);
        self
    }

    /// Provide a callback to generate the name of the server's worker thread.
    ///
    /// The value passed to the callback is an auto-incremented integer.
    #[must_use]
    pub fn thread_name(mut self, generator: impl Fn(u64) -> String + Send + Sync + 'static) -> Self {
        self.thread_name = Arc::new(DebugFn(generator));
        self
    }

    /// Maximum number of requests queued for the server before callers wait to enqueue.
    #[must_use]
    pub fn command_buffer_size(mut self, size: usize) -> Self {
        self.command_channel_size = size;
        self
    }

    /// Default caller timeout for server requests whose options set none.
    #[must_use]
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Collect all `PRAGMA` commands into a single string.
    pub(crate) fn pragma_string(&self) -> String {
        let mut string = String::new();
        for (key, opt_value) in &self.pragmas {
            if let Some(value) = opt_value {
                write!(string, "PRAGMA {key} = {value}; ").ok();
            }
        }
        string
    }

    /// Open a connection for use on the current thread.
    pub fn open(&self) -> Result<Connection> {
        EstablishParams::from_options(self)?.open()
    }

    /// Open a connection owned by a new server worker thread.
    pub async fn start(&self) -> Result<Server> {
        Server::start(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pragma_order_is_stable() {
        let opts = Serqlite::new()
            .pragma("cache_size", "-2000")
            .journal_mode(JournalMode::Wal)
            .foreign_keys(false);
        assert_eq!(
            opts.pragma_string(),
            "PRAGMA journal_mode = WAL; PRAGMA foreign_keys = OFF; PRAGMA cache_size = -2000; "
        );
    }

    #[test]
    fn test_unique_shared_memory_names() {
        let a = Serqlite::new().unique_shared_memory();
        let b = Serqlite::new().unique_shared_memory();
        assert_ne!(a.get_filename(), b.get_filename());
        assert!(a.shared_cache && a.in_memory);
    }

    #[test]
    fn test_filename_leaves_memory_mode() {
        let opts = Serqlite::new().shared_memory("x").filename("data.db");
        assert!(!opts.in_memory && !opts.shared_cache);
    }
}
