use std::{
    ffi::CString,
    io,
    ptr::{NonNull, null_mut},
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use libsqlite3_sys::{
    SQLITE_OPEN_CREATE, SQLITE_OPEN_MEMORY, SQLITE_OPEN_NOMUTEX, SQLITE_OPEN_PRIVATECACHE,
    SQLITE_OPEN_READONLY, SQLITE_OPEN_READWRITE, SQLITE_OPEN_SHAREDCACHE, SQLITE_OPEN_URI,
};

use crate::{
    Error, Serqlite,
    logger::LogSettings,
    sqlite::{Connection, connection::ConnectionHandle, ffi},
};

static THREAD_ID: AtomicU64 = AtomicU64::new(0);

/// Everything needed to open a connection, resolved from [`Serqlite`] up front so that
/// configuration errors surface before a worker thread is spawned.
pub(crate) struct EstablishParams {
    filename: CString,
    open_flags: i32,
    busy_timeout: Duration,
    log_settings: LogSettings,
    pub(crate) pragmas: String,
    pub(crate) thread_name: String,
    pub(crate) command_channel_size: usize,
    pub(crate) call_timeout: Option<Duration>,
}

impl EstablishParams {
    pub(crate) fn from_options(options: &Serqlite) -> Result<Self, Error> {
        let filename = options
            .filename
            .to_str()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    "filename passed to SQLite must be valid UTF-8",
                )
            })?
            .to_owned();

        // The handle is only ever used by one thread at a time, so SQLite's own mutexes
        // are not needed.
        let mut flags = SQLITE_OPEN_NOMUTEX;

        flags |= if options.read_only {
            SQLITE_OPEN_READONLY
        } else if options.create_if_missing {
            SQLITE_OPEN_CREATE | SQLITE_OPEN_READWRITE
        } else {
            SQLITE_OPEN_READWRITE
        };

        if options.in_memory {
            flags |= SQLITE_OPEN_MEMORY;
        }

        flags |= if options.shared_cache {
            SQLITE_OPEN_SHAREDCACHE
        } else {
            SQLITE_OPEN_PRIVATECACHE
        };

        // SQLite only shares a named in-memory database when it is opened as a URI.
        let filename = if options.in_memory && options.shared_cache {
            flags |= SQLITE_OPEN_URI;
            format!("file:{filename}?mode=memory&cache=shared")
        } else {
            filename
        };

        let filename = CString::new(filename).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                "filename passed to SQLite must not contain nul bytes",
            )
        })?;

        Ok(Self {
            filename,
            open_flags: flags,
            busy_timeout: options.busy_timeout,
            log_settings: options.log_settings.clone(),
            pragmas: options.pragma_string(),
            thread_name: (options.thread_name.0)(THREAD_ID.fetch_add(1, Ordering::AcqRel)),
            command_channel_size: options.command_channel_size,
            call_timeout: options.call_timeout,
        })
    }

    /// Open the connection and apply the configured pragmas.
    pub(crate) fn open(&self) -> Result<Connection, Error> {
        let conn = self.establish()?;
        conn.exec(&self.pragmas)?;
        Ok(conn)
    }

    /// Open the connection. Pragmas are not applied here.
    ///
    /// The busy timeout is clamped to `i32::MAX` milliseconds for [`sqlite3_busy_timeout`].
    fn establish(&self) -> Result<Connection, Error> {
        let mut handle = null_mut();

        // <https://www.sqlite.org/c3ref/open.html>
        ffi::open_v2(self.filename.as_ptr(), &mut handle, self.open_flags)?;

        let Some(handle) = NonNull::new(handle) else {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::OutOfMemory,
                "SQLite is unable to allocate memory to hold the sqlite3 object",
            )));
        };
        let handle = ConnectionHandle::new(handle);

        // https://www.sqlite.org/c3ref/extended_result_codes.html
        ffi::extended_result_codes(handle.as_ptr(), true)?;

        let ms = i32::try_from(self.busy_timeout.as_millis()).unwrap_or(i32::MAX);
        ffi::busy_timeout(handle.as_ptr(), ms)?;

        Ok(Connection::new(handle, self.log_settings.clone()))
    }
}
