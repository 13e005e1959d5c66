//! Embedded SQLite with declared-type decoding and a single-threaded query server.
//!
//! A [`Connection`] is an exclusively owned handle to one database. Queries run as
//! prepare, bind, step, finalize; every result value is decoded according to the
//! declared type of its column (`DATETIME`, `DATE`, `BOOLEAN`, `DECIMAL(p, s)`), so a
//! timestamp column yields a [`Datum::Timestamp`] rather than raw text.
//!
//! A [`Server`] moves a connection onto its own worker thread and lets any number of
//! async callers share it. Requests are serviced strictly in the order they arrive.
//!
//! ```no_run
//! use serqlite::{QueryOptions, Serqlite, Shape};
//!
//! # async fn example() -> serqlite::Result<()> {
//! let server = Serqlite::new().start().await?;
//! server
//!     .exec("CREATE TABLE events (id INTEGER PRIMARY KEY, at DATETIME)")
//!     .await?;
//! server
//!     .execute(
//!         "INSERT INTO events (at) VALUES (?)",
//!         QueryOptions::new().bind("2024-03-01 12:30:00"),
//!     )
//!     .await?;
//! let rows = server
//!     .query("SELECT * FROM events", QueryOptions::new().shape(Shape::Map))
//!     .await?;
//! assert_eq!(rows.len(), 1);
//! server.stop().await?;
//! # Ok(())
//! # }
//! ```

mod sqlite;

pub mod codec;
mod column;
mod datum;
pub mod decode;
pub mod encode;
mod error;
mod logger;
mod query;
mod query_result;
mod row;
mod serqlite;
mod server;
mod transaction;
pub mod types;

pub use crate::{
    column::Column,
    datum::Datum,
    error::{DecodeError, Error, Result},
    logger::LogSettings,
    query::QueryOptions,
    query_result::QueryResult,
    row::{Row, Rows, Shape},
    serqlite::{JournalMode, Serqlite},
    server::Server,
    sqlite::{
        Affinity, Arguments, Connection, DEFAULT_MAX_RETRIES, ExtendedErrCode, PrimaryErrCode,
        SqliteError, Statement, StorageClass, Value,
    },
    transaction::Transaction,
};
