//! Async SQLite handle backed by a dedicated executor thread.
//!
//! `tokio-rusqlite` owns the single SQLite connection on its own thread.
//! Every operation is sent to that thread through a channel and executed in
//! FIFO order, so concurrent callers never block the Tokio runtime and
//! never need their own locking.
//!
//! ```ignore
//! let store = SqliteStore::open("sqlite:///var/lib/app.db").await?;
//! store.execute("INSERT INTO t(a) VALUES (?)".into(), vec![SqlParam::Integer(42)]).await?;
//! ```

use crate::statement::{execute_with_params, ExecSummary};
use crate::{DatabaseError, DatabaseLocation, DatabaseResult, SqlParam};
use std::time::Duration;
use tokio_rusqlite::Connection;
use tracing::{debug, info};

const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

fn from_tokio_rusqlite(e: tokio_rusqlite::Error) -> DatabaseError {
    match e {
        tokio_rusqlite::Error::Rusqlite(e) => DatabaseError::Sqlite(e),
        tokio_rusqlite::Error::ConnectionClosed => {
            DatabaseError::Connection("Connection closed".to_string())
        }
        other => DatabaseError::Connection(other.to_string()),
    }
}

/// Shared SQLite handle.
///
/// Cloning is cheap; all clones talk to the same executor thread.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Connection,
    location: DatabaseLocation,
}

impl SqliteStore {
    /// Open the database named by a `DATABASE_URL` style string.
    pub async fn open(url: &str) -> DatabaseResult<Self> {
        Self::open_location(DatabaseLocation::parse(url)?).await
    }

    /// Open a database at an already parsed location.
    ///
    /// This will:
    /// - Create the database file (and its parent directory) if missing
    /// - Enable WAL mode for file databases and set a busy timeout
    /// - Check that the connection answers a trivial query
    pub async fn open_location(location: DatabaseLocation) -> DatabaseResult<Self> {
        location.ensure_parent_dir()?;

        info!(location = %location, "Opening database");

        let conn = Connection::open(location.open_target())
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        let use_wal = !location.is_memory();
        conn.call(move |conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            if use_wal {
                // journal_mode answers with a row, so go through the
                // row-draining executor rather than execute_batch
                execute_with_params(
                    conn,
                    "PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;",
                    &[],
                )?;
            }
            Ok(())
        })
        .await
        .map_err(from_tokio_rusqlite)?;

        let store = Self { conn, location };
        store.health_check().await?;

        info!(location = %store.location, wal = use_wal, "Database ready");
        Ok(store)
    }

    /// Execute a closure that returns a rusqlite::Result.
    pub async fn call_sqlite<F, T>(&self, f: F) -> DatabaseResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.conn
            .call(move |conn| Ok(f(conn)?))
            .await
            .map_err(from_tokio_rusqlite)
    }

    /// Run request SQL with positional params.
    ///
    /// No transaction is opened; each statement is its own unit of work.
    pub async fn execute(&self, sql: String, params: Vec<SqlParam>) -> DatabaseResult<ExecSummary> {
        self.call_sqlite(move |conn| execute_with_params(conn, &sql, &params))
            .await
    }

    /// Check that the connection answers a trivial query.
    pub async fn health_check(&self) -> DatabaseResult<()> {
        self.call_sqlite(|conn| conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)))
            .await?;
        debug!("Database health check passed");
        Ok(())
    }

    /// Close the connection after pending operations finish.
    pub async fn close(self) -> DatabaseResult<()> {
        self.conn
            .close()
            .await
            .map_err(|e| DatabaseError::Connection(format!("Failed to close database: {:?}", e)))?;
        info!(location = %self.location, "Database closed");
        Ok(())
    }
}
