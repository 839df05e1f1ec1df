use std::time::Duration;

use rusqlite::Connection;

use crate::error::SqlDaoError;

use super::executor::SqliteExecutor;

/// Options for opening `SQLite` connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteOptions {
    pub db_path: String,
    /// Switch the database to WAL journaling when it is opened.
    pub wal: bool,
    pub busy_timeout: Option<Duration>,
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            db_path,
            wal: true,
            busy_timeout: None,
        }
    }

    #[must_use]
    pub fn with_wal(mut self, wal: bool) -> Self {
        self.wal = wal;
        self
    }

    #[must_use]
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = Some(timeout);
        self
    }

    /// Open a connection with these options applied.
    ///
    /// # Errors
    /// Returns `SqlDaoError::SqliteError` if the database cannot be opened or
    /// a pragma fails.
    pub fn connect(&self) -> Result<Connection, SqlDaoError> {
        let conn = Connection::open(&self.db_path)?;
        if let Some(timeout) = self.busy_timeout {
            conn.busy_timeout(timeout)?;
        }
        Ok(conn)
    }

    pub(crate) fn apply_journal_mode(&self, conn: &Connection) -> Result<(), SqlDaoError> {
        if self.wal {
            // journal_mode returns a row, so it cannot go through execute
            conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
        }
        Ok(())
    }
}

/// Fluent builder for `SQLite` options.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            opts: SqliteOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn wal(mut self, wal: bool) -> Self {
        self.opts.wal = wal;
        self
    }

    #[must_use]
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.opts.busy_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }

    /// Build an executor that opens a connection per call.
    ///
    /// # Errors
    /// Returns `SqlDaoError` if the initial connection check fails.
    pub fn build(self) -> Result<SqliteExecutor, SqlDaoError> {
        SqliteExecutor::open(self.finish())
    }
}

impl SqliteExecutor {
    #[must_use]
    pub fn builder(db_path: String) -> SqliteOptionsBuilder {
        SqliteOptionsBuilder::new(db_path)
    }
}
