use std::fmt;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::debug;

use crate::error::SqlDaoError;
use crate::executor::{RowHandler, SqlExecutor};
use crate::params::Parameter;

use super::config::SqliteOptions;
use super::params::bind_parameters;
use super::query::{SqliteRow, statement_columns};

enum ConnectionSource {
    /// Open a fresh connection for every call.
    PerCall(SqliteOptions),
    Shared(Mutex<Connection>),
}

/// [`SqlExecutor`] over rusqlite.
///
/// Each call prepares its statement, binds, steps the cursor and finalizes
/// the statement before returning. With a path-based executor the
/// connection is opened for the call and closed after the statement.
pub struct SqliteExecutor {
    source: ConnectionSource,
}

impl SqliteExecutor {
    /// Executor that opens `options.db_path` for every call.
    ///
    /// The database is opened once up front to apply the journal mode and
    /// surface path errors early.
    ///
    /// # Errors
    /// Returns `SqlDaoError` if the database cannot be opened.
    pub fn open(options: SqliteOptions) -> Result<Self, SqlDaoError> {
        let conn = options.connect()?;
        options.apply_journal_mode(&conn)?;
        drop(conn);
        Ok(Self {
            source: ConnectionSource::PerCall(options),
        })
    }

    /// Executor over one long-lived connection, serialized by a mutex.
    #[must_use]
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            source: ConnectionSource::Shared(Mutex::new(conn)),
        }
    }

    /// Shared executor over a private in-memory database.
    ///
    /// # Errors
    /// Returns `SqlDaoError::SqliteError` if `SQLite` cannot allocate it.
    pub fn in_memory() -> Result<Self, SqlDaoError> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    /// Run several `;`-separated statements, e.g. a schema script.
    ///
    /// # Errors
    /// Returns `SqlDaoError::SqliteError` if any statement fails.
    pub fn execute_batch(&self, sql: &str) -> Result<(), SqlDaoError> {
        self.with_connection(|conn| Ok(conn.execute_batch(sql)?))
    }

    fn with_connection<T, F>(&self, f: F) -> Result<T, SqlDaoError>
    where
        F: FnOnce(&Connection) -> Result<T, SqlDaoError>,
    {
        match &self.source {
            ConnectionSource::PerCall(options) => {
                let conn = options.connect()?;
                f(&conn)
            }
            ConnectionSource::Shared(conn) => {
                let guard = conn.lock().map_err(|err| {
                    SqlDaoError::ConnectionError(format!("SQLite connection mutex poisoned: {err}"))
                })?;
                f(&guard)
            }
        }
    }
}

impl SqlExecutor for SqliteExecutor {
    fn query(
        &self,
        sql: &str,
        params: &Parameter,
        on_row: &mut RowHandler<'_>,
    ) -> Result<(), SqlDaoError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(sql)?;
            bind_parameters(&mut stmt, params)?;
            let columns = statement_columns(&stmt);
            let mut rows = stmt.raw_query();
            while let Some(row) = rows.next()? {
                on_row(&SqliteRow::new(row, &columns))?;
            }
            Ok(())
        })
    }

    fn update(&self, sql: &str, params: &Parameter) -> Result<usize, SqlDaoError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(sql)?;
            bind_parameters(&mut stmt, params)?;
            let affected = stmt.raw_execute()?;
            debug!(affected, "sqlite update");
            Ok(affected)
        })
    }

    fn database_product(&self) -> Result<String, SqlDaoError> {
        Ok(format!("SQLite {}", rusqlite::version()))
    }
}

impl fmt::Debug for SqliteExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            ConnectionSource::PerCall(options) => options.db_path.as_str(),
            ConnectionSource::Shared(_) => "<shared connection>",
        };
        f.debug_struct("SqliteExecutor")
            .field("source", &source)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::ResultRow;
    use crate::params::NamedParams;
    use crate::types::{SqlType, SqlValue};

    fn seeded() -> SqliteExecutor {
        let exec = SqliteExecutor::in_memory().unwrap();
        exec.execute_batch(
            "CREATE TABLE item (id INTEGER PRIMARY KEY, label VARCHAR(20), price DECIMAL(10,2));
             INSERT INTO item VALUES (1, 'pen', 1.5), (2, 'ink', 3.25);",
        )
        .unwrap();
        exec
    }

    #[test]
    fn reports_declared_types_and_values() {
        let exec = seeded();
        let mut seen = Vec::new();
        exec.query(
            "SELECT id, label, price FROM item WHERE id = ?",
            &Parameter::Indexed([2].into_iter().collect()),
            &mut |row: &dyn ResultRow| {
                let columns = row.columns()?;
                let types: Vec<SqlType> = columns.iter().map(|c| c.sql_type).collect();
                assert_eq!(types, vec![SqlType::Integer, SqlType::Varchar, SqlType::Decimal]);
                for column in &columns {
                    seen.push(row.value(column)?);
                }
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(
            seen,
            vec![SqlValue::Int(2), SqlValue::Text("ink".into()), SqlValue::Float(3.25)]
        );
    }

    #[test]
    fn named_parameters_bind_by_placeholder() {
        let exec = seeded();
        let mut named = NamedParams::new();
        named.add("LABEL", "pen").add("UNUSED", 0);
        let updated = exec
            .update(
                "UPDATE item SET price = 2 WHERE label = :LABEL",
                &Parameter::Named(named),
            )
            .unwrap();
        assert_eq!(updated, 1);
    }

    #[test]
    fn unbound_named_placeholders_are_rejected() {
        let exec = seeded();
        let mut named = NamedParams::new();
        named.add("label", "pen");
        let err = exec
            .query(
                "SELECT id FROM item WHERE label = :LABEL",
                &Parameter::Named(named),
                &mut |_| Ok(()),
            )
            .unwrap_err();
        assert!(
            matches!(&err, SqlDaoError::ParameterError(msg) if msg.contains(":LABEL")),
            "{err}"
        );

        let err = exec
            .update("DELETE FROM item WHERE id = ?", &Parameter::named())
            .unwrap_err();
        assert!(matches!(err, SqlDaoError::ParameterError(_)));
    }

    #[test]
    fn positional_count_mismatch_is_a_parameter_error() {
        let exec = seeded();
        let err = exec
            .update("DELETE FROM item WHERE id = ?", &Parameter::indexed())
            .unwrap_err();
        assert!(matches!(err, SqlDaoError::ParameterError(_)));
    }

    #[test]
    fn driver_errors_propagate() {
        let exec = seeded();
        let err = exec
            .query("SELECT * FROM missing_table", &Parameter::default(), &mut |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, SqlDaoError::SqliteError(_)));
        assert!(exec.database_product().unwrap().starts_with("SQLite"));
    }
}
