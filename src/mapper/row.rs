use std::io::Read;

use crate::error::SqlDaoError;
use crate::types::{SqlType, SqlValue};

/// A result column as reported by cursor metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Position in the result, zero-based.
    pub index: usize,
    pub name: String,
    pub sql_type: SqlType,
    key: String,
}

impl ColumnInfo {
    #[must_use]
    pub fn new(index: usize, name: impl Into<String>, sql_type: SqlType) -> Self {
        let name = name.into();
        Self {
            index,
            key: name.to_uppercase(),
            name,
            sql_type,
        }
    }

    /// Upper-cased name used for case-insensitive field lookup.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// One row of a cursor, as handed out by a [`SqlExecutor`](crate::SqlExecutor).
pub trait ResultRow {
    /// Column metadata in result order.
    ///
    /// # Errors
    /// Returns `SqlDaoError` if the backend cannot describe the result.
    fn columns(&self) -> Result<Vec<ColumnInfo>, SqlDaoError>;

    /// Read a column, typed by its declared SQL type.
    ///
    /// # Errors
    /// Returns `SqlDaoError` if the value cannot be extracted.
    fn value(&self, column: &ColumnInfo) -> Result<SqlValue, SqlDaoError>;

    /// Open a BLOB/CLOB column as a byte stream; `None` for NULL.
    ///
    /// # Errors
    /// Returns `SqlDaoError` if the large object cannot be opened.
    fn open_lob(&self, column: &ColumnInfo) -> Result<Option<Box<dyn Read + '_>>, SqlDaoError>;

    /// Read a column, streaming BLOB/CLOB columns through
    /// [`open_lob`](Self::open_lob).
    ///
    /// Backends whose LOB columns may hold plain values override this.
    ///
    /// # Errors
    /// As for [`read_streamed`].
    fn read(&self, column: &ColumnInfo) -> Result<SqlValue, SqlDaoError> {
        read_streamed(self, column)
    }
}

/// Read a column through [`ResultRow::read`].
///
/// # Errors
/// Returns `SqlDaoError` from the backend, or `IoError` if a LOB stream fails.
pub fn read_column(row: &dyn ResultRow, column: &ColumnInfo) -> Result<SqlValue, SqlDaoError> {
    row.read(column)
}

/// Read a column, streaming large objects into bytes or text.
///
/// # Errors
/// Returns `SqlDaoError` from the backend, or `IoError` if a LOB stream fails.
pub fn read_streamed<R: ResultRow + ?Sized>(
    row: &R,
    column: &ColumnInfo,
) -> Result<SqlValue, SqlDaoError> {
    match column.sql_type {
        SqlType::Blob => {
            let Some(mut reader) = row.open_lob(column)? else {
                return Ok(SqlValue::Null);
            };
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes)?;
            Ok(SqlValue::Blob(bytes))
        }
        SqlType::Clob => {
            let Some(mut reader) = row.open_lob(column)? else {
                return Ok(SqlValue::Null);
            };
            let mut text = String::new();
            reader.read_to_string(&mut text)?;
            Ok(SqlValue::Text(text))
        }
        _ => row.value(column),
    }
}
