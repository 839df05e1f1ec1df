use std::io::Read;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::Statement;
use rusqlite::types::ValueRef;

use crate::error::SqlDaoError;
use crate::mapper::{ColumnInfo, ResultRow, read_streamed};
use crate::types::{SqlType, SqlValue};

/// Column metadata of a prepared statement; columns without a declared type
/// (expressions, aggregates) report `Other`.
#[must_use]
pub fn statement_columns(stmt: &Statement<'_>) -> Vec<ColumnInfo> {
    stmt.columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let sql_type = column.decl_type().map_or(SqlType::Other, SqlType::from_declared);
            ColumnInfo::new(idx, column.name(), sql_type)
        })
        .collect()
}

/// One cursor row of a `SQLite` query.
pub struct SqliteRow<'a, 'stmt> {
    row: &'a rusqlite::Row<'stmt>,
    columns: &'a [ColumnInfo],
}

impl<'a, 'stmt> SqliteRow<'a, 'stmt> {
    pub(crate) fn new(row: &'a rusqlite::Row<'stmt>, columns: &'a [ColumnInfo]) -> Self {
        Self { row, columns }
    }

    fn raw(&self, column: &ColumnInfo) -> Result<ValueRef<'_>, SqlDaoError> {
        Ok(self.row.get_ref(column.index)?)
    }
}

impl ResultRow for SqliteRow<'_, '_> {
    fn columns(&self) -> Result<Vec<ColumnInfo>, SqlDaoError> {
        Ok(self.columns.to_vec())
    }

    fn value(&self, column: &ColumnInfo) -> Result<SqlValue, SqlDaoError> {
        extract_value(self.raw(column)?, column.sql_type)
    }

    fn open_lob(&self, column: &ColumnInfo) -> Result<Option<Box<dyn Read + '_>>, SqlDaoError> {
        match self.raw(column)? {
            ValueRef::Null => Ok(None),
            ValueRef::Blob(bytes) | ValueRef::Text(bytes) => Ok(Some(Box::new(bytes))),
            ValueRef::Integer(_) | ValueRef::Real(_) => Err(SqlDaoError::conversion(format!(
                "column {} does not hold a large object",
                column.name
            ))),
        }
    }

    /// Type affinity lets BLOB and CLOB columns store numbers; those are
    /// read as plain values instead of streamed.
    fn read(&self, column: &ColumnInfo) -> Result<SqlValue, SqlDaoError> {
        match self.raw(column)? {
            raw @ (ValueRef::Integer(_) | ValueRef::Real(_)) => extract_value(raw, column.sql_type),
            _ => read_streamed(self, column),
        }
    }
}

/// Extract a value by storage class, refined by the declared column type.
///
/// `SQLite` stores dates and exact numbers as text; those are parsed when the
/// declared type asks for them and left as text when they do not parse.
/// REAL values in a DECIMAL column stay floats.
///
/// # Errors
/// Returns `SqlDaoError::ConversionError` for text that is not UTF-8.
pub fn extract_value(raw: ValueRef<'_>, declared: SqlType) -> Result<SqlValue, SqlDaoError> {
    Ok(match raw {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(i) => match declared {
            SqlType::Boolean => SqlValue::Bool(i != 0),
            _ => SqlValue::Int(i),
        },
        ValueRef::Real(f) => SqlValue::Float(f),
        ValueRef::Blob(bytes) => SqlValue::Blob(bytes.to_vec()),
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| SqlDaoError::conversion(format!("text column is not UTF-8: {e}")))?;
            parse_declared_text(text, declared)
                .unwrap_or_else(|| SqlValue::Text(text.to_string()))
        }
    })
}

fn parse_declared_text(text: &str, declared: SqlType) -> Option<SqlValue> {
    match declared {
        SqlType::Decimal | SqlType::Numeric => BigDecimal::from_str(text).ok().map(SqlValue::Decimal),
        SqlType::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .map(SqlValue::Date),
        SqlType::Time => NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
            .ok()
            .map(SqlValue::Time),
        SqlType::Timestamp => ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
            .map(SqlValue::Timestamp),
        _ => None,
    }
}
