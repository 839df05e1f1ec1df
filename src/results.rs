use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use crate::error::SqlDaoError;
use crate::mapper::{ColumnInfo, ResultRow};
use crate::types::{SqlType, SqlValue};

/// A materialized row: column metadata shared across the result plus this
/// row's values.
///
/// Useful where a cursor row has to outlive the cursor, and as an in-memory
/// [`ResultRow`] for mapping values that did not come from a database.
#[derive(Debug, Clone)]
pub struct ValueRow {
    /// The columns for this row (shared across all rows in a result set)
    pub columns: Arc<Vec<ColumnInfo>>,
    /// The values for this row
    pub values: Vec<SqlValue>,
    // Upper-cased name -> index, shared like the columns
    index_by_key: Arc<HashMap<String, usize>>,
}

impl ValueRow {
    /// Build a row from column metadata and values in the same order.
    #[must_use]
    pub fn new(columns: Arc<Vec<ColumnInfo>>, values: Vec<SqlValue>) -> Self {
        let index_by_key = Arc::new(index_columns(&columns));
        Self {
            columns,
            values,
            index_by_key,
        }
    }

    /// Build a row from `(name, declared type, value)` triples.
    #[must_use]
    pub fn from_triples<N: Into<String>>(
        triples: impl IntoIterator<Item = (N, SqlType, SqlValue)>,
    ) -> Self {
        let (columns, values): (Vec<_>, Vec<_>) = triples
            .into_iter()
            .enumerate()
            .map(|(i, (name, ty, value))| (ColumnInfo::new(i, name, ty), value))
            .unzip();
        Self::new(Arc::new(columns), values)
    }

    /// Get a value by column name, ignoring case.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&SqlValue> {
        self.index_by_key
            .get(&column_name.to_uppercase())
            .and_then(|&idx| self.values.get(idx))
    }

    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Copy the current cursor row.
    ///
    /// # Errors
    /// Returns `SqlDaoError` if any column cannot be read.
    pub fn capture(row: &dyn ResultRow, columns: &Arc<Vec<ColumnInfo>>) -> Result<Self, SqlDaoError> {
        let values = columns
            .iter()
            .map(|column| crate::mapper::read_column(row, column))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(Arc::clone(columns), values))
    }
}

fn index_columns(columns: &[ColumnInfo]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(columns.len());
    for column in columns {
        // First occurrence wins for duplicate names
        index.entry(column.key().to_string()).or_insert(column.index);
    }
    index
}

impl ResultRow for ValueRow {
    fn columns(&self) -> Result<Vec<ColumnInfo>, SqlDaoError> {
        Ok(self.columns.as_ref().clone())
    }

    fn value(&self, column: &ColumnInfo) -> Result<SqlValue, SqlDaoError> {
        self.values.get(column.index).cloned().ok_or_else(|| {
            SqlDaoError::ExecutionError(format!("column {} is out of range", column.index))
        })
    }

    fn open_lob(&self, column: &ColumnInfo) -> Result<Option<Box<dyn Read + '_>>, SqlDaoError> {
        match self.values.get(column.index) {
            None | Some(SqlValue::Null) => Ok(None),
            Some(SqlValue::Blob(bytes)) => Ok(Some(Box::new(bytes.as_slice()))),
            Some(SqlValue::Text(text)) => Ok(Some(Box::new(text.as_bytes()))),
            Some(other) => Err(SqlDaoError::ConversionError(format!(
                "{other:?} is not a large object"
            ))),
        }
    }
}
