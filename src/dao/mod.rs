//! The query/execute façade.
//!
//! [`Dao`] ties an executor to a paging dialect and runs every statement
//! through the same path: log, execute, map rows. Paginated queries go
//! through [`build_paged_sql`](crate::pagination::build_paged_sql) first.

mod builder;

use std::sync::Arc;

use bigdecimal::BigDecimal;
use tracing::{debug, warn};

pub use builder::DaoBuilder;

use crate::config::DaoOptions;
use crate::conversion::{FromSqlValue, convert_value};
use crate::criteria::Criteria;
use crate::error::SqlDaoError;
use crate::executor::SqlExecutor;
use crate::mapper::{ColumnInfo, Record, ResultRow, RowMapper, read_column};
use crate::pagination::{Dialect, PagingDialect, build_paged_sql, count_sql};
use crate::paging::Paging;
use crate::params::{IndexedParams, Parameter};
use crate::results::ValueRow;
use crate::types::SqlValue;

/// Data access object over an executor `E` and a paging dialect `P`.
#[derive(Debug, Clone)]
pub struct Dao<E, P = Dialect> {
    executor: E,
    dialect: P,
    options: DaoOptions,
}

impl<E> Dao<E, Dialect> {
    #[must_use]
    pub fn builder() -> DaoBuilder<E, Dialect> {
        DaoBuilder::new()
    }
}

impl<E: SqlExecutor, P: PagingDialect> Dao<E, P> {
    #[must_use]
    pub fn new(executor: E, dialect: P) -> Self {
        Self::with_options(executor, dialect, DaoOptions::default())
    }

    #[must_use]
    pub fn with_options(executor: E, dialect: P, options: DaoOptions) -> Self {
        Self {
            executor,
            dialect,
            options,
        }
    }

    #[must_use]
    pub fn executor(&self) -> &E {
        &self.executor
    }

    #[must_use]
    pub fn dialect(&self) -> &P {
        &self.dialect
    }

    #[must_use]
    pub fn options(&self) -> &DaoOptions {
        &self.options
    }

    /// The built-in dialect matching the executor's database product.
    ///
    /// # Errors
    /// Returns `SqlDaoError::ConfigError` if the product is not recognized.
    pub fn detect_dialect(&self) -> Result<Dialect, SqlDaoError> {
        detect_dialect(&self.executor)
    }

    /// Map every row onto `T`.
    ///
    /// # Errors
    /// Returns `SqlDaoError` if execution or mapping fails.
    pub fn query_to_list<T: Record>(
        &self,
        sql: &str,
        params: &Parameter,
    ) -> Result<Vec<T>, SqlDaoError> {
        self.log_statement(sql, params, std::any::type_name::<T>());
        let mut mapper = RowMapper::<T>::new(self.options.date_formats.clone());
        let mut items = Vec::new();
        self.run_query(sql, params, &mut |row| {
            items.push(mapper.map_row(row)?);
            Ok(())
        })?;
        Ok(items)
    }

    /// Map the only row onto `T`; `None` when there are no rows.
    ///
    /// # Errors
    /// Returns `SqlDaoError::IncorrectResultSize` if more than one row comes
    /// back, or any execution or mapping error.
    pub fn query_to_bean<T: Record>(
        &self,
        sql: &str,
        params: &Parameter,
    ) -> Result<Option<T>, SqlDaoError> {
        self.log_statement(sql, params, std::any::type_name::<T>());
        let mut mapper = RowMapper::<T>::new(self.options.date_formats.clone());
        let mut first = None;
        let mut rows = 0usize;
        self.run_query(sql, params, &mut |row| {
            rows += 1;
            if rows == 1 {
                first = Some(mapper.map_row(row)?);
            }
            Ok(())
        })?;
        if rows > 1 {
            return Err(SqlDaoError::IncorrectResultSize {
                expected: 1,
                actual: rows,
            });
        }
        Ok(first)
    }

    /// Read a single-column, single-row result as `V`.
    ///
    /// `None` when there are no rows or the value is NULL.
    ///
    /// # Errors
    /// Returns `SqlDaoError::IncorrectColumnCount` unless exactly one column
    /// comes back, `SqlDaoError::IncorrectResultSize` for more than one row,
    /// or a conversion error.
    pub fn query_to_object<V: FromSqlValue>(
        &self,
        sql: &str,
        params: &Parameter,
    ) -> Result<Option<V>, SqlDaoError> {
        self.log_statement(sql, params, std::any::type_name::<V>());
        let formats = &self.options.date_formats;
        let mut value = None;
        let mut rows = 0usize;
        self.run_query(sql, params, &mut |row| {
            rows += 1;
            if rows > 1 {
                return Ok(());
            }
            let column = single_column(row)?;
            let raw = read_column(row, &column)?;
            if !raw.is_null() {
                value = Some(convert_value::<V>(raw, formats)?);
            }
            Ok(())
        })?;
        if rows > 1 {
            return Err(SqlDaoError::IncorrectResultSize {
                expected: 1,
                actual: rows,
            });
        }
        Ok(value)
    }

    /// [`query_to_object`](Self::query_to_object) for numeric results.
    ///
    /// # Errors
    /// As for `query_to_object`.
    pub fn query_to_number(
        &self,
        sql: &str,
        params: &Parameter,
    ) -> Result<Option<BigDecimal>, SqlDaoError> {
        self.query_to_object::<BigDecimal>(sql, params)
    }

    /// Run a query and turn each row into an `R` with `extract`, which also
    /// receives the zero-based row number.
    ///
    /// # Errors
    /// Returns `SqlDaoError` if execution fails or `extract` fails.
    pub fn query_rows<R, F>(
        &self,
        sql: &str,
        params: &Parameter,
        mut extract: F,
    ) -> Result<Vec<R>, SqlDaoError>
    where
        F: FnMut(&dyn ResultRow, usize) -> Result<R, SqlDaoError>,
    {
        self.log_statement(sql, params, std::any::type_name::<R>());
        let mut items = Vec::new();
        self.run_query(sql, params, &mut |row| {
            let item = extract(row, items.len())?;
            items.push(item);
            Ok(())
        })?;
        Ok(items)
    }

    /// Copy every row into a [`ValueRow`].
    ///
    /// # Errors
    /// Returns `SqlDaoError` if execution fails or a column cannot be read.
    pub fn query_to_rows(&self, sql: &str, params: &Parameter) -> Result<Vec<ValueRow>, SqlDaoError> {
        self.log_statement(sql, params, "ValueRow");
        let mut columns: Option<Arc<Vec<ColumnInfo>>> = None;
        let mut rows = Vec::new();
        self.run_query(sql, params, &mut |row| {
            if columns.is_none() {
                columns = Some(Arc::new(row.columns()?));
            }
            if let Some(columns) = columns.as_ref() {
                rows.push(ValueRow::capture(row, columns)?);
            }
            Ok(())
        })?;
        Ok(rows)
    }

    /// Number of rows `sql` returns, counted by the database.
    ///
    /// # Errors
    /// Returns `SqlDaoError` if the count query fails.
    pub fn count_for_paging(&self, sql: &str, params: &Parameter) -> Result<i64, SqlDaoError> {
        Ok(self
            .query_to_object::<i64>(&count_sql(sql), params)?
            .unwrap_or(0))
    }

    /// One page of `sql` mapped onto `T`, without a count query.
    ///
    /// `params` receives the window bindings.
    ///
    /// # Errors
    /// Returns `SqlDaoError` if the ORDER BY is unsafe, or execution or
    /// mapping fails.
    pub fn query_to_paging<T: Record>(
        &self,
        sql: &str,
        params: &mut Parameter,
        criteria: &Criteria,
    ) -> Result<Vec<T>, SqlDaoError> {
        let paged_sql = build_paged_sql(sql, params, criteria, &self.dialect)?;
        self.query_to_list(&paged_sql, params)
    }

    /// Count, then fetch one page of `sql` mapped onto `T`.
    ///
    /// The count runs with `params` as given; `params` then receives the
    /// window bindings. When the count is zero the page query is skipped.
    ///
    /// ```rust,ignore
    /// let mut params = Parameter::indexed();
    /// params.as_indexed_mut()?.add("SALES");
    /// let page: Paging<Employee> = dao.query_with_paging(
    ///     "SELECT ID, NAME FROM EMPLOYEE WHERE DEPT = ?",
    ///     &mut params,
    ///     &Criteria::paged(2, 20).with_order_by("ID"),
    /// )?;
    /// ```
    ///
    /// # Errors
    /// Returns `SqlDaoError` if either query fails or mapping fails.
    pub fn query_with_paging<T: Record>(
        &self,
        sql: &str,
        params: &mut Parameter,
        criteria: &Criteria,
    ) -> Result<Paging<T>, SqlDaoError> {
        let total = self.count_for_paging(sql, params)?;
        if total <= 0 {
            return Ok(Paging::empty(criteria.clone()));
        }
        let items = self.query_to_paging(sql, params, criteria)?;
        Ok(Paging::new(items, total, criteria.clone()))
    }

    /// Run a modifying statement and return the affected row count.
    ///
    /// # Errors
    /// Returns `SqlDaoError` if the statement fails.
    pub fn execute(&self, sql: &str, params: &Parameter) -> Result<usize, SqlDaoError> {
        self.log_statement(sql, params, "update count");
        self.executor.update(sql, params).inspect_err(|e| {
            warn!(sql, error = %e, "statement failed");
        })
    }

    /// [`execute`](Self::execute) with positional values.
    ///
    /// # Errors
    /// Returns `SqlDaoError` if the statement fails.
    pub fn execute_values<I>(&self, sql: &str, values: I) -> Result<usize, SqlDaoError>
    where
        I: IntoIterator,
        I::Item: Into<SqlValue>,
    {
        let params = Parameter::Indexed(values.into_iter().collect::<IndexedParams>());
        self.execute(sql, &params)
    }

    fn run_query(
        &self,
        sql: &str,
        params: &Parameter,
        on_row: &mut dyn FnMut(&dyn ResultRow) -> Result<(), SqlDaoError>,
    ) -> Result<(), SqlDaoError> {
        self.executor.query(sql, params, on_row).inspect_err(|e| {
            warn!(sql, error = %e, "query failed");
        })
    }

    fn log_statement(&self, sql: &str, params: &Parameter, target: &str) {
        if self.options.log_statements {
            debug!(sql, params = %params, target, "executing statement");
        }
    }
}

fn single_column(row: &dyn ResultRow) -> Result<ColumnInfo, SqlDaoError> {
    let mut columns = row.columns()?;
    if columns.len() != 1 {
        return Err(SqlDaoError::IncorrectColumnCount {
            expected: 1,
            actual: columns.len(),
        });
    }
    columns
        .pop()
        .ok_or_else(|| SqlDaoError::Other("column list emptied".into()))
}

pub(crate) fn detect_dialect<E: SqlExecutor + ?Sized>(executor: &E) -> Result<Dialect, SqlDaoError> {
    let product = executor.database_product()?;
    Dialect::from_product_name(&product).ok_or_else(|| {
        SqlDaoError::ConfigError(format!("no paging dialect for database product '{product}'"))
    })
}
