use std::rc::Rc;
use std::sync::Arc;

use crate::error::SqlDaoError;
use crate::mapper::ResultRow;
use crate::params::Parameter;

/// Per-row callback handed to [`SqlExecutor::query`].
pub type RowHandler<'a> = dyn FnMut(&dyn ResultRow) -> Result<(), SqlDaoError> + 'a;

/// The statement-execution API the DAO runs on.
///
/// Implementations acquire whatever connection and statement they need for
/// one call and release them before returning, on success and on error.
/// Parameters arrive in the variant the query was built with; a backend that
/// only understands one variant reports `VariantMismatch` for the other.
pub trait SqlExecutor {
    /// Run a query and feed every row of the cursor to `on_row`.
    ///
    /// An error from `on_row` stops the iteration and is returned unchanged.
    ///
    /// # Errors
    /// Returns `SqlDaoError` if the statement fails or a row handler fails.
    fn query(
        &self,
        sql: &str,
        params: &Parameter,
        on_row: &mut RowHandler<'_>,
    ) -> Result<(), SqlDaoError>;

    /// Run an INSERT/UPDATE/DELETE (or DDL) statement.
    ///
    /// # Errors
    /// Returns `SqlDaoError` if the statement fails.
    fn update(&self, sql: &str, params: &Parameter) -> Result<usize, SqlDaoError>;

    /// Database product name, as a driver would report it.
    ///
    /// # Errors
    /// Returns `SqlDaoError` if the product cannot be determined.
    fn database_product(&self) -> Result<String, SqlDaoError>;
}

macro_rules! impl_executor_for_pointer {
    ($($ptr:ident),*) => {
        $(
            impl<E: SqlExecutor + ?Sized> SqlExecutor for $ptr<E> {
                fn query(
                    &self,
                    sql: &str,
                    params: &Parameter,
                    on_row: &mut RowHandler<'_>,
                ) -> Result<(), SqlDaoError> {
                    (**self).query(sql, params, on_row)
                }

                fn update(&self, sql: &str, params: &Parameter) -> Result<usize, SqlDaoError> {
                    (**self).update(sql, params)
                }

                fn database_product(&self) -> Result<String, SqlDaoError> {
                    (**self).database_product()
                }
            }
        )*
    };
}

impl_executor_for_pointer!(Arc, Rc, Box);

impl<E: SqlExecutor + ?Sized> SqlExecutor for &E {
    fn query(
        &self,
        sql: &str,
        params: &Parameter,
        on_row: &mut RowHandler<'_>,
    ) -> Result<(), SqlDaoError> {
        (**self).query(sql, params, on_row)
    }

    fn update(&self, sql: &str, params: &Parameter) -> Result<usize, SqlDaoError> {
        (**self).update(sql, params)
    }

    fn database_product(&self) -> Result<String, SqlDaoError> {
        (**self).database_product()
    }
}
