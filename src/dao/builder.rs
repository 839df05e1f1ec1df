use crate::config::{DaoOptions, DateFormats};
use crate::error::SqlDaoError;
use crate::executor::SqlExecutor;
use crate::pagination::{Dialect, PagingDialect};

use super::Dao;

/// Fluent builder for [`Dao`].
///
/// ```rust,no_run
/// # #[cfg(feature = "sqlite")]
/// # fn demo() -> Result<(), sql_paging_dao::SqlDaoError> {
/// use sql_paging_dao::prelude::*;
///
/// let dao = Dao::builder()
///     .executor(SqliteExecutor::open(SqliteOptions::new("app.db".to_string()))?)
///     .dialect(Dialect::LimitOffset)
///     .build()?;
/// # let _ = dao;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DaoBuilder<E, P = Dialect> {
    executor: Option<E>,
    dialect: Option<P>,
    options: DaoOptions,
}

impl<E, P> Default for DaoBuilder<E, P> {
    fn default() -> Self {
        Self {
            executor: None,
            dialect: None,
            options: DaoOptions::default(),
        }
    }
}

impl<E, P> DaoBuilder<E, P> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn executor(mut self, executor: E) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Use `dialect` for paginated queries; any [`PagingDialect`] works.
    #[must_use]
    pub fn dialect<Q>(self, dialect: Q) -> DaoBuilder<E, Q> {
        DaoBuilder {
            executor: self.executor,
            dialect: Some(dialect),
            options: self.options,
        }
    }

    #[must_use]
    pub fn options(mut self, options: DaoOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn date_formats(mut self, date_formats: DateFormats) -> Self {
        self.options.date_formats = date_formats;
        self
    }

    #[must_use]
    pub fn statement_logging(mut self, log_statements: bool) -> Self {
        self.options.log_statements = log_statements;
        self
    }
}

impl<E: SqlExecutor, P: PagingDialect> DaoBuilder<E, P> {
    /// # Errors
    /// Returns `SqlDaoError::ConfigError` if the executor or dialect is missing.
    pub fn build(self) -> Result<Dao<E, P>, SqlDaoError> {
        let executor = self
            .executor
            .ok_or_else(|| SqlDaoError::ConfigError("executor is required".into()))?;
        let dialect = self
            .dialect
            .ok_or_else(|| SqlDaoError::ConfigError("paging dialect is required".into()))?;
        Ok(Dao::with_options(executor, dialect, self.options))
    }
}

impl<E: SqlExecutor> DaoBuilder<E, Dialect> {
    /// Build, falling back to the dialect matching the executor's database
    /// product when none was set.
    ///
    /// # Errors
    /// Returns `SqlDaoError::ConfigError` if the executor is missing or the
    /// product is not recognized.
    pub fn build_detecting_dialect(self) -> Result<Dao<E, Dialect>, SqlDaoError> {
        let executor = self
            .executor
            .ok_or_else(|| SqlDaoError::ConfigError("executor is required".into()))?;
        let dialect = match self.dialect {
            Some(dialect) => dialect,
            None => super::detect_dialect(&executor)?,
        };
        Ok(Dao::with_options(executor, dialect, self.options))
    }
}
