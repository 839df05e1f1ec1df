//! Parameterized SQL with typed row mapping and dialect-aware pagination.
//!
//! Queries are plain SQL plus a [`Parameter`] set (positional or named).
//! A [`Dao`] runs them through a [`SqlExecutor`], maps rows onto records
//! registered with [`impl_record!`], and for paged queries wraps the SQL with
//! the row-window clause of its [`Dialect`].
//!
//! ```rust,no_run
//! # #[cfg(feature = "sqlite")]
//! # fn demo() -> Result<(), sql_paging_dao::SqlDaoError> {
//! use sql_paging_dao::prelude::*;
//! use sql_paging_dao::impl_record;
//!
//! #[derive(Debug, Default)]
//! struct Employee {
//!     id: i64,
//!     name: String,
//! }
//! impl_record!(Employee { id, name });
//!
//! let dao = Dao::new(SqliteExecutor::in_memory()?, Dialect::LimitOffset);
//! let mut params = Parameter::named();
//! params.as_named_mut()?.add("DEPT", "SALES");
//! let page: Paging<Employee> = dao.query_with_paging(
//!     "SELECT ID, NAME FROM EMPLOYEE WHERE DEPT = :DEPT",
//!     &mut params,
//!     &Criteria::paged(1, 20),
//! )?;
//! # let _ = page;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod conversion;
pub mod criteria;
pub mod dao;
pub mod error;
pub mod executor;
pub mod helpers;
pub mod mapper;
pub mod pagination;
pub mod paging;
pub mod params;
pub mod prelude;
pub mod results;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod types;

pub use config::{DaoOptions, DateFormats};
pub use criteria::{Criteria, SortDirection};
pub use dao::{Dao, DaoBuilder};
pub use error::SqlDaoError;
pub use executor::SqlExecutor;
pub use mapper::{Record, RowMapper};
pub use pagination::{Dialect, PagingDialect};
pub use paging::Paging;
pub use params::{IndexedParams, NamedParams, Parameter, ParameterValue};
pub use types::{SqlType, SqlValue};
