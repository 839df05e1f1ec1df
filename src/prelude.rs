//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::config::{DaoOptions, DateFormats};
pub use crate::conversion::{FromSqlValue, convert_value};
pub use crate::criteria::{Criteria, PageWindow, SortDirection};
pub use crate::dao::{Dao, DaoBuilder};
pub use crate::error::SqlDaoError;
pub use crate::executor::{RowHandler, SqlExecutor};
pub use crate::helpers::{
    create_number_where_in, create_where_in, create_where_in_indexed, create_where_in_with_prefix,
    sql_like_contain, sql_like_end, sql_like_start,
};
pub use crate::mapper::{ColumnInfo, FieldSetter, FieldTable, Record, ResultRow, RowMapper};
pub use crate::pagination::{
    Dialect, P_ROW_END, P_ROW_NUM, P_ROW_START, P_ROW_TOTAL, PagingDialect, build_paged_sql,
    count_sql,
};
pub use crate::paging::Paging;
pub use crate::params::{IndexedParams, NamedParams, Parameter, ParameterValue};
pub use crate::results::ValueRow;
pub use crate::types::{SqlType, SqlValue, TargetType};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteExecutor, SqliteOptions, SqliteOptionsBuilder};
