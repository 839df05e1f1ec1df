use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::criteria::{Criteria, PageWindow};
use crate::error::SqlDaoError;
use crate::params::Parameter;

/// Bind name for the zero-based first row of the window.
pub const P_ROW_START: &str = "P_ROW_START";
/// Bind name for the page size.
pub const P_ROW_TOTAL: &str = "P_ROW_TOTAL";
/// Bind name for the one-based last row of a two-sided ROWNUM window.
pub const P_ROW_END: &str = "P_ROW_END";
/// Bind name for the one-based last row of an upper-bound-only ROWNUM window.
pub const P_ROW_NUM: &str = "P_ROW_NUM";

/// Extension point for dialects: append the row-window clause to an already
/// wrapped and ordered query, and the values it binds to `params`.
///
/// Called once per paginated query, only when `criteria` has both page and
/// size.
pub trait PagingDialect {
    /// # Errors
    /// Implementations return `SqlDaoError` if the window cannot be expressed.
    fn set_paging_option(
        &self,
        sql: &mut String,
        params: &mut Parameter,
        criteria: &Criteria,
    ) -> Result<(), SqlDaoError>;
}

/// Built-in row-window dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    /// `OFFSET n ROWS FETCH NEXT m ROWS ONLY` (SQL Server 2012+, Oracle 12c+, DB2)
    OffsetFetch,
    /// `LIMIT m OFFSET n` (MySQL, MariaDB, SQLite, PostgreSQL)
    LimitOffset,
    /// `ROWNUM` window bounded on both edges (Oracle before 12c)
    Rownum,
    /// `ROWNUM` window bounded only by the last row of the page.
    ///
    /// Returns every row from the start of the result up to the end of the
    /// requested page. Kept for callers that add their own lower bound.
    RownumUpperBound,
}

impl Dialect {
    /// Pick a dialect from a database product name as reported by the driver.
    #[must_use]
    pub fn from_product_name(product: &str) -> Option<Dialect> {
        let product = product.to_ascii_lowercase();
        if product.contains("oracle") {
            Some(Dialect::Rownum)
        } else if product.contains("microsoft")
            || product.contains("sql server")
            || product.contains("db2")
        {
            Some(Dialect::OffsetFetch)
        } else if product.contains("mysql")
            || product.contains("mariadb")
            || product.contains("sqlite")
            || product.contains("postgres")
        {
            Some(Dialect::LimitOffset)
        } else {
            None
        }
    }
}

impl PagingDialect for Dialect {
    fn set_paging_option(
        &self,
        sql: &mut String,
        params: &mut Parameter,
        criteria: &Criteria,
    ) -> Result<(), SqlDaoError> {
        let Some(window) = criteria.window() else {
            return Ok(());
        };
        match self {
            Dialect::OffsetFetch => offset_fetch(sql, params, window),
            Dialect::LimitOffset => limit_offset(sql, params, window),
            Dialect::Rownum => rownum(sql, params, window),
            Dialect::RownumUpperBound => rownum_upper_bound(sql, params, window),
        }
    }
}

fn offset_fetch(
    sql: &mut String,
    params: &mut Parameter,
    window: PageWindow,
) -> Result<(), SqlDaoError> {
    match params {
        Parameter::Named(named) => {
            sql.push_str(" OFFSET :P_ROW_START ROWS FETCH NEXT :P_ROW_TOTAL ROWS ONLY");
            named
                .add(P_ROW_START, window.row_start)
                .add(P_ROW_TOTAL, window.size);
        }
        Parameter::Indexed(indexed) => {
            sql.push_str(" OFFSET ? ROWS FETCH NEXT ? ROWS ONLY");
            indexed.add(window.row_start).add(window.size);
        }
    }
    Ok(())
}

fn limit_offset(
    sql: &mut String,
    params: &mut Parameter,
    window: PageWindow,
) -> Result<(), SqlDaoError> {
    match params {
        Parameter::Named(named) => {
            sql.push_str(" LIMIT :P_ROW_TOTAL OFFSET :P_ROW_START");
            named
                .add(P_ROW_TOTAL, window.size)
                .add(P_ROW_START, window.row_start);
        }
        Parameter::Indexed(indexed) => {
            sql.push_str(" LIMIT ? OFFSET ?");
            indexed.add(window.size).add(window.row_start);
        }
    }
    Ok(())
}

fn wrap_rownum(sql: &mut String) {
    *sql = format!("SELECT T.* FROM (SELECT ROWNUM AS RN, T.* FROM ( {sql} ) T) T");
}

fn rownum(sql: &mut String, params: &mut Parameter, window: PageWindow) -> Result<(), SqlDaoError> {
    wrap_rownum(sql);
    match params {
        Parameter::Named(named) => {
            sql.push_str(" WHERE T.RN > :P_ROW_START AND T.RN <= :P_ROW_END");
            named
                .add(P_ROW_START, window.row_start)
                .add(P_ROW_END, window.oracle_row_end());
        }
        Parameter::Indexed(indexed) => {
            sql.push_str(" WHERE T.RN > ? AND T.RN <= ?");
            indexed.add(window.row_start).add(window.oracle_row_end());
        }
    }
    Ok(())
}

fn rownum_upper_bound(
    sql: &mut String,
    params: &mut Parameter,
    window: PageWindow,
) -> Result<(), SqlDaoError> {
    wrap_rownum(sql);
    match params {
        Parameter::Named(named) => {
            sql.push_str(" WHERE T.RN <= :P_ROW_NUM");
            named.add(P_ROW_NUM, window.oracle_row_end());
        }
        Parameter::Indexed(indexed) => {
            sql.push_str(" WHERE T.RN <= ?");
            indexed.add(window.oracle_row_end());
        }
    }
    Ok(())
}
