//! Textual SQL rewriting for paginated queries.
//!
//! A SELECT body is wrapped in a subquery, given a deterministic ORDER BY,
//! then handed to a [`PagingDialect`] that appends its row-window clause and
//! the matching bind values. No parsing happens here: the body must be a
//! single valid SELECT without a trailing semicolon.

mod dialect;
mod identifiers;

use crate::criteria::Criteria;
use crate::error::SqlDaoError;
use crate::params::Parameter;

pub use dialect::{
    Dialect, P_ROW_END, P_ROW_NUM, P_ROW_START, P_ROW_TOTAL, PagingDialect,
};
pub use identifiers::{validate_order_by, validate_sort_column};

/// Alias of the subquery wrapping the caller's SELECT body.
pub const BODY_ALIAS: &str = "TB";

/// `SELECT * FROM ( <body> ) TB`
#[must_use]
pub fn wrap_select(body: &str) -> String {
    let mut sql = String::with_capacity(body.len() + 32);
    sql.push_str("SELECT * FROM ( ");
    sql.push_str(body);
    sql.push_str(" ) ");
    sql.push_str(BODY_ALIAS);
    sql
}

/// `SELECT COUNT(*) AS TOTAL FROM ( <body> ) TB`
#[must_use]
pub fn count_sql(body: &str) -> String {
    format!("SELECT COUNT(*) AS TOTAL FROM ( {body} ) {BODY_ALIAS}")
}

/// Append the ORDER BY clause for `criteria`.
///
/// Sort directives win over the fallback column; with neither, `ORDER BY 1`
/// keeps the row window deterministic across calls.
///
/// # Errors
/// Returns `SqlDaoError::InvalidIdentifier` if a sort column or the fallback
/// ORDER BY text is not a plain column list.
pub fn append_order_by(sql: &mut String, criteria: &Criteria) -> Result<(), SqlDaoError> {
    if !criteria.is_empty_sort() {
        for (i, (column, direction)) in criteria.sorts.iter().enumerate() {
            validate_sort_column(column)?;
            sql.push_str(if i == 0 { " ORDER BY " } else { ", " });
            sql.push_str(column);
            sql.push(' ');
            sql.push_str(&direction.to_string());
        }
        return Ok(());
    }

    match criteria.order_by_column.as_deref().map(str::trim) {
        Some(column) if !column.is_empty() => {
            validate_order_by(column)?;
            sql.push_str(" ORDER BY ");
            sql.push_str(column);
        }
        _ => sql.push_str(" ORDER BY 1"),
    }
    Ok(())
}

/// Rewrite `body` into an ordered, windowed query and append the window's bind
/// values to `params`.
///
/// When `criteria` carries no page/size the result is ordered but unwindowed
/// and `params` is left untouched.
///
/// # Errors
/// Returns `SqlDaoError::InvalidIdentifier` for unsafe ORDER BY text, or any
/// error raised by the dialect.
pub fn build_paged_sql<D: PagingDialect + ?Sized>(
    body: &str,
    params: &mut Parameter,
    criteria: &Criteria,
    dialect: &D,
) -> Result<String, SqlDaoError> {
    let mut sql = wrap_select(body);
    append_order_by(&mut sql, criteria)?;
    if criteria.is_paged() {
        dialect.set_paging_option(&mut sql, params, criteria)?;
    }
    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::SortDirection;
    use crate::params::NamedParams;
    use crate::types::SqlValue;

    const BODY: &str = "SELECT ID, NAME FROM PERSON WHERE AGE > ?";

    fn indexed_with_age() -> Parameter {
        let mut params = Parameter::indexed();
        params.as_indexed_mut().unwrap().add(18);
        params
    }

    #[test]
    fn default_order_is_first_column() {
        let mut params = indexed_with_age();
        let sql =
            build_paged_sql(BODY, &mut params, &Criteria::new(), &Dialect::OffsetFetch).unwrap();
        assert_eq!(sql, format!("SELECT * FROM ( {BODY} ) TB ORDER BY 1"));
        assert_eq!(params.len(), 1);

        let mut params = indexed_with_age();
        let sql = build_paged_sql(
            BODY,
            &mut params,
            &Criteria::paged(3, 10).with_order_by("   "),
            &Dialect::OffsetFetch,
        )
        .unwrap();
        assert!(sql.contains("ORDER BY 1 OFFSET"));
    }

    #[test]
    fn sorts_override_order_by_column() {
        let criteria = Criteria::new()
            .with_order_by("ID")
            .with_sort("NAME", SortDirection::Desc)
            .with_sort("ID", SortDirection::Asc);
        let mut sql = wrap_select(BODY);
        append_order_by(&mut sql, &criteria).unwrap();
        assert!(sql.ends_with(" TB ORDER BY NAME DESC, ID ASC"));

        let mut sql = wrap_select(BODY);
        append_order_by(&mut sql, &Criteria::new().with_order_by("NAME DESC, ID")).unwrap();
        assert!(sql.ends_with(" TB ORDER BY NAME DESC, ID"));
    }

    #[test]
    fn rejects_injected_order_by() {
        let mut sql = wrap_select(BODY);
        let criteria = Criteria::new().with_order_by("1; DROP TABLE PERSON");
        assert!(matches!(
            append_order_by(&mut sql, &criteria),
            Err(SqlDaoError::InvalidIdentifier(_))
        ));

        let criteria = Criteria::new().with_sort("NAME --", SortDirection::Asc);
        assert!(append_order_by(&mut wrap_select(BODY), &criteria).is_err());
    }

    #[test]
    fn offset_fetch_binds_row_start_then_size() {
        for (page, size) in [(1_i64, 10_i64), (2, 20), (7, 3)] {
            let mut params = indexed_with_age();
            let sql = build_paged_sql(
                BODY,
                &mut params,
                &Criteria::paged(page, size),
                &Dialect::OffsetFetch,
            )
            .unwrap();
            assert!(sql.ends_with(" ORDER BY 1 OFFSET ? ROWS FETCH NEXT ? ROWS ONLY"));
            assert_eq!(
                params.to_positional_array().unwrap(),
                vec![
                    SqlValue::Int(18),
                    SqlValue::Int((page - 1) * size),
                    SqlValue::Int(size)
                ]
            );
        }
    }

    #[test]
    fn offset_fetch_uses_synthetic_names_for_named_params() {
        let mut named = NamedParams::new();
        named.add("AGE", 18);
        let mut params = Parameter::from(named);
        let sql = build_paged_sql(
            "SELECT ID FROM PERSON WHERE AGE > :AGE",
            &mut params,
            &Criteria::paged(2, 20),
            &Dialect::OffsetFetch,
        )
        .unwrap();
        assert!(sql.ends_with("OFFSET :P_ROW_START ROWS FETCH NEXT :P_ROW_TOTAL ROWS ONLY"));

        let map = params.to_named_map().unwrap();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["AGE", P_ROW_START, P_ROW_TOTAL]);
        assert_eq!(map[P_ROW_START], SqlValue::Int(20));
        assert_eq!(map[P_ROW_TOTAL], SqlValue::Int(20));
    }

    #[test]
    fn zero_size_is_an_empty_window_not_an_error() {
        let mut params = Parameter::indexed();
        let sql =
            build_paged_sql(BODY, &mut params, &Criteria::paged(3, 0), &Dialect::OffsetFetch)
                .unwrap();
        assert!(sql.contains("FETCH NEXT ? ROWS ONLY"));
        assert_eq!(
            params.to_positional_array().unwrap(),
            vec![SqlValue::Int(0), SqlValue::Int(0)]
        );
    }

    #[test]
    fn negative_page_is_clamped() {
        let mut params = Parameter::indexed();
        build_paged_sql(BODY, &mut params, &Criteria::paged(-4, 10), &Dialect::OffsetFetch)
            .unwrap();
        assert_eq!(
            params.to_positional_array().unwrap(),
            vec![SqlValue::Int(0), SqlValue::Int(10)]
        );
    }

    #[test]
    fn limit_offset_binds_size_then_row_start() {
        let mut params = Parameter::indexed();
        let sql =
            build_paged_sql(BODY, &mut params, &Criteria::paged(3, 15), &Dialect::LimitOffset)
                .unwrap();
        assert!(sql.ends_with(" ORDER BY 1 LIMIT ? OFFSET ?"));
        assert_eq!(
            params.to_positional_array().unwrap(),
            vec![SqlValue::Int(15), SqlValue::Int(30)]
        );
    }

    #[test]
    fn rownum_bounds_both_edges_of_the_page() {
        let mut params = Parameter::indexed();
        let sql =
            build_paged_sql(BODY, &mut params, &Criteria::paged(3, 10), &Dialect::Rownum).unwrap();
        let wrapped = format!("SELECT * FROM ( {BODY} ) TB ORDER BY 1");
        assert_eq!(
            sql,
            format!(
                "SELECT T.* FROM (SELECT ROWNUM AS RN, T.* FROM ( {wrapped} ) T) T \
                 WHERE T.RN > ? AND T.RN <= ?"
            )
        );
        assert_eq!(
            params.to_positional_array().unwrap(),
            vec![SqlValue::Int(20), SqlValue::Int(30)]
        );
    }

    #[test]
    fn legacy_rownum_only_bounds_the_upper_edge() {
        // The one-sided window returns every row up to the end of the page:
        // page 3 of size 10 yields rows 1..=30, not 21..=30.
        let mut named = Parameter::named();
        let sql = build_paged_sql(
            BODY,
            &mut named,
            &Criteria::paged(3, 10),
            &Dialect::RownumUpperBound,
        )
        .unwrap();
        assert!(sql.ends_with(" WHERE T.RN <= :P_ROW_NUM"));
        assert!(!sql.contains("T.RN >"));
        let map = named.to_named_map().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map[P_ROW_NUM], SqlValue::Int(30));
    }

    #[test]
    fn count_query_wraps_original_body() {
        assert_eq!(
            count_sql(BODY),
            format!("SELECT COUNT(*) AS TOTAL FROM ( {BODY} ) TB")
        );
    }
}
