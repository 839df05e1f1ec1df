//! Builders for `IN ( ... )` lists and `LIKE` patterns.
//!
//! The WHERE-IN builders return placeholder text for the list and append one
//! bound value per item to the parameters, so the caller only splices the
//! returned text into `IN ( ... )`. An empty item list yields an empty string
//! and binds nothing.

use std::fmt::Display;

use bigdecimal::BigDecimal;
use bigdecimal::num_bigint::BigInt;

use crate::error::SqlDaoError;
use crate::params::{IndexedParams, NamedParams, Parameter};
use crate::types::SqlValue;

/// Prefix used for named WHERE-IN bindings: `P_IN_PARAM_1`, `P_IN_PARAM_2`, ...
pub const WHERE_IN_PREFIX: &str = "IN";

/// Build an IN list for whichever parameter variant the query uses.
///
/// Positional parameters get `?, ?, ?`; named parameters get
/// `:P_IN_PARAM_1, :P_IN_PARAM_2, ...`.
///
/// ```rust
/// use sql_paging_dao::prelude::*;
///
/// let mut params = Parameter::named();
/// let list = create_where_in([5, 7, 9], &mut params).unwrap();
/// assert_eq!(list, ":P_IN_PARAM_1, :P_IN_PARAM_2, :P_IN_PARAM_3");
/// assert_eq!(params.len(), 3);
/// ```
///
/// # Errors
/// Currently infallible; the `Result` keeps the signature stable for
/// parameter variants that cannot take list bindings.
pub fn create_where_in<I>(items: I, params: &mut Parameter) -> Result<String, SqlDaoError>
where
    I: IntoIterator,
    I::Item: Into<SqlValue>,
{
    match params {
        Parameter::Indexed(p) => Ok(create_where_in_indexed(items, p)),
        Parameter::Named(p) => Ok(create_where_in_with_prefix(items, p, WHERE_IN_PREFIX)),
    }
}

/// `?, ?, ?` with one positional binding per item.
pub fn create_where_in_indexed<I>(items: I, params: &mut IndexedParams) -> String
where
    I: IntoIterator,
    I::Item: Into<SqlValue>,
{
    let mut sql = String::new();
    for item in items {
        if !sql.is_empty() {
            sql.push_str(", ");
        }
        sql.push('?');
        params.add(item);
    }
    sql
}

/// `:P_<prefix>_PARAM_1, ...` with one named binding per item.
///
/// An empty prefix becomes `X`, so separate lists in one query stay distinct
/// only when the caller gives them distinct prefixes.
pub fn create_where_in_with_prefix<I>(items: I, params: &mut NamedParams, prefix: &str) -> String
where
    I: IntoIterator,
    I::Item: Into<SqlValue>,
{
    let prefix = if prefix.trim().is_empty() { "X" } else { prefix };
    let mut sql = String::new();
    for (idx, item) in items.into_iter().enumerate() {
        let name = format!("P_{prefix}_PARAM_{}", idx + 1);
        if idx > 0 {
            sql.push_str(", ");
        }
        sql.push(':');
        sql.push_str(&name);
        params.add(name, item);
    }
    sql
}

/// Numeric types whose `Display` output is safe to inline into SQL text.
pub trait InlineNumber: Display {}

macro_rules! impl_inline_number {
    ($($ty:ty),* $(,)?) => {
        $(impl InlineNumber for $ty {})*
    };
}

impl_inline_number!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, BigDecimal, BigInt);

/// Inline a list of numbers as `1,2,3`, skipping missing entries.
pub fn create_number_where_in<N, I>(items: I) -> String
where
    N: InlineNumber,
    I: IntoIterator<Item = Option<N>>,
{
    items
        .into_iter()
        .flatten()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// `computer` becomes `%computer%`.
#[must_use]
pub fn sql_like_contain(value: &str) -> String {
    format!("%{value}%")
}

/// `computer` becomes `%computer`: matches values that end with it.
#[must_use]
pub fn sql_like_start(value: &str) -> String {
    format!("%{value}")
}

/// `computer` becomes `computer%`: matches values that start with it.
#[must_use]
pub fn sql_like_end(value: &str) -> String {
    format!("{value}%")
}
