use rusqlite::Statement;
use rusqlite::types::Value;

use crate::error::SqlDaoError;
use crate::params::{Parameter, ParameterValue};
use crate::types::{SqlType, SqlValue};

/// Convert a bound value to a rusqlite `Value`, honoring an explicit wire type.
///
/// # Errors
/// Returns `SqlDaoError::ParameterError` for collections, which `SQLite`
/// cannot bind to a single placeholder, and `ConversionError` if the wire
/// type cannot represent the value.
pub fn to_sqlite_value(param: &ParameterValue) -> Result<Value, SqlDaoError> {
    if param.is_collection() {
        return Err(SqlDaoError::ParameterError(
            "list values must be expanded into an IN list before binding".into(),
        ));
    }
    let value = param.value();
    match param.wire_type() {
        Some(SqlType::Null) => Ok(Value::Null),
        Some(SqlType::Varchar | SqlType::Char | SqlType::Clob) if !value.is_null() => {
            Ok(Value::Text(value.to_string()))
        }
        Some(SqlType::Blob) => match value {
            SqlValue::Text(s) => Ok(Value::Blob(s.clone().into_bytes())),
            other => plain_value(other),
        },
        _ => plain_value(value),
    }
}

fn plain_value(value: &SqlValue) -> Result<Value, SqlDaoError> {
    Ok(match value {
        SqlValue::Int(i) => Value::Integer(*i),
        SqlValue::Float(f) => Value::Real(*f),
        // Exact numbers go in as text so no digits are lost.
        SqlValue::Decimal(d) => Value::Text(d.to_string()),
        SqlValue::BigInt(b) => Value::Text(b.to_string()),
        SqlValue::Text(s) => Value::Text(s.clone()),
        SqlValue::Bool(b) => Value::Integer(i64::from(*b)),
        SqlValue::Date(d) => Value::Text(d.format("%F").to_string()),
        SqlValue::Time(t) => Value::Text(t.format("%T%.f").to_string()),
        SqlValue::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        SqlValue::Null => Value::Null,
        SqlValue::JSON(json) => Value::Text(json.to_string()),
        SqlValue::Blob(bytes) => Value::Blob(bytes.clone()),
        SqlValue::List(_) => {
            return Err(SqlDaoError::conversion("cannot bind a list as a single value"));
        }
    })
}

/// Bind `params` onto a prepared statement.
///
/// Positional values bind to `?1..?n` in order. Named values bind to
/// `:NAME`; names the statement does not use are skipped.
///
/// # Errors
/// Returns `SqlDaoError::ParameterError` if the positional count does not
/// match the statement or a named placeholder has no value, or a
/// conversion/driver error.
pub fn bind_parameters(stmt: &mut Statement<'_>, params: &Parameter) -> Result<(), SqlDaoError> {
    match params {
        Parameter::Indexed(indexed) => {
            let expected = stmt.parameter_count();
            if indexed.len() != expected {
                return Err(SqlDaoError::ParameterError(format!(
                    "statement expects {expected} positional parameters, got {}",
                    indexed.len()
                )));
            }
            for (idx, param) in indexed.values().iter().enumerate() {
                stmt.raw_bind_parameter(idx + 1, to_sqlite_value(param)?)?;
            }
        }
        Parameter::Named(named) => {
            // Walk the statement's placeholders; supplied names it never
            // references are left unbound.
            for idx in 1..=stmt.parameter_count() {
                let Some(placeholder) = stmt.parameter_name(idx).map(str::to_owned) else {
                    return Err(SqlDaoError::ParameterError(format!(
                        "placeholder {idx} is positional but parameters are bound by name"
                    )));
                };
                let name = placeholder.trim_start_matches([':', '@', '$']);
                let param = named.get(name).ok_or_else(|| {
                    SqlDaoError::ParameterError(format!(
                        "no value supplied for parameter {placeholder}"
                    ))
                })?;
                stmt.raw_bind_parameter(idx, to_sqlite_value(param)?)?;
            }
        }
    }
    Ok(())
}
