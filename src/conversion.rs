//! Value conversion between column values and record field types.
//!
//! [`coerce`] brings a raw column value into the shape a field declares:
//! values already of that type pass straight through, textual fields take
//! the value's text form, numeric and temporal fields go through the
//! converters below, and everything else is handed to the field unchanged.
//! [`FromSqlValue`] then moves the coerced value into the field itself.

use std::str::FromStr;

use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value as JsonValue;

use crate::config::DateFormats;
use crate::error::SqlDaoError;
use crate::types::{SqlValue, TargetType};

/// Coerce `value` to the representation expected by a `target` field.
///
/// # Errors
/// Returns `SqlDaoError::ConversionError` if a numeric or temporal
/// conversion is not possible.
pub fn coerce(
    value: SqlValue,
    target: TargetType,
    formats: &DateFormats,
) -> Result<SqlValue, SqlDaoError> {
    if value.runtime_type() == Some(target) {
        return Ok(value);
    }
    if target == TargetType::Text {
        return Ok(SqlValue::Text(render_text(&value, formats)));
    }
    if target.is_numeric() {
        return convert_number(&value, target);
    }
    if target.is_temporal() {
        return convert_temporal(&value, target, formats);
    }
    Ok(value)
}

/// Text form of a value, rendering temporal values with the first configured
/// pattern.
#[must_use]
pub fn render_text(value: &SqlValue, formats: &DateFormats) -> String {
    match value {
        SqlValue::Date(d) => match formats.date.first() {
            Some(pattern) => d.format(pattern).to_string(),
            None => d.to_string(),
        },
        SqlValue::Time(t) => match formats.time.first() {
            Some(pattern) => t.format(pattern).to_string(),
            None => t.to_string(),
        },
        SqlValue::Timestamp(ts) => match formats.date_time.first() {
            Some(pattern) => ts.format(pattern).to_string(),
            None => value.to_string(),
        },
        SqlValue::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        other => other.to_string(),
    }
}

fn convert_number(value: &SqlValue, target: TargetType) -> Result<SqlValue, SqlDaoError> {
    match target {
        TargetType::Long => to_i64(value).map(SqlValue::Int),
        TargetType::Int => {
            let n = to_i64(value)?;
            i32::try_from(n)
                .map(|n| SqlValue::Int(n.into()))
                .map_err(|_| out_of_range(value, "i32"))
        }
        TargetType::Short => {
            let n = to_i64(value)?;
            i16::try_from(n)
                .map(|n| SqlValue::Int(n.into()))
                .map_err(|_| out_of_range(value, "i16"))
        }
        TargetType::Double | TargetType::Float => to_f64(value).map(SqlValue::Float),
        TargetType::Decimal => to_decimal(value).map(SqlValue::Decimal),
        TargetType::BigInt => {
            let decimal = to_decimal(value)?;
            truncate(&decimal, MAX_BIGINT_DIGITS, value, "a big integer").map(SqlValue::BigInt)
        }
        _ => Ok(value.clone()),
    }
}

fn to_decimal(value: &SqlValue) -> Result<BigDecimal, SqlDaoError> {
    match value {
        SqlValue::Int(n) => Ok(BigDecimal::from(*n)),
        // Parse the shortest round-trip text so 0.1 stays 0.1, not its binary expansion.
        SqlValue::Float(f) if f.is_finite() => parse_decimal(&f.to_string()),
        SqlValue::Decimal(d) => Ok(d.clone()),
        SqlValue::BigInt(b) => Ok(BigDecimal::new(b.clone(), 0)),
        SqlValue::Bool(b) => Ok(BigDecimal::from(i64::from(*b))),
        SqlValue::Text(s) => parse_decimal(s),
        other => Err(not_numeric(other)),
    }
}

fn parse_decimal(text: &str) -> Result<BigDecimal, SqlDaoError> {
    BigDecimal::from_str(text.trim())
        .map_err(|e| SqlDaoError::conversion(format!("'{text}' is not a number: {e}")))
}

/// Integer digits an `i64` can hold.
const I64_DIGITS: i64 = 19;
/// Largest integer part accepted for a `BigInt` target.
const MAX_BIGINT_DIGITS: i64 = 4096;

/// Digits left of the decimal point; zero or negative below magnitude 1.
fn integer_digits(decimal: &BigDecimal) -> i64 {
    let (_, scale) = decimal.as_bigint_and_exponent();
    i64::try_from(decimal.digits())
        .unwrap_or(i64::MAX)
        .saturating_sub(scale)
}

/// Drop the fraction of `decimal`, refusing integer parts wider than
/// `max_digits` before any digits are expanded.
fn truncate(
    decimal: &BigDecimal,
    max_digits: i64,
    value: &SqlValue,
    ty: &str,
) -> Result<BigInt, SqlDaoError> {
    let digits = integer_digits(decimal);
    if digits <= 0 {
        return Ok(BigInt::from(0));
    }
    if digits > max_digits {
        return Err(out_of_range(value, ty));
    }
    Ok(decimal.with_scale(0).into_bigint_and_exponent().0)
}

fn to_i64(value: &SqlValue) -> Result<i64, SqlDaoError> {
    match value {
        SqlValue::Int(n) => Ok(*n),
        SqlValue::Bool(b) => Ok(i64::from(*b)),
        SqlValue::Text(s) => match s.trim().parse::<i64>() {
            Ok(n) => Ok(n),
            Err(_) => truncate(&parse_decimal(s)?, I64_DIGITS, value, "i64")?
                .to_i64()
                .ok_or_else(|| out_of_range(value, "i64")),
        },
        _ => truncate(&to_decimal(value)?, I64_DIGITS, value, "i64")?
            .to_i64()
            .ok_or_else(|| out_of_range(value, "i64")),
    }
}

fn to_f64(value: &SqlValue) -> Result<f64, SqlDaoError> {
    match value {
        SqlValue::Float(f) => Ok(*f),
        #[allow(clippy::cast_precision_loss)]
        SqlValue::Int(n) => Ok(*n as f64),
        _ => {
            let decimal = to_decimal(value)?;
            // f64::MAX has 309 integer digits.
            if integer_digits(&decimal) > 309 {
                return Err(out_of_range(value, "f64"));
            }
            decimal.to_f64().ok_or_else(|| out_of_range(value, "f64"))
        }
    }
}

fn convert_temporal(
    value: &SqlValue,
    target: TargetType,
    formats: &DateFormats,
) -> Result<SqlValue, SqlDaoError> {
    match target {
        TargetType::Date => to_date(value, formats).map(SqlValue::Date),
        TargetType::DateTime => to_date_time(value, formats).map(SqlValue::Timestamp),
        TargetType::Time => to_time(value, formats).map(SqlValue::Time),
        _ => Ok(value.clone()),
    }
}

fn to_date(value: &SqlValue, formats: &DateFormats) -> Result<NaiveDate, SqlDaoError> {
    match value {
        SqlValue::Date(d) => Ok(*d),
        SqlValue::Timestamp(ts) => Ok(ts.date()),
        SqlValue::Int(millis) => from_epoch_millis(*millis).map(|ts| ts.date()),
        SqlValue::Text(s) => {
            let s = s.trim();
            parse_with(&formats.date, |p| NaiveDate::parse_from_str(s, p))
                .or_else(|| {
                    parse_with(&formats.date_time, |p| NaiveDateTime::parse_from_str(s, p))
                        .map(|ts| ts.date())
                })
                .ok_or_else(|| not_temporal(value, "date"))
        }
        other => Err(not_temporal(other, "date")),
    }
}

fn to_date_time(value: &SqlValue, formats: &DateFormats) -> Result<NaiveDateTime, SqlDaoError> {
    match value {
        SqlValue::Timestamp(ts) => Ok(*ts),
        SqlValue::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
        SqlValue::Int(millis) => from_epoch_millis(*millis),
        SqlValue::Text(s) => {
            let s = s.trim();
            parse_with(&formats.date_time, |p| NaiveDateTime::parse_from_str(s, p))
                .or_else(|| {
                    parse_with(&formats.date, |p| NaiveDate::parse_from_str(s, p))
                        .map(|d| d.and_time(NaiveTime::MIN))
                })
                .ok_or_else(|| not_temporal(value, "date-time"))
        }
        other => Err(not_temporal(other, "date-time")),
    }
}

fn to_time(value: &SqlValue, formats: &DateFormats) -> Result<NaiveTime, SqlDaoError> {
    match value {
        SqlValue::Time(t) => Ok(*t),
        SqlValue::Timestamp(ts) => Ok(ts.time()),
        SqlValue::Text(s) => {
            let s = s.trim();
            parse_with(&formats.time, |p| NaiveTime::parse_from_str(s, p))
                .or_else(|| {
                    parse_with(&formats.date_time, |p| NaiveDateTime::parse_from_str(s, p))
                        .map(|ts| ts.time())
                })
                .ok_or_else(|| not_temporal(value, "time"))
        }
        other => Err(not_temporal(other, "time")),
    }
}

fn parse_with<T, F>(patterns: &[String], parse: F) -> Option<T>
where
    F: Fn(&str) -> chrono::ParseResult<T>,
{
    patterns.iter().find_map(|p| parse(p).ok())
}

fn from_epoch_millis(millis: i64) -> Result<NaiveDateTime, SqlDaoError> {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| SqlDaoError::conversion(format!("{millis} is out of range for a timestamp")))
}

fn not_numeric(value: &SqlValue) -> SqlDaoError {
    SqlDaoError::conversion(format!("cannot convert {value:?} to a number"))
}

fn out_of_range(value: &SqlValue, ty: &str) -> SqlDaoError {
    SqlDaoError::conversion(format!("{value} is out of range for {ty}"))
}

fn not_temporal(value: &SqlValue, kind: &str) -> SqlDaoError {
    SqlDaoError::conversion(format!("cannot convert {value:?} to a {kind}"))
}

/// A Rust type a column value can be assigned to.
///
/// `TARGET` picks the conversion applied by [`coerce`] before
/// `from_sql_value` is called, so implementations only accept the coerced
/// representation.
pub trait FromSqlValue: Sized {
    const TARGET: TargetType;

    /// # Errors
    /// Returns `SqlDaoError::ConversionError` if the value has the wrong shape.
    fn from_sql_value(value: SqlValue) -> Result<Self, SqlDaoError>;
}

fn mismatch<T>(value: &SqlValue) -> SqlDaoError {
    SqlDaoError::conversion(format!(
        "cannot assign {value:?} to {}",
        std::any::type_name::<T>()
    ))
}

impl FromSqlValue for String {
    const TARGET: TargetType = TargetType::Text;

    fn from_sql_value(value: SqlValue) -> Result<Self, SqlDaoError> {
        match value {
            SqlValue::Text(s) => Ok(s),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

macro_rules! impl_from_sql_value_int {
    ($($ty:ty => $target:ident),* $(,)?) => {
        $(
            impl FromSqlValue for $ty {
                const TARGET: TargetType = TargetType::$target;

                fn from_sql_value(value: SqlValue) -> Result<Self, SqlDaoError> {
                    match value {
                        SqlValue::Int(n) => <$ty>::try_from(n)
                            .map_err(|_| out_of_range(&value, stringify!($ty))),
                        other => Err(mismatch::<Self>(&other)),
                    }
                }
            }
        )*
    };
}

impl_from_sql_value_int!(i64 => Long, i32 => Int, i16 => Short);

impl FromSqlValue for f64 {
    const TARGET: TargetType = TargetType::Double;

    fn from_sql_value(value: SqlValue) -> Result<Self, SqlDaoError> {
        match value {
            SqlValue::Float(f) => Ok(f),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromSqlValue for f32 {
    const TARGET: TargetType = TargetType::Float;

    fn from_sql_value(value: SqlValue) -> Result<Self, SqlDaoError> {
        match value {
            #[allow(clippy::cast_possible_truncation)]
            SqlValue::Float(f) => Ok(f as f32),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromSqlValue for BigDecimal {
    const TARGET: TargetType = TargetType::Decimal;

    fn from_sql_value(value: SqlValue) -> Result<Self, SqlDaoError> {
        match value {
            SqlValue::Decimal(d) => Ok(d),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromSqlValue for BigInt {
    const TARGET: TargetType = TargetType::BigInt;

    fn from_sql_value(value: SqlValue) -> Result<Self, SqlDaoError> {
        match value {
            SqlValue::BigInt(b) => Ok(b),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromSqlValue for bool {
    const TARGET: TargetType = TargetType::Bool;

    fn from_sql_value(value: SqlValue) -> Result<Self, SqlDaoError> {
        match value {
            SqlValue::Bool(b) => Ok(b),
            SqlValue::Int(1) => Ok(true),
            SqlValue::Int(0) => Ok(false),
            SqlValue::Text(ref s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "y" | "yes" | "1" => Ok(true),
                "false" | "n" | "no" | "0" => Ok(false),
                _ => Err(mismatch::<Self>(&value)),
            },
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromSqlValue for NaiveDate {
    const TARGET: TargetType = TargetType::Date;

    fn from_sql_value(value: SqlValue) -> Result<Self, SqlDaoError> {
        match value {
            SqlValue::Date(d) => Ok(d),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromSqlValue for NaiveDateTime {
    const TARGET: TargetType = TargetType::DateTime;

    fn from_sql_value(value: SqlValue) -> Result<Self, SqlDaoError> {
        match value {
            SqlValue::Timestamp(ts) => Ok(ts),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromSqlValue for NaiveTime {
    const TARGET: TargetType = TargetType::Time;

    fn from_sql_value(value: SqlValue) -> Result<Self, SqlDaoError> {
        match value {
            SqlValue::Time(t) => Ok(t),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromSqlValue for Vec<u8> {
    const TARGET: TargetType = TargetType::Bytes;

    fn from_sql_value(value: SqlValue) -> Result<Self, SqlDaoError> {
        match value {
            SqlValue::Blob(bytes) => Ok(bytes),
            SqlValue::Text(s) => Ok(s.into_bytes()),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromSqlValue for JsonValue {
    const TARGET: TargetType = TargetType::Json;

    fn from_sql_value(value: SqlValue) -> Result<Self, SqlDaoError> {
        match value {
            SqlValue::JSON(json) => Ok(json),
            SqlValue::Text(s) => serde_json::from_str(&s)
                .map_err(|e| SqlDaoError::conversion(format!("invalid JSON text: {e}"))),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    const TARGET: TargetType = T::TARGET;

    fn from_sql_value(value: SqlValue) -> Result<Self, SqlDaoError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_sql_value(value).map(Some)
        }
    }
}

/// Coerce and assign in one step.
///
/// # Errors
/// Returns `SqlDaoError::ConversionError` if the value cannot become a `T`.
pub fn convert_value<T: FromSqlValue>(
    value: SqlValue,
    formats: &DateFormats,
) -> Result<T, SqlDaoError> {
    if value.is_null() {
        return T::from_sql_value(value);
    }
    T::from_sql_value(coerce(value, T::TARGET, formats)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formats() -> DateFormats {
        DateFormats::default()
    }

    #[test]
    fn float_to_decimal_uses_its_text_form() {
        let value = coerce(SqlValue::Float(12.34), TargetType::Decimal, &formats()).unwrap();
        assert_eq!(value, SqlValue::Decimal(BigDecimal::from_str("12.34").unwrap()));

        let tenth: BigDecimal = convert_value(SqlValue::Float(0.1), &formats()).unwrap();
        assert_eq!(tenth.to_string(), "0.1");
    }

    #[test]
    fn matching_runtime_type_passes_through() {
        let value = SqlValue::Text("abc".into());
        assert_eq!(
            coerce(value.clone(), TargetType::Text, &formats()).unwrap(),
            value
        );
    }

    #[test]
    fn textual_targets_take_text_form() {
        let s: String = convert_value(SqlValue::Int(42), &formats()).unwrap();
        assert_eq!(s, "42");
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let s: String = convert_value(SqlValue::Date(date), &formats()).unwrap();
        assert_eq!(s, "2024-02-29");
        let ts = date.and_hms_opt(8, 30, 0).unwrap();
        let s: String = convert_value(SqlValue::Timestamp(ts), &formats()).unwrap();
        assert_eq!(s, "2024-02-29T08:30:00");
    }

    #[test]
    fn numeric_conversions() {
        let n: i32 = convert_value(SqlValue::Float(7.9), &formats()).unwrap();
        assert_eq!(n, 7);
        let n: i64 = convert_value(SqlValue::Text(" 15 ".into()), &formats()).unwrap();
        assert_eq!(n, 15);
        let n: i16 = convert_value(SqlValue::Decimal(BigDecimal::from(-3)), &formats()).unwrap();
        assert_eq!(n, -3);
        let f: f64 = convert_value(SqlValue::Int(2), &formats()).unwrap();
        assert!((f - 2.0).abs() < f64::EPSILON);
        let f: f32 = convert_value(SqlValue::Text("1.5".into()), &formats()).unwrap();
        assert!((f - 1.5).abs() < f32::EPSILON);
        let b: BigInt = convert_value(SqlValue::Float(99.99), &formats()).unwrap();
        assert_eq!(b, BigInt::from(99));
    }

    #[test]
    fn numeric_failures_are_conversion_errors() {
        assert!(matches!(
            convert_value::<i64>(SqlValue::Text("abc".into()), &formats()),
            Err(SqlDaoError::ConversionError(_))
        ));
        assert!(matches!(
            convert_value::<i16>(SqlValue::Int(70_000), &formats()),
            Err(SqlDaoError::ConversionError(_))
        ));
        assert!(convert_value::<BigDecimal>(SqlValue::Float(f64::NAN), &formats()).is_err());
    }

    #[test]
    fn huge_exponents_fail_without_expanding_digits() {
        let huge = || SqlValue::Text("1e999999999".into());
        assert!(matches!(
            convert_value::<i64>(huge(), &formats()),
            Err(SqlDaoError::ConversionError(_))
        ));
        assert!(matches!(
            convert_value::<i16>(huge(), &formats()),
            Err(SqlDaoError::ConversionError(_))
        ));
        assert!(matches!(
            convert_value::<BigInt>(huge(), &formats()),
            Err(SqlDaoError::ConversionError(_))
        ));
        assert!(convert_value::<f64>(huge(), &formats()).is_err());

        let tiny: i64 = convert_value(SqlValue::Text("1e-999999999".into()), &formats()).unwrap();
        assert_eq!(tiny, 0);
        let wide: BigInt = convert_value(SqlValue::Text("1.9e20".into()), &formats()).unwrap();
        assert_eq!(wide.to_string(), "190000000000000000000");
        assert!(convert_value::<i64>(SqlValue::Text("1.9e20".into()), &formats()).is_err());
    }

    #[test]
    fn temporal_conversions() {
        let d: NaiveDate =
            convert_value(SqlValue::Text("2023-05-06T07:08:09".into()), &formats()).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2023, 5, 6).unwrap());

        let ts: NaiveDateTime =
            convert_value(SqlValue::Text("2023-05-06 07:08:09.250".into()), &formats()).unwrap();
        assert_eq!(ts.to_string(), "2023-05-06 07:08:09.250");

        let ts: NaiveDateTime =
            convert_value(SqlValue::Text("2023-05-06".into()), &formats()).unwrap();
        assert_eq!(ts.time(), NaiveTime::MIN);

        let t: NaiveTime = convert_value(SqlValue::Text("23:59".into()), &formats()).unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(23, 59, 0).unwrap());

        let ts: NaiveDateTime = convert_value(SqlValue::Int(0), &formats()).unwrap();
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());

        assert!(convert_value::<NaiveDate>(SqlValue::Text("yesterday".into()), &formats()).is_err());
    }

    #[test]
    fn configured_formats_are_honoured() {
        let formats = DateFormats::default().with_date("%d/%m/%Y");
        let d: NaiveDate = convert_value(SqlValue::Text("31/12/2020".into()), &formats).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2020, 12, 31).unwrap());
        let s: String = convert_value(SqlValue::Date(d), &formats).unwrap();
        assert_eq!(s, "31/12/2020");
    }

    #[test]
    fn uncovered_targets_pass_through() {
        let flag: bool = convert_value(SqlValue::Int(1), &formats()).unwrap();
        assert!(flag);
        let json: JsonValue = convert_value(SqlValue::Text(r#"{"a":1}"#.into()), &formats()).unwrap();
        assert_eq!(json["a"], 1);
        assert!(convert_value::<bool>(SqlValue::Float(0.5), &formats()).is_err());
        let none: Option<i64> = convert_value(SqlValue::Null, &formats()).unwrap();
        assert_eq!(none, None);
    }
}
