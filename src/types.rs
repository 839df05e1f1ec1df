use std::fmt;

use bigdecimal::BigDecimal;
use bigdecimal::num_bigint::BigInt;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Values that can be bound as query parameters or read back from a row.
///
/// The same enum is used on both sides so binding, logging, and row mapping
/// never need to branch on driver types:
/// ```rust
/// use sql_paging_dao::prelude::*;
///
/// let values = vec![
///     SqlValue::Int(1),
///     SqlValue::Text("alice".into()),
///     SqlValue::Bool(true),
/// ];
/// # let _ = values;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Exact decimal value
    Decimal(BigDecimal),
    /// Arbitrary precision integer
    BigInt(BigInt),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Date without time of day
    Date(NaiveDate),
    /// Time of day without date
    Time(NaiveTime),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
    /// A collection of values, e.g. the items of an IN list
    List(Vec<SqlValue>),
}

impl SqlValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let SqlValue::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let SqlValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let SqlValue::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let SqlValue::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Build a `List` value from any iterator of convertible items.
    pub fn list<I, T>(items: I) -> SqlValue
    where
        I: IntoIterator<Item = T>,
        T: Into<SqlValue>,
    {
        SqlValue::List(items.into_iter().map(Into::into).collect())
    }

    /// The field type this value already satisfies without conversion.
    ///
    /// `None` for `NULL` and collections, which never match a field directly.
    #[must_use]
    pub fn runtime_type(&self) -> Option<TargetType> {
        match self {
            SqlValue::Int(_) => Some(TargetType::Long),
            SqlValue::Float(_) => Some(TargetType::Double),
            SqlValue::Decimal(_) => Some(TargetType::Decimal),
            SqlValue::BigInt(_) => Some(TargetType::BigInt),
            SqlValue::Text(_) => Some(TargetType::Text),
            SqlValue::Bool(_) => Some(TargetType::Bool),
            SqlValue::Date(_) => Some(TargetType::Date),
            SqlValue::Time(_) => Some(TargetType::Time),
            SqlValue::Timestamp(_) => Some(TargetType::DateTime),
            SqlValue::JSON(_) => Some(TargetType::Json),
            SqlValue::Blob(_) => Some(TargetType::Bytes),
            SqlValue::Null | SqlValue::List(_) => None,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Int(v) => write!(f, "{v}"),
            SqlValue::Float(v) => write!(f, "{v}"),
            SqlValue::Decimal(v) => write!(f, "{v}"),
            SqlValue::BigInt(v) => write!(f, "{v}"),
            SqlValue::Text(v) => write!(f, "{v}"),
            SqlValue::Bool(v) => write!(f, "{v}"),
            SqlValue::Date(v) => write!(f, "{v}"),
            SqlValue::Time(v) => write!(f, "{v}"),
            SqlValue::Timestamp(v) => write!(f, "{}", v.format("%Y-%m-%dT%H:%M:%S%.f")),
            SqlValue::Null => write!(f, "null"),
            SqlValue::JSON(v) => write!(f, "{v}"),
            SqlValue::Blob(v) => write!(f, "<{} bytes>", v.len()),
            SqlValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

macro_rules! impl_from_for_sql_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for SqlValue {
                fn from(value: $ty) -> Self {
                    SqlValue::$variant(value.into())
                }
            }
        )*
    };
}

impl_from_for_sql_value!(
    i64 => Int,
    i32 => Int,
    i16 => Int,
    u32 => Int,
    f64 => Float,
    f32 => Float,
    BigDecimal => Decimal,
    BigInt => BigInt,
    String => Text,
    &str => Text,
    bool => Bool,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => Timestamp,
    JsonValue => JSON,
    Vec<u8> => Blob,
);

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

/// SQL type codes used as explicit wire types for parameters and as declared
/// column types from cursor metadata.
///
/// The numeric codes follow the type numbering most database drivers report
/// in their metadata, so codes read from a catalog map back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SqlType {
    Varchar,
    Char,
    Numeric,
    Decimal,
    Integer,
    BigInt,
    SmallInt,
    Float,
    Double,
    Boolean,
    Date,
    Time,
    Timestamp,
    Blob,
    Clob,
    Null,
    Other,
    RefCursor,
    Cursor,
}

impl SqlType {
    const ALL: [SqlType; 19] = [
        SqlType::Varchar,
        SqlType::Char,
        SqlType::Numeric,
        SqlType::Decimal,
        SqlType::Integer,
        SqlType::BigInt,
        SqlType::SmallInt,
        SqlType::Float,
        SqlType::Double,
        SqlType::Boolean,
        SqlType::Date,
        SqlType::Time,
        SqlType::Timestamp,
        SqlType::Blob,
        SqlType::Clob,
        SqlType::Null,
        SqlType::Other,
        SqlType::RefCursor,
        SqlType::Cursor,
    ];

    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            SqlType::Varchar => 12,
            SqlType::Char => 1,
            SqlType::Numeric => 2,
            SqlType::Decimal => 3,
            SqlType::Integer => 4,
            SqlType::BigInt => -5,
            SqlType::SmallInt => 5,
            SqlType::Float => 6,
            SqlType::Double => 8,
            SqlType::Boolean => 16,
            SqlType::Date => 91,
            SqlType::Time => 92,
            SqlType::Timestamp => 93,
            SqlType::Blob => 2004,
            SqlType::Clob => 2005,
            SqlType::Null => 0,
            SqlType::Other => 1111,
            SqlType::RefCursor => 2012,
            SqlType::Cursor => -10,
        }
    }

    /// Map a numeric type code back to a `SqlType`; unknown codes become `Other`.
    #[must_use]
    pub fn from_code(code: i32) -> SqlType {
        Self::ALL
            .into_iter()
            .find(|ty| ty.code() == code)
            .unwrap_or(SqlType::Other)
    }

    /// Map a declared column type such as `DECIMAL(10,2)` or `varchar(20)`.
    #[must_use]
    pub fn from_declared(declared: &str) -> SqlType {
        let upper = declared.trim().to_ascii_uppercase();
        let base = upper
            .split(|c: char| c == '(' || c.is_whitespace())
            .next()
            .unwrap_or_default();
        match base {
            "VARCHAR" | "VARCHAR2" | "NVARCHAR" | "NVARCHAR2" | "TEXT" | "STRING" => {
                SqlType::Varchar
            }
            "CHAR" | "NCHAR" | "CHARACTER" => SqlType::Char,
            "NUMERIC" | "NUMBER" => SqlType::Numeric,
            "DECIMAL" | "DEC" | "MONEY" => SqlType::Decimal,
            "INT" | "INTEGER" | "MEDIUMINT" => SqlType::Integer,
            "BIGINT" | "INT8" => SqlType::BigInt,
            "SMALLINT" | "TINYINT" | "INT2" => SqlType::SmallInt,
            "FLOAT" | "REAL" => SqlType::Float,
            "DOUBLE" => SqlType::Double,
            "BOOL" | "BOOLEAN" | "BIT" => SqlType::Boolean,
            "DATE" => SqlType::Date,
            "TIME" => SqlType::Time,
            "TIMESTAMP" | "DATETIME" | "DATETIME2" => SqlType::Timestamp,
            "BLOB" | "BINARY" | "VARBINARY" | "BYTEA" | "RAW" => SqlType::Blob,
            "CLOB" | "NCLOB" | "LONGTEXT" => SqlType::Clob,
            _ => SqlType::Other,
        }
    }

    #[must_use]
    pub fn is_large_object(self) -> bool {
        matches!(self, SqlType::Blob | SqlType::Clob)
    }
}

/// Declared type of a record field, used to pick a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    Text,
    Long,
    Int,
    Short,
    Double,
    Float,
    Decimal,
    BigInt,
    Bool,
    Date,
    DateTime,
    Time,
    Bytes,
    Json,
}

impl TargetType {
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            TargetType::Long
                | TargetType::Int
                | TargetType::Short
                | TargetType::Double
                | TargetType::Float
                | TargetType::Decimal
                | TargetType::BigInt
        )
    }

    #[must_use]
    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            TargetType::Date | TargetType::DateTime | TargetType::Time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_codes_round_trip_and_unknown_is_other() {
        assert_eq!(SqlType::from_code(SqlType::Decimal.code()), SqlType::Decimal);
        assert_eq!(SqlType::from_code(-10), SqlType::Cursor);
        assert_eq!(SqlType::from_code(424_242), SqlType::Other);
    }

    #[test]
    fn declared_types_ignore_precision_and_case() {
        assert_eq!(SqlType::from_declared("DECIMAL(10,2)"), SqlType::Decimal);
        assert_eq!(SqlType::from_declared("varchar(20)"), SqlType::Varchar);
        assert_eq!(SqlType::from_declared("INTEGER"), SqlType::Integer);
        assert_eq!(SqlType::from_declared("unsigned big int"), SqlType::Other);
        assert!(SqlType::from_declared("clob").is_large_object());
    }

    #[test]
    fn list_values_render_for_logging() {
        let value = SqlValue::list([5_i64, 7, 9]);
        assert_eq!(value.to_string(), "[5, 7, 9]");
        assert_eq!(SqlValue::from(Some(3_i32)), SqlValue::Int(3));
        assert_eq!(SqlValue::from(None::<String>), SqlValue::Null);
        assert_eq!(SqlValue::from(vec![1_u8, 2]), SqlValue::Blob(vec![1, 2]));
    }
}
