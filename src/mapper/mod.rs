//! Mapping cursor rows onto records.
//!
//! A [`RowMapper`] belongs to a single query. On the first row it matches
//! the cursor's columns against the record's [`FieldTable`] and keeps the
//! matches; every later row reuses them.

mod record;
mod row;

use indexmap::IndexMap;
use tracing::trace;

use crate::config::DateFormats;
use crate::conversion::coerce;
use crate::error::SqlDaoError;

pub use record::{FieldSetter, FieldTable, Record};
pub use row::{ColumnInfo, ResultRow, read_column, read_streamed};

struct MappedColumn<T: 'static> {
    column: ColumnInfo,
    setter: &'static FieldSetter<T>,
}

/// Maps the rows of one result onto `T`.
pub struct RowMapper<T: Record> {
    formats: DateFormats,
    setters: Option<IndexMap<String, MappedColumn<T>>>,
}

impl<T: Record> RowMapper<T> {
    #[must_use]
    pub fn new(formats: DateFormats) -> Self {
        Self {
            formats,
            setters: None,
        }
    }

    /// Whether the column/field matching has been done.
    #[must_use]
    pub fn is_prepared(&self) -> bool {
        self.setters.is_some()
    }

    /// Map the current row onto a fresh record.
    ///
    /// NULL columns leave the field at its initial value. Columns without a
    /// matching field are ignored.
    ///
    /// # Errors
    /// Returns `SqlDaoError` if the record cannot be instantiated, a column
    /// cannot be read, or a value cannot be converted to its field's type.
    pub fn map_row(&mut self, row: &dyn ResultRow) -> Result<T, SqlDaoError> {
        if self.setters.is_none() {
            self.setters = Some(Self::prepare(row.columns()?));
        }
        let Some(setters) = self.setters.as_ref() else {
            return Err(SqlDaoError::Other("row mapper is not prepared".into()));
        };

        let mut record = T::instantiate()?;
        for mapped in setters.values() {
            let raw = read_column(row, &mapped.column)?;
            if raw.is_null() {
                continue;
            }
            let value = coerce(raw, mapped.setter.target(), &self.formats).map_err(|e| {
                SqlDaoError::ConversionError(format!("column {}: {e}", mapped.column.name))
            })?;
            mapped.setter.assign(&mut record, value)?;
        }
        Ok(record)
    }

    fn prepare(columns: Vec<ColumnInfo>) -> IndexMap<String, MappedColumn<T>> {
        let table = T::field_table();
        let mut setters = IndexMap::with_capacity(columns.len());
        for column in columns {
            let key = column.key().to_string();
            if setters.contains_key(&key) {
                continue;
            }
            match table.lookup(&key) {
                Some(setter) => {
                    trace!(
                        record = std::any::type_name::<T>(),
                        column = %column.name,
                        sql_type = ?column.sql_type,
                        field = setter.name(),
                        target = ?setter.target(),
                        "mapping column"
                    );
                    setters.insert(key, MappedColumn { column, setter });
                }
                None => trace!(
                    record = std::any::type_name::<T>(),
                    column = %column.name,
                    "no writable field for column"
                ),
            }
        }
        setters
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use bigdecimal::num_bigint::BigInt;
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::results::ValueRow;
    use crate::types::{SqlType, SqlValue};

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Invoice {
        id: i64,
        code: String,
        amount: BigDecimal,
        units: i32,
        issued: Option<NaiveDate>,
        updated: Option<NaiveDateTime>,
        serial: BigInt,
        attachment: Vec<u8>,
        note: Option<String>,
    }

    crate::impl_record!(Invoice {
        id,
        code,
        amount,
        units,
        issued,
        updated => "LAST_UPDATE",
        serial,
        attachment,
        note,
    });

    fn invoice_row() -> ValueRow {
        ValueRow::from_triples([
            ("ID", SqlType::Integer, SqlValue::Int(10)),
            ("code", SqlType::Integer, SqlValue::Int(42)),
            ("AMOUNT", SqlType::Decimal, SqlValue::Float(99.95)),
            ("Units", SqlType::Varchar, SqlValue::Text("7".into())),
            ("ISSUED", SqlType::Varchar, SqlValue::Text("2024-03-01".into())),
            (
                "LAST_UPDATE",
                SqlType::Varchar,
                SqlValue::Text("2024-03-01 10:20:30".into()),
            ),
            ("SERIAL", SqlType::Numeric, SqlValue::Float(12345.0)),
            ("ATTACHMENT", SqlType::Blob, SqlValue::Blob(vec![0xCA, 0xFE])),
            ("NOTE", SqlType::Clob, SqlValue::Null),
            ("UNMAPPED", SqlType::Varchar, SqlValue::Text("ignored".into())),
        ])
    }

    #[test]
    fn maps_and_coerces_every_matched_column() {
        let mut mapper = RowMapper::<Invoice>::new(DateFormats::default());
        assert!(!mapper.is_prepared());
        let invoice = mapper.map_row(&invoice_row()).unwrap();
        assert!(mapper.is_prepared());

        assert_eq!(invoice.id, 10);
        assert_eq!(invoice.code, "42");
        assert_eq!(invoice.amount, BigDecimal::from_str("99.95").unwrap());
        assert_eq!(invoice.units, 7);
        assert_eq!(invoice.issued, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(
            invoice.updated,
            NaiveDate::from_ymd_opt(2024, 3, 1).and_then(|d| d.and_hms_opt(10, 20, 30))
        );
        assert_eq!(invoice.serial, BigInt::from(12345));
        assert_eq!(invoice.attachment, vec![0xCA, 0xFE]);
        assert_eq!(invoice.note, None);
    }

    #[test]
    fn fresh_mappers_produce_equal_records() {
        let row = invoice_row();
        let first = RowMapper::<Invoice>::new(DateFormats::default())
            .map_row(&row)
            .unwrap();
        let second = RowMapper::<Invoice>::new(DateFormats::default())
            .map_row(&row)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn cache_is_reused_for_later_rows() {
        let mut mapper = RowMapper::<Invoice>::new(DateFormats::default());
        mapper.map_row(&invoice_row()).unwrap();

        let next = ValueRow::from_triples([
            ("ID", SqlType::Integer, SqlValue::Int(11)),
            ("code", SqlType::Varchar, SqlValue::Text("B".into())),
            ("AMOUNT", SqlType::Decimal, SqlValue::Null),
            ("Units", SqlType::Integer, SqlValue::Int(1)),
            ("ISSUED", SqlType::Varchar, SqlValue::Null),
            ("LAST_UPDATE", SqlType::Varchar, SqlValue::Null),
            ("SERIAL", SqlType::Numeric, SqlValue::Int(3)),
            ("ATTACHMENT", SqlType::Blob, SqlValue::Null),
            ("NOTE", SqlType::Clob, SqlValue::Text("paid".into())),
            ("UNMAPPED", SqlType::Varchar, SqlValue::Null),
        ]);
        let invoice = mapper.map_row(&next).unwrap();
        assert_eq!(invoice.id, 11);
        assert_eq!(invoice.amount, BigDecimal::default());
        assert_eq!(invoice.issued, None);
        assert_eq!(invoice.note.as_deref(), Some("paid"));
    }

    #[test]
    fn conversion_failure_names_the_column() {
        let row = ValueRow::from_triples([("UNITS", SqlType::Varchar, SqlValue::Text("seven".into()))]);
        let err = RowMapper::<Invoice>::new(DateFormats::default())
            .map_row(&row)
            .unwrap_err();
        match err {
            SqlDaoError::ConversionError(msg) => assert!(msg.contains("UNITS"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[derive(Debug)]
    struct Unbuildable;

    impl Record for Unbuildable {
        fn instantiate() -> Result<Self, SqlDaoError> {
            Err(SqlDaoError::InstantiationError("no default".into()))
        }

        fn field_table() -> &'static FieldTable<Self> {
            static TABLE: std::sync::LazyLock<FieldTable<Unbuildable>> =
                std::sync::LazyLock::new(|| FieldTable::new(Vec::new()));
            &TABLE
        }
    }

    #[test]
    fn instantiation_failure_aborts_mapping() {
        let row = ValueRow::from_triples([("ID", SqlType::Integer, SqlValue::Int(1))]);
        let err = RowMapper::<Unbuildable>::new(DateFormats::default())
            .map_row(&row)
            .unwrap_err();
        assert!(matches!(err, SqlDaoError::InstantiationError(_)));
    }
}
