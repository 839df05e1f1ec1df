use std::collections::HashMap;

use crate::conversion::FromSqlValue;
use crate::error::SqlDaoError;
use crate::types::{SqlValue, TargetType};

type AssignFn<T> = dyn Fn(&mut T, SqlValue) -> Result<(), SqlDaoError> + Send + Sync;

/// A type rows can be mapped onto.
///
/// Usually implemented with [`impl_record!`](crate::impl_record), which
/// builds the field table once per type.
pub trait Record: Sized + 'static {
    /// A fresh record with every field at its empty value.
    ///
    /// # Errors
    /// Returns `SqlDaoError::InstantiationError` if no record can be built;
    /// the fetch is aborted.
    fn instantiate() -> Result<Self, SqlDaoError>;

    /// The writable fields of this type.
    fn field_table() -> &'static FieldTable<Self>;
}

/// Assignment handle for one writable field of `T`.
pub struct FieldSetter<T> {
    name: &'static str,
    column_key: String,
    target: TargetType,
    assign: Box<AssignFn<T>>,
}

impl<T: 'static> FieldSetter<T> {
    /// Register field `name`, filled from `column`, reached through `access`.
    ///
    /// The field's Rust type decides which conversion runs before assignment.
    #[must_use]
    pub fn field<V>(name: &'static str, column: &str, access: fn(&mut T) -> &mut V) -> Self
    where
        V: FromSqlValue + 'static,
    {
        Self {
            name,
            column_key: column.to_uppercase(),
            target: V::TARGET,
            assign: Box::new(move |record, value| {
                *access(record) = V::from_sql_value(value)?;
                Ok(())
            }),
        }
    }
}

impl<T> FieldSetter<T> {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Upper-cased column name this field is filled from.
    #[must_use]
    pub fn column_key(&self) -> &str {
        &self.column_key
    }

    #[must_use]
    pub fn target(&self) -> TargetType {
        self.target
    }

    /// Store an already coerced value into the field.
    ///
    /// # Errors
    /// Returns `SqlDaoError::ConversionError` if the value does not fit.
    pub fn assign(&self, record: &mut T, value: SqlValue) -> Result<(), SqlDaoError> {
        (self.assign)(record, value)
    }
}

impl<T> std::fmt::Debug for FieldSetter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSetter")
            .field("name", &self.name)
            .field("column_key", &self.column_key)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// Writable fields of a record type, looked up by upper-cased column name.
#[derive(Debug)]
pub struct FieldTable<T> {
    fields: Vec<FieldSetter<T>>,
    by_key: HashMap<String, usize>,
}

impl<T> FieldTable<T> {
    /// Index `fields`; when two fields claim a column the first one keeps it.
    #[must_use]
    pub fn new(fields: Vec<FieldSetter<T>>) -> Self {
        let mut by_key = HashMap::with_capacity(fields.len());
        for (idx, field) in fields.iter().enumerate() {
            by_key.entry(field.column_key.clone()).or_insert(idx);
        }
        Self { fields, by_key }
    }

    /// Find the field for a column, ignoring case.
    #[must_use]
    pub fn lookup(&self, column: &str) -> Option<&FieldSetter<T>> {
        self.by_key
            .get(&column.to_uppercase())
            .map(|&idx| &self.fields[idx])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSetter<T>> {
        self.fields.iter()
    }
}

/// Implement [`Record`] for a `Default` struct by listing its writable fields.
///
/// A field is filled from the column of the same name unless a column name
/// follows `=>`. Matching is case-insensitive.
///
/// ```rust
/// use sql_paging_dao::impl_record;
///
/// #[derive(Debug, Default)]
/// struct Employee {
///     id: i64,
///     full_name: String,
///     salary: Option<f64>,
/// }
///
/// impl_record!(Employee { id, full_name => "NAME", salary });
/// ```
#[macro_export]
macro_rules! impl_record {
    (@column $field:ident) => {
        stringify!($field)
    };
    (@column $field:ident $column:literal) => {
        $column
    };
    ($ty:ty { $($field:ident $(=> $column:literal)?),* $(,)? }) => {
        impl $crate::mapper::Record for $ty {
            fn instantiate() -> ::std::result::Result<Self, $crate::SqlDaoError> {
                ::std::result::Result::Ok(<$ty as ::std::default::Default>::default())
            }

            fn field_table() -> &'static $crate::mapper::FieldTable<Self> {
                static TABLE: ::std::sync::LazyLock<$crate::mapper::FieldTable<$ty>> =
                    ::std::sync::LazyLock::new(|| {
                        $crate::mapper::FieldTable::new(vec![
                            $(
                                $crate::mapper::FieldSetter::<$ty>::field(
                                    stringify!($field),
                                    $crate::impl_record!(@column $field $($column)?),
                                    |record: &mut $ty| &mut record.$field,
                                ),
                            )*
                        ])
                    });
                &TABLE
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Account {
        id: i64,
        owner: String,
        balance: Option<f64>,
    }

    crate::impl_record!(Account { id, owner => "OWNER_NAME", balance });

    #[test]
    fn table_lists_fields_by_upper_cased_column() {
        let table = Account::field_table();
        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup("id").unwrap().name(), "id");
        assert_eq!(table.lookup("Owner_Name").unwrap().name(), "owner");
        assert!(table.lookup("owner").is_none());
        assert_eq!(table.lookup("BALANCE").unwrap().target(), TargetType::Double);
    }

    #[test]
    fn setters_write_through_to_the_field() {
        let table = Account::field_table();
        let mut account = Account::instantiate().unwrap();
        table.lookup("ID").unwrap().assign(&mut account, SqlValue::Int(7)).unwrap();
        table
            .lookup("OWNER_NAME")
            .unwrap()
            .assign(&mut account, SqlValue::Text("ada".into()))
            .unwrap();
        table
            .lookup("BALANCE")
            .unwrap()
            .assign(&mut account, SqlValue::Float(1.5))
            .unwrap();
        assert_eq!(
            account,
            Account {
                id: 7,
                owner: "ada".into(),
                balance: Some(1.5)
            }
        );

        let err = table
            .lookup("ID")
            .unwrap()
            .assign(&mut account, SqlValue::Text("x".into()))
            .unwrap_err();
        assert!(matches!(err, SqlDaoError::ConversionError(_)));
    }
}
