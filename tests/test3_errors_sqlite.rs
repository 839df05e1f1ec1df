#![cfg(feature = "sqlite")]

use sql_paging_dao::impl_record;
use sql_paging_dao::prelude::*;

#[derive(Debug, Default)]
struct Row {
    id: i64,
    amount: i16,
}

impl_record!(Row { id, amount });

fn dao() -> Result<Dao<SqliteExecutor>, SqlDaoError> {
    let exec = SqliteExecutor::in_memory()?;
    exec.execute_batch(
        "CREATE TABLE ledger (id INTEGER PRIMARY KEY, amount INTEGER);
         INSERT INTO ledger VALUES (1, 10), (2, 70000), (3, 30);",
    )?;
    Ok(Dao::builder()
        .executor(exec)
        .statement_logging(false)
        .build_detecting_dialect()?)
}

#[test]
fn builder_rejects_missing_pieces() {
    let no_executor = Dao::<SqliteExecutor>::builder()
        .dialect(Dialect::LimitOffset)
        .build();
    assert!(matches!(no_executor, Err(SqlDaoError::ConfigError(_))));

    let no_dialect = SqliteExecutor::in_memory()
        .map(|exec| Dao::builder().executor(exec).build());
    assert!(matches!(no_dialect, Ok(Err(SqlDaoError::ConfigError(_)))));
}

#[test]
fn dialect_is_detected_from_the_driver() -> Result<(), SqlDaoError> {
    let dao = dao()?;
    assert_eq!(*dao.dialect(), Dialect::LimitOffset);
    assert!(!dao.options().log_statements);
    Ok(())
}

#[test]
fn database_errors_propagate_unchanged() -> Result<(), SqlDaoError> {
    let dao = dao()?;
    let err = dao
        .query_to_list::<Row>("SELECT * FROM no_such_table", &Parameter::default())
        .unwrap_err();
    assert!(matches!(err, SqlDaoError::SqliteError(_)));

    let err = dao
        .execute("INSERT INTO ledger VALUES (1, 0)", &Parameter::default())
        .unwrap_err();
    assert!(matches!(err, SqlDaoError::SqliteError(_)));
    Ok(())
}

#[test]
fn named_placeholders_without_values_fail() -> Result<(), SqlDaoError> {
    let dao = dao()?;
    let mut params = Parameter::named();
    params.as_named_mut()?.add("id", 1);
    let err = dao
        .query_to_list::<Row>("SELECT id, amount FROM ledger WHERE id = :ID", &params)
        .unwrap_err();
    assert!(matches!(err, SqlDaoError::ParameterError(_)));
    Ok(())
}

#[test]
fn conversion_failures_abort_the_fetch() -> Result<(), SqlDaoError> {
    let dao = dao()?;
    // 70000 does not fit the i16 field.
    let err = dao
        .query_to_list::<Row>("SELECT id, amount FROM ledger ORDER BY id", &Parameter::default())
        .unwrap_err();
    assert!(matches!(err, SqlDaoError::ConversionError(_)));

    let ok: Vec<Row> = dao.query_to_list(
        "SELECT id, amount FROM ledger WHERE id <> 2 ORDER BY id",
        &Parameter::default(),
    )?;
    let pairs: Vec<(i64, i16)> = ok.iter().map(|r| (r.id, r.amount)).collect();
    assert_eq!(pairs, vec![(1, 10), (3, 30)]);
    Ok(())
}

#[test]
fn result_shape_errors() -> Result<(), SqlDaoError> {
    let dao = dao()?;
    let err = dao
        .query_to_bean::<Row>("SELECT id, amount FROM ledger", &Parameter::default())
        .unwrap_err();
    assert!(matches!(
        err,
        SqlDaoError::IncorrectResultSize {
            expected: 1,
            actual: 3
        }
    ));

    let err = dao
        .query_to_object::<i64>("SELECT id, amount FROM ledger WHERE id = 1", &Parameter::default())
        .unwrap_err();
    assert!(matches!(err, SqlDaoError::IncorrectColumnCount { .. }));
    Ok(())
}

#[test]
fn parameter_variants_are_not_interchangeable() {
    let mut named = Parameter::named();
    assert!(named.as_named_mut().is_ok());
    assert!(matches!(
        named.to_positional_array(),
        Err(SqlDaoError::VariantMismatch { .. })
    ));
    assert!(matches!(
        Parameter::indexed().to_named_map(),
        Err(SqlDaoError::VariantMismatch { .. })
    ));
    assert!(matches!(
        named.as_indexed_mut(),
        Err(SqlDaoError::VariantMismatch { .. })
    ));
}

#[test]
fn unsafe_sort_keys_are_refused_before_execution() -> Result<(), SqlDaoError> {
    let dao = dao()?;
    let criteria = Criteria::paged(1, 10).with_sort("id; DROP TABLE ledger", SortDirection::Asc);
    let err = dao
        .query_with_paging::<Row>("SELECT id, amount FROM ledger", &mut Parameter::indexed(), &criteria)
        .unwrap_err();
    assert!(matches!(err, SqlDaoError::InvalidIdentifier(_)));
    assert_eq!(dao.count_for_paging("SELECT id FROM ledger", &Parameter::default())?, 3);
    Ok(())
}
