// SQLite module - the rusqlite execution backend
//
// - config: connection options and their builder
// - params: binding positional and named parameters onto statements
// - query: column metadata and typed value extraction
// - executor: the SqlExecutor implementation

pub mod config;
pub mod executor;
pub mod params;
pub mod query;

// Re-export the public API
pub use config::{SqliteOptions, SqliteOptionsBuilder};
pub use executor::SqliteExecutor;
pub use params::{bind_parameters, to_sqlite_value};
pub use query::{SqliteRow, extract_value, statement_columns};
