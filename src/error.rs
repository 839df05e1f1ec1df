use thiserror::Error;

#[cfg(feature = "sqlite")]
use rusqlite;

#[derive(Debug, Error)]
pub enum SqlDaoError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter error: {0}")]
    ParameterError(String),

    /// A positional-only or named-only export was called on the other variant.
    #[error("{operation} is not supported by {actual} parameters")]
    VariantMismatch {
        operation: &'static str,
        actual: &'static str,
    },

    #[error("Value conversion error: {0}")]
    ConversionError(String),

    #[error("Invalid SQL identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Incorrect result size: expected {expected}, actual {actual}")]
    IncorrectResultSize { expected: usize, actual: usize },

    #[error("Incorrect column count: expected {expected}, actual {actual}")]
    IncorrectColumnCount { expected: usize, actual: usize },

    #[error("Record instantiation failed: {0}")]
    InstantiationError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),

    #[error("Other database error: {0}")]
    Other(String),
}

impl SqlDaoError {
    pub(crate) fn conversion(message: impl Into<String>) -> Self {
        SqlDaoError::ConversionError(message.into())
    }
}
