use serde::{Deserialize, Serialize};

/// Date and time formats used when a temporal field is filled from text, or a
/// text field from a temporal value.
///
/// Formats are chrono `strftime` patterns; lists are tried in order and the
/// first entry is used when rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateFormats {
    pub date: Vec<String>,
    pub date_time: Vec<String>,
    pub time: Vec<String>,
}

impl Default for DateFormats {
    fn default() -> Self {
        Self {
            date: vec!["%Y-%m-%d".into()],
            date_time: vec![
                "%Y-%m-%dT%H:%M:%S%.f".into(),
                "%Y-%m-%d %H:%M:%S%.f".into(),
            ],
            time: vec!["%H:%M:%S%.f".into(), "%H:%M".into()],
        }
    }
}

impl DateFormats {
    /// Replace the date-time formats with a single pattern.
    #[must_use]
    pub fn with_date_time(mut self, pattern: impl Into<String>) -> Self {
        self.date_time = vec![pattern.into()];
        self
    }

    #[must_use]
    pub fn with_date(mut self, pattern: impl Into<String>) -> Self {
        self.date = vec![pattern.into()];
        self
    }

    #[must_use]
    pub fn with_time(mut self, pattern: impl Into<String>) -> Self {
        self.time = vec![pattern.into()];
        self
    }
}

/// Options for a DAO instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaoOptions {
    pub date_formats: DateFormats,
    /// Log each statement, its parameters and target type at debug level.
    pub log_statements: bool,
}

impl Default for DaoOptions {
    fn default() -> Self {
        Self {
            date_formats: DateFormats::default(),
            log_statements: true,
        }
    }
}

impl DaoOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_date_formats(mut self, date_formats: DateFormats) -> Self {
        self.date_formats = date_formats;
        self
    }

    #[must_use]
    pub fn with_statement_logging(mut self, log_statements: bool) -> Self {
        self.log_statements = log_statements;
        self
    }
}
