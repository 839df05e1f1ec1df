use std::fmt;

use crate::types::{SqlType, SqlValue};

/// A single bound value plus an optional wire type.
///
/// The wire type is advisory: when it is absent the backend infers the binding
/// type from the value itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterValue {
    value: SqlValue,
    wire_type: Option<SqlType>,
}

impl ParameterValue {
    #[must_use]
    pub fn new(value: impl Into<SqlValue>) -> Self {
        Self {
            value: value.into(),
            wire_type: None,
        }
    }

    #[must_use]
    pub fn typed(value: impl Into<SqlValue>, wire_type: SqlType) -> Self {
        Self {
            value: value.into(),
            wire_type: Some(wire_type),
        }
    }

    #[must_use]
    pub fn value(&self) -> &SqlValue {
        &self.value
    }

    #[must_use]
    pub fn into_value(self) -> SqlValue {
        self.value
    }

    #[must_use]
    pub fn wire_type(&self) -> Option<SqlType> {
        self.wire_type
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(self.value, SqlValue::List(_))
    }

    /// Items of a collection value, or an empty slice for scalars.
    #[must_use]
    pub fn collection(&self) -> &[SqlValue] {
        match &self.value {
            SqlValue::List(items) => items,
            _ => &[],
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.wire_type {
            Some(ty) => write!(f, "{} ({ty:?})", self.value),
            None => write!(f, "{}", self.value),
        }
    }
}
