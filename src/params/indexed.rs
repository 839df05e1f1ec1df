use crate::types::{SqlType, SqlValue};

use super::ParameterValue;

/// Positional parameters, bound in order to `?` placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedParams {
    values: Vec<ParameterValue>,
}

impl IndexedParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, value: impl Into<SqlValue>) -> &mut Self {
        self.values.push(ParameterValue::new(value));
        self
    }

    pub fn add_typed(&mut self, value: impl Into<SqlValue>, wire_type: SqlType) -> &mut Self {
        self.values.push(ParameterValue::typed(value, wire_type));
        self
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn values(&self) -> &[ParameterValue] {
        &self.values
    }

    /// Bare values in binding order; wire types are dropped.
    #[must_use]
    pub fn to_array(&self) -> Vec<SqlValue> {
        self.values.iter().map(|p| p.value().clone()).collect()
    }
}

impl<V: Into<SqlValue>> FromIterator<V> for IndexedParams {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(ParameterValue::new).collect(),
        }
    }
}
