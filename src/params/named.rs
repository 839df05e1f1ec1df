use indexmap::IndexMap;

use crate::types::{SqlType, SqlValue};

use super::ParameterValue;

/// Named parameters, bound by name to `:name` placeholders.
///
/// Insertion order is kept so logs list parameters deterministically. Adding
/// an existing name replaces its value and keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedParams {
    values: IndexMap<String, ParameterValue>,
}

impl NamedParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: IndexMap::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> &mut Self {
        self.values.insert(name.into(), ParameterValue::new(value));
        self
    }

    pub fn add_typed(
        &mut self,
        name: impl Into<String>,
        value: impl Into<SqlValue>,
        wire_type: SqlType,
    ) -> &mut Self {
        self.values
            .insert(name.into(), ParameterValue::typed(value, wire_type));
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
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Bare values keyed by name; wire types are dropped.
    #[must_use]
    pub fn to_map(&self) -> IndexMap<String, SqlValue> {
        self.values
            .iter()
            .map(|(name, p)| (name.clone(), p.value().clone()))
            .collect()
    }
}
