// Parameter model - positional and named bindings
//
// - value: a single bound value with an optional wire type
// - indexed: positional parameters (`?`)
// - named: named parameters (`:name`)
//
// `Parameter` is the closed sum of the two. The exports that only make sense
// for one variant are checked here and nowhere else.

mod indexed;
mod named;
mod value;

use std::fmt;

use indexmap::IndexMap;

use crate::error::SqlDaoError;
use crate::types::SqlValue;

pub use indexed::IndexedParams;
pub use named::NamedParams;
pub use value::ParameterValue;

/// Parameters for one logical query.
///
/// A query keeps the same variant through rewriting and execution; the
/// pagination rewriter appends its window values in the variant's own style.
/// ```rust
/// use sql_paging_dao::prelude::*;
///
/// let mut params = Parameter::named();
/// params.as_named_mut()?.add("P1", 5);
/// assert_eq!(params.to_named_map()?.get("P1"), Some(&SqlValue::Int(5)));
/// assert!(params.to_positional_array().is_err());
/// # Ok::<(), SqlDaoError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    Indexed(IndexedParams),
    Named(NamedParams),
}

impl Default for Parameter {
    fn default() -> Self {
        Parameter::Indexed(IndexedParams::new())
    }
}

impl From<IndexedParams> for Parameter {
    fn from(params: IndexedParams) -> Self {
        Parameter::Indexed(params)
    }
}

impl From<NamedParams> for Parameter {
    fn from(params: NamedParams) -> Self {
        Parameter::Named(params)
    }
}

impl Parameter {
    #[must_use]
    pub fn indexed() -> Self {
        Parameter::Indexed(IndexedParams::new())
    }

    #[must_use]
    pub fn named() -> Self {
        Parameter::Named(NamedParams::new())
    }

    #[must_use]
    pub fn is_named(&self) -> bool {
        matches!(self, Parameter::Named(_))
    }

    #[must_use]
    pub fn variant_name(&self) -> &'static str {
        match self {
            Parameter::Indexed(_) => "indexed",
            Parameter::Named(_) => "named",
        }
    }

    pub fn clear(&mut self) {
        match self {
            Parameter::Indexed(p) => p.clear(),
            Parameter::Named(p) => p.clear(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Parameter::Indexed(p) => p.len(),
            Parameter::Named(p) => p.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the positional variant for appending.
    ///
    /// # Errors
    /// Returns `SqlDaoError::VariantMismatch` on named parameters.
    pub fn as_indexed_mut(&mut self) -> Result<&mut IndexedParams, SqlDaoError> {
        match self {
            Parameter::Indexed(p) => Ok(p),
            Parameter::Named(_) => Err(SqlDaoError::VariantMismatch {
                operation: "positional access",
                actual: "named",
            }),
        }
    }

    /// Borrow the named variant for appending.
    ///
    /// # Errors
    /// Returns `SqlDaoError::VariantMismatch` on positional parameters.
    pub fn as_named_mut(&mut self) -> Result<&mut NamedParams, SqlDaoError> {
        match self {
            Parameter::Named(p) => Ok(p),
            Parameter::Indexed(_) => Err(SqlDaoError::VariantMismatch {
                operation: "named access",
                actual: "indexed",
            }),
        }
    }

    /// Values in binding order for `?` placeholders.
    ///
    /// # Errors
    /// Returns `SqlDaoError::VariantMismatch` on named parameters.
    pub fn to_positional_array(&self) -> Result<Vec<SqlValue>, SqlDaoError> {
        match self {
            Parameter::Indexed(p) => Ok(p.to_array()),
            Parameter::Named(_) => Err(self.mismatch("to_positional_array")),
        }
    }

    /// Values keyed by parameter name.
    ///
    /// # Errors
    /// Returns `SqlDaoError::VariantMismatch` on positional parameters.
    pub fn to_named_map(&self) -> Result<IndexMap<String, SqlValue>, SqlDaoError> {
        match self {
            Parameter::Named(p) => Ok(p.to_map()),
            Parameter::Indexed(_) => Err(self.mismatch("to_named_map")),
        }
    }

    /// Name/value/wire-type triples for a backend's named binding API.
    ///
    /// # Errors
    /// Returns `SqlDaoError::VariantMismatch` on positional parameters.
    pub fn to_param_source(&self) -> Result<ParamSource, SqlDaoError> {
        match self {
            Parameter::Named(p) => Ok(ParamSource {
                entries: p
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.clone()))
                    .collect(),
            }),
            Parameter::Indexed(_) => Err(self.mismatch("to_param_source")),
        }
    }

    fn mismatch(&self, operation: &'static str) -> SqlDaoError {
        SqlDaoError::VariantMismatch {
            operation,
            actual: self.variant_name(),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::Indexed(p) => {
                write!(f, "[")?;
                for (i, value) in p.values().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            Parameter::Named(p) => {
                write!(f, "{{")?;
                for (i, (name, value)) in p.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}={value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Named bindings with their wire types, ready for a backend to bind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSource {
    entries: Vec<(String, ParameterValue)>,
}

impl ParamSource {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}
