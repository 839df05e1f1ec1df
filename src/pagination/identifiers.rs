use std::sync::LazyLock;

use regex::Regex;

use crate::error::SqlDaoError;

// Plain or qualified identifier, or a 1-based select-list position.
const TERM: &str = r"(?:[A-Za-z_][A-Za-z0-9_$#]*(?:\.[A-Za-z_][A-Za-z0-9_$#]*)*|[0-9]+)";

static SORT_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{TERM}$")).expect("sort column pattern is valid")
});

static ORDER_BY: LazyLock<Regex> = LazyLock::new(|| {
    let item = format!(r"{TERM}(?:\s+(?:ASC|DESC))?(?:\s+NULLS\s+(?:FIRST|LAST))?");
    Regex::new(&format!(r"(?i)^\s*{item}(?:\s*,\s*{item})*\s*$"))
        .expect("order by pattern is valid")
});

/// Check that a sort key is a bare column reference before it is spliced into
/// SQL text.
///
/// # Errors
/// Returns `SqlDaoError::InvalidIdentifier` otherwise.
pub fn validate_sort_column(column: &str) -> Result<(), SqlDaoError> {
    if SORT_COLUMN.is_match(column) {
        Ok(())
    } else {
        Err(SqlDaoError::InvalidIdentifier(column.to_string()))
    }
}

/// Check that a fallback ORDER BY text is a list of columns with optional
/// directions.
///
/// # Errors
/// Returns `SqlDaoError::InvalidIdentifier` otherwise.
pub fn validate_order_by(order_by: &str) -> Result<(), SqlDaoError> {
    if ORDER_BY.is_match(order_by) {
        Ok(())
    } else {
        Err(SqlDaoError::InvalidIdentifier(order_by.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_qualified_columns() {
        for ok in ["ID", "tb.full_name", "_x1", "2", "CODE$#"] {
            assert!(validate_sort_column(ok).is_ok(), "{ok}");
        }
        for bad in ["", "ID DESC", "a;b", "1x", "name'--", "a.", "(SELECT 1)"] {
            assert!(validate_sort_column(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn accepts_column_lists_with_directions() {
        for ok in ["ID", "NAME desc, ID", "a.b ASC NULLS LAST,  2"] {
            assert!(validate_order_by(ok).is_ok(), "{ok}");
        }
        for bad in ["ID,", "ID DESC DESC", "ID; DELETE FROM T", "ID /* x */"] {
            assert!(validate_order_by(bad).is_err(), "{bad}");
        }
    }
}
