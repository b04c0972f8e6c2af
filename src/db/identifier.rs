//! SQL identifier handling.
//!
//! Table and column names cannot be bound as parameters, so every name that
//! ends up in SQL text goes through [`quote_ident`]. Names we generate
//! ourselves are additionally held to an ASCII allow-list.

use crate::error::{ProcessingError, Result};

/// Wrap an identifier in double quotes, doubling any embedded quote.
pub fn quote_ident(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        if c == '"' {
            quoted.push('"');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Accept only non-empty `[a-z0-9_]` names for tables this crate creates or reads.
pub fn validate_table_name(name: &str) -> Result<&str> {
    let allowed = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');

    if allowed {
        Ok(name)
    } else {
        Err(ProcessingError::InvalidIdentifier(name.to_string()))
    }
}

/// Header-derived column names keep their text (any Unicode), but must be
/// non-empty and free of NUL characters.
pub fn validate_column_name(name: &str) -> Result<&str> {
    if name.is_empty() || name.contains('\0') {
        Err(ProcessingError::InvalidIdentifier(name.to_string()))
    } else {
        Ok(name)
    }
}

/// Validate and quote a column name in one step
pub fn quoted_column(name: &str) -> Result<String> {
    validate_column_name(name).map(quote_ident)
}

/// Validate and quote a table name in one step
pub fn quoted_table(name: &str) -> Result<String> {
    validate_table_name(name).map(quote_ident)
}
