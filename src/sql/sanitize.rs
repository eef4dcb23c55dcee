//! SQL Identifier Sanitization Utilities
//!
//! Identifiers are never escaped into shape: a name either matches the
//! allowlist pattern and is emitted double-quoted, or it is rejected.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{QueryError, Result};

static IDENTIFIER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is a valid regex")
});

/// Check whether a table or column name is safe to embed in SQL
///
/// A valid identifier starts with an ASCII letter or underscore followed by
/// ASCII letters, digits, or underscores. Case is preserved and there is no
/// length limit beyond the pattern.
///
/// # Example
/// ```
/// use safe_query_store::sql::is_valid_identifier;
///
/// assert!(is_valid_identifier("SecurityLog"));
/// assert!(is_valid_identifier("user_id"));
/// assert!(!is_valid_identifier("users; DROP TABLE x"));
/// ```
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER_PATTERN.is_match(name)
}

/// Validate a developer-controlled identifier, raising on failure
///
/// `kind` names the role of the identifier in the error message
/// (e.g. "table", "sort column").
pub fn validate_identifier(name: &str, kind: &str) -> Result<()> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(QueryError::invalid_identifier(format!(
            "Invalid {} name: '{}'. Must match [A-Za-z_][A-Za-z0-9_]*.",
            kind, name
        )))
    }
}

/// Wrap an identifier in double quotes
///
/// Callers pass only names that already passed [`is_valid_identifier`], so
/// the result never contains an embedded quote.
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier)
}

/// Validate and quote in one step
pub fn quoted_identifier(name: &str, kind: &str) -> Result<String> {
    validate_identifier(name, kind)?;
    Ok(quote_identifier(name))
}
