//! SQL literal formatting for dynamic values
//!
//! `quote_literal` is the only place quoted text is produced. Timestamps,
//! dates and JSON are serialized first and escaped afterwards. Timestamps keep
//! every fractional digit they carry.

use chrono::SecondsFormat;

use crate::types::DynamicValue;

/// Convert a dynamic value into SQL literal text
///
/// | value             | literal                              |
/// |-------------------|--------------------------------------|
/// | `Null`            | `NULL`                               |
/// | `Integer`/`Float` | decimal text (non-finite → `NULL`)   |
/// | `Bool`            | `TRUE` / `FALSE`                     |
/// | `Timestamp`       | `'2024-01-01T00:00:00.123456Z'`      |
/// | `Date`            | `'2024-01-01'`                       |
/// | `Json`            | `'{"a":1}'`                          |
/// | `Text`            | `'it''s'`                            |
/// | `List`            | `('a', 'b')`, empty → `(NULL)`       |
///
/// # Example
/// ```
/// use safe_query_store::sql::format_value;
/// use safe_query_store::DynamicValue;
///
/// let literal = format_value(&DynamicValue::from("a'; DROP TABLE users; --"));
/// assert_eq!(literal, "'a''; DROP TABLE users; --'");
/// ```
pub fn format_value(value: &DynamicValue) -> String {
    match value {
        DynamicValue::Null => "NULL".to_string(),
        DynamicValue::Integer(n) => n.to_string(),
        DynamicValue::Float(n) => format_float(*n),
        DynamicValue::Bool(true) => "TRUE".to_string(),
        DynamicValue::Bool(false) => "FALSE".to_string(),
        DynamicValue::Timestamp(ts) => quote_literal(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        DynamicValue::Date(date) => quote_literal(&date.format("%Y-%m-%d").to_string()),
        DynamicValue::Json(json) => quote_literal(&json.to_string()),
        DynamicValue::Text(s) => quote_literal(s),
        DynamicValue::List(values) => format_list(values),
    }
}

/// Wrap text in single quotes, doubling every embedded single quote
pub fn quote_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        if ch == '\'' {
            out.push_str("''");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}

/// Escape LIKE wildcards so `text` matches literally inside a pattern
///
/// The result still has to go through [`format_value`]; this only neutralizes
/// `%`, `_` and the default escape character `\`.
pub fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

// f64 Display never uses exponent notation, so the output parses as a
// plain numeric literal.
fn format_float(n: f64) -> String {
    if n.is_finite() {
        n.to_string()
    } else {
        "NULL".to_string()
    }
}

fn format_list(values: &[DynamicValue]) -> String {
    if values.is_empty() {
        return "(NULL)".to_string();
    }
    let items: Vec<String> = values.iter().map(format_value).collect();
    format!("({})", items.join(", "))
}
