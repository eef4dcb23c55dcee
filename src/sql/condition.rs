//! Condition building for SQL WHERE and ORDER BY clauses
//!
//! Filter conditions come from callers and are handled fail-closed: a
//! condition with a rejected column, operator or operand is dropped and the
//! query runs without it. Sort columns come from code and raise instead.

use crate::error::Result;
use crate::sql::sanitize::{is_valid_identifier, quote_identifier, quoted_identifier};
use crate::sql::value::format_value;
use crate::types::{Condition, DynamicValue, Operator, SortDirection};

/// Build a WHERE clause from a list of conditions
///
/// Surviving conditions are rendered as `"<column>" <operator> <literal>`,
/// kept in input order and joined with `AND`. Returns an empty string when
/// nothing survives, so the caller omits the keyword entirely.
///
/// # Example
/// ```
/// use safe_query_store::sql::build_where;
/// use safe_query_store::Condition;
///
/// let clause = build_where(&[Condition::eq("userId", "abc")]);
/// assert_eq!(clause, "WHERE \"userId\" = 'abc'");
/// assert_eq!(build_where(&[]), "");
/// ```
pub fn build_where(conditions: &[Condition]) -> String {
    let predicates = build_predicates(conditions);
    if predicates.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", predicates)
    }
}

/// Render the surviving conditions joined with `AND`, without a keyword
pub fn build_predicates(conditions: &[Condition]) -> String {
    conditions
        .iter()
        .filter_map(render_condition)
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Render one condition, or `None` if any part of it is rejected
fn render_condition(condition: &Condition) -> Option<String> {
    if !is_valid_identifier(&condition.column) {
        tracing::warn!(
            column = %condition.column,
            "Dropping filter condition with invalid column name"
        );
        return None;
    }

    let Some(operator) = Operator::parse(&condition.operator) else {
        tracing::warn!(
            column = %condition.column,
            operator = %condition.operator,
            "Dropping filter condition with disallowed operator"
        );
        return None;
    };

    let Some(operand) = render_operand(operator, &condition.value) else {
        tracing::warn!(
            column = %condition.column,
            operator = %operator,
            "Dropping filter condition with unsupported operand"
        );
        return None;
    };

    Some(format!(
        "{} {} {}",
        quote_identifier(&condition.column),
        operator.as_sql(),
        operand
    ))
}

/// Format the right-hand side for an operator
///
/// - `IN` needs a list (JSON arrays count)
/// - `IS` / `IS NOT` accept only NULL or a boolean
/// - `LIKE` / `ILIKE` accept only text patterns
/// - every other operator takes a single scalar or JSON value
fn render_operand(operator: Operator, value: &DynamicValue) -> Option<String> {
    match operator {
        Operator::In => value
            .as_list()
            .map(|items| format_value(&DynamicValue::List(items))),
        Operator::Is | Operator::IsNot => match value {
            DynamicValue::Null | DynamicValue::Bool(_) => Some(format_value(value)),
            _ => None,
        },
        Operator::Like | Operator::ILike => match value {
            DynamicValue::Text(_) => Some(format_value(value)),
            _ => None,
        },
        _ => match value {
            DynamicValue::List(_) => None,
            _ => Some(format_value(value)),
        },
    }
}

/// Build an ORDER BY clause for a single column
///
/// The column is developer-controlled, so an invalid name is an error rather
/// than a silently ignored sort.
pub fn build_order_by(column: &str, direction: SortDirection) -> Result<String> {
    let column = quoted_identifier(column, "sort column")?;
    Ok(format!("ORDER BY {} {}", column, direction.as_sql()))
}
