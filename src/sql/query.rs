//! SELECT statement assembly
//!
//! Composes the validated table, the projection and the clause builders into
//! one statement: `SELECT <cols> FROM "<table>" [WHERE ..] [ORDER BY ..] [LIMIT .. OFFSET ..]`.

use crate::error::{QueryError, Result};
use crate::sql::condition::{build_order_by, build_predicates, build_where};
use crate::sql::sanitize::{is_valid_identifier, quote_identifier, quoted_identifier};
use crate::types::{Column, QueryOptions};

/// Build a complete SELECT statement
///
/// Fails when the table name is invalid, when the ORDER BY column or an
/// aggregate alias is invalid, or when columns were requested and every one
/// of them was rejected. Invalid filter conditions and plain column names are
/// dropped. The same options always produce the same string.
///
/// # Example
/// ```
/// use safe_query_store::sql::{build_query, Pagination};
/// use safe_query_store::{Condition, QueryOptions, SortDirection};
///
/// let options = QueryOptions::new("SecurityLog")
///     .with_condition(Condition::eq("userId", "u1"))
///     .with_order_by("createdAt", SortDirection::Desc)
///     .with_pagination(Pagination::new(Some(10), Some(0)));
///
/// assert_eq!(
///     build_query(&options).unwrap(),
///     "SELECT * FROM \"SecurityLog\" WHERE \"userId\" = 'u1' ORDER BY \"createdAt\" DESC LIMIT 10 OFFSET 0"
/// );
/// ```
pub fn build_query(options: &QueryOptions) -> Result<String> {
    let table = quoted_identifier(&options.table, "table")?;
    let projection = build_projection(&options.columns)?;

    let mut parts = vec![format!("SELECT {} FROM {}", projection, table)];

    let where_clause = build_where(&options.conditions);
    if !where_clause.is_empty() {
        parts.push(where_clause);
    }

    if let Some(order_by) = &options.order_by {
        parts.push(build_order_by(&order_by.column, order_by.direction)?);
    }

    if let Some(pagination) = &options.pagination {
        parts.push(pagination.to_sql());
    }

    Ok(parts.join(" "))
}

/// Render the SELECT list
///
/// No requested columns means `*`. Requested columns that all fail validation
/// are an error rather than a silent widening to `*`.
fn build_projection(columns: &[Column]) -> Result<String> {
    if columns.is_empty() {
        return Ok("*".to_string());
    }

    let mut rendered = Vec::with_capacity(columns.len());
    for column in columns {
        if let Some(sql) = render_column(column)? {
            rendered.push(sql);
        }
    }

    if rendered.is_empty() {
        return Err(QueryError::empty_projection(format!(
            "None of the {} requested columns is a valid identifier",
            columns.len()
        )));
    }

    Ok(rendered.join(", "))
}

fn render_column(column: &Column) -> Result<Option<String>> {
    match column {
        Column::Name(name) if name == "*" => Ok(Some("*".to_string())),
        Column::Name(name) => {
            if is_valid_identifier(name) {
                Ok(Some(quote_identifier(name)))
            } else {
                tracing::warn!(column = %name, "Dropping invalid column from projection");
                Ok(None)
            }
        }
        Column::Trusted(expression) => Ok(Some((*expression).to_string())),
        Column::CountAll { alias } => {
            let alias = quoted_identifier(alias, "alias")?;
            Ok(Some(format!("COUNT(*) AS {}", alias)))
        }
        Column::CountFiltered { alias, conditions } => {
            let alias = quoted_identifier(alias, "alias")?;
            if conditions.is_empty() {
                return Ok(Some(format!("COUNT(*) AS {}", alias)));
            }
            let predicates = build_predicates(conditions);
            // Every filter was rejected: count nothing rather than everything
            let predicates = if predicates.is_empty() {
                "FALSE".to_string()
            } else {
                predicates
            };
            Ok(Some(format!(
                "COUNT(*) FILTER (WHERE {}) AS {}",
                predicates, alias
            )))
        }
    }
}
