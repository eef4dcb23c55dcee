//! Core type definitions for query construction
//!
//! Includes dynamic values, operators, conditions, projection columns and the
//! `QueryOptions` request consumed by the query assembler.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QueryError;
use crate::sql::pagination::Pagination;

// ============================================================================
// Dynamic Values
// ============================================================================

/// A runtime value destined for a WHERE predicate.
///
/// The variant, not the caller's intent, decides how the value is serialized
/// into SQL. Every variant ends up as a keyword, a number, or an escaped
/// string literal; there is no pass-through variant.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum DynamicValue {
    /// Renders as `NULL`
    #[default]
    Null,
    Integer(i64),
    /// Non-finite values render as `NULL`
    Float(f64),
    /// Renders as `TRUE` / `FALSE`
    Bool(bool),
    /// ISO-8601 text, escaped as a string literal
    Timestamp(DateTime<Utc>),
    /// `YYYY-MM-DD` text, escaped as a string literal
    Date(NaiveDate),
    /// Structured data, serialized to JSON text then escaped
    Json(serde_json::Value),
    Text(String),
    /// Set membership operand for `IN`
    List(Vec<DynamicValue>),
}

impl DynamicValue {
    /// Fallback for arbitrary types: stringify, then escape as text.
    pub fn display(value: impl fmt::Display) -> Self {
        DynamicValue::Text(value.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DynamicValue::Null)
    }

    /// Elements usable as an `IN (...)` operand. JSON arrays count as lists.
    pub fn as_list(&self) -> Option<Vec<DynamicValue>> {
        match self {
            DynamicValue::List(values) => Some(values.clone()),
            DynamicValue::Json(serde_json::Value::Array(items)) => {
                Some(items.iter().cloned().map(DynamicValue::from).collect())
            }
            _ => None,
        }
    }
}

impl From<serde_json::Value> for DynamicValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => DynamicValue::Null,
            serde_json::Value::Bool(b) => DynamicValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => DynamicValue::Integer(i),
                None => n.as_f64().map_or(DynamicValue::Null, DynamicValue::Float),
            },
            serde_json::Value::String(s) => DynamicValue::Text(s),
            other => DynamicValue::Json(other),
        }
    }
}

impl From<&str> for DynamicValue {
    fn from(value: &str) -> Self {
        DynamicValue::Text(value.to_string())
    }
}

impl From<String> for DynamicValue {
    fn from(value: String) -> Self {
        DynamicValue::Text(value)
    }
}

impl From<i64> for DynamicValue {
    fn from(value: i64) -> Self {
        DynamicValue::Integer(value)
    }
}

impl From<i32> for DynamicValue {
    fn from(value: i32) -> Self {
        DynamicValue::Integer(value.into())
    }
}

impl From<f64> for DynamicValue {
    fn from(value: f64) -> Self {
        DynamicValue::Float(value)
    }
}

impl From<bool> for DynamicValue {
    fn from(value: bool) -> Self {
        DynamicValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for DynamicValue {
    fn from(value: DateTime<Utc>) -> Self {
        DynamicValue::Timestamp(value)
    }
}

impl From<NaiveDate> for DynamicValue {
    fn from(value: NaiveDate) -> Self {
        DynamicValue::Date(value)
    }
}

impl From<uuid::Uuid> for DynamicValue {
    fn from(value: uuid::Uuid) -> Self {
        DynamicValue::display(value)
    }
}

impl<T: Into<DynamicValue>> From<Option<T>> for DynamicValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(DynamicValue::Null, Into::into)
    }
}

impl<T: Into<DynamicValue>> From<Vec<T>> for DynamicValue {
    fn from(values: Vec<T>) -> Self {
        DynamicValue::List(values.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// Operators
// ============================================================================

/// The closed set of comparison operators allowed in generated SQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    ILike,
    In,
    Is,
    IsNot,
}

impl Operator {
    pub const ALL: [Operator; 11] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::Like,
        Operator::ILike,
        Operator::In,
        Operator::Is,
        Operator::IsNot,
    ];

    /// SQL text for this operator
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "LIKE",
            Operator::ILike => "ILIKE",
            Operator::In => "IN",
            Operator::Is => "IS",
            Operator::IsNot => "IS NOT",
        }
    }

    /// Match untrusted operator text against the allowed set.
    ///
    /// Surrounding whitespace is ignored and keywords match case-insensitively.
    /// Anything else yields `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL
            .into_iter()
            .find(|op| op.as_sql().eq_ignore_ascii_case(text))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

// ============================================================================
// Conditions
// ============================================================================

/// One predicate of a WHERE clause.
///
/// `column` and `operator` are kept as the caller supplied them; the WHERE
/// builder validates both and drops the condition if either is rejected.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Condition {
    pub column: String,
    pub operator: String,
    #[serde(default)]
    pub value: DynamicValue,
}

impl Condition {
    /// Create a condition from a typed operator
    pub fn new(column: impl Into<String>, operator: Operator, value: impl Into<DynamicValue>) -> Self {
        Self {
            column: column.into(),
            operator: operator.as_sql().to_string(),
            value: value.into(),
        }
    }

    /// Create a condition from untrusted operator text
    pub fn raw(
        column: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<DynamicValue>,
    ) -> Self {
        Self {
            column: column.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<DynamicValue>) -> Self {
        Self::new(column, Operator::Eq, value)
    }

    pub fn gte(column: impl Into<String>, value: impl Into<DynamicValue>) -> Self {
        Self::new(column, Operator::Gte, value)
    }

    pub fn lte(column: impl Into<String>, value: impl Into<DynamicValue>) -> Self {
        Self::new(column, Operator::Lte, value)
    }

    pub fn is_in(column: impl Into<String>, values: impl Into<DynamicValue>) -> Self {
        Self::new(column, Operator::In, values)
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self::new(column, Operator::Is, DynamicValue::Null)
    }
}

// ============================================================================
// Sorting
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "asc")]
    Asc,
    #[serde(alias = "desc")]
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Desc)
        } else {
            Err(QueryError::validation(format!(
                "Invalid sort order: '{}'. Must be 'asc' or 'desc'.",
                s
            )))
        }
    }
}

/// Single-column ORDER BY request
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderBy {
    pub column: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }
}

// ============================================================================
// Projection
// ============================================================================

/// One entry of the SELECT list
///
/// Deserializes only from a plain string, which always becomes `Name`.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Plain column name; dropped if it is not a valid identifier
    Name(String),
    /// Developer-written SQL expression, emitted verbatim.
    ///
    /// Only `'static` strings are accepted so request data can never reach
    /// this channel.
    Trusted(&'static str),
    /// `COUNT(*) AS "alias"`
    CountAll { alias: String },
    /// `COUNT(*) FILTER (WHERE ...) AS "alias"`, predicates built like WHERE
    CountFiltered {
        alias: String,
        conditions: Vec<Condition>,
    },
}

impl Column {
    pub fn name(name: impl Into<String>) -> Self {
        Column::Name(name.into())
    }

    pub fn trusted(expression: &'static str) -> Self {
        Column::Trusted(expression)
    }

    pub fn count_all(alias: impl Into<String>) -> Self {
        Column::CountAll {
            alias: alias.into(),
        }
    }

    pub fn count_where(alias: impl Into<String>, conditions: Vec<Condition>) -> Self {
        Column::CountFiltered {
            alias: alias.into(),
            conditions,
        }
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Column::Name(name)
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Column::Name(name.to_string())
    }
}

impl<'de> Deserialize<'de> for Column {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Column::Name)
    }
}

// ============================================================================
// Query Options
// ============================================================================

/// Everything the query assembler needs to produce one SELECT statement
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    /// Target table; must be a valid identifier
    pub table: String,
    /// Projection; empty means `*`
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Predicates joined with AND
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub order_by: Option<OrderBy>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl QueryOptions {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            conditions: Vec::new(),
            order_by: None,
            pagination: None,
        }
    }

    pub fn with_columns<C: Into<Column>>(mut self, columns: impl IntoIterator<Item = C>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_column(mut self, column: impl Into<Column>) -> Self {
        self.columns.push(column.into());
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_conditions(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.conditions.extend(conditions);
        self
    }

    pub fn with_order_by(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some(OrderBy::new(column, direction));
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

// ============================================================================
// Paginated Results
// ============================================================================

/// One page of rows plus the total number of matching rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// `offset` is the effective (clamped) number of skipped rows
    pub fn new(data: Vec<T>, total: i64, offset: i64) -> Self {
        let seen = offset.saturating_add(data.len() as i64);
        Self {
            has_more: seen < total,
            data,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // =========================================================================
    // DynamicValue Conversion Tests
    // =========================================================================

    #[test]
    fn test_value_from_json_scalars() {
        assert_eq!(DynamicValue::from(serde_json::json!(null)), DynamicValue::Null);
        assert_eq!(DynamicValue::from(serde_json::json!(true)), DynamicValue::Bool(true));
        assert_eq!(DynamicValue::from(serde_json::json!(42)), DynamicValue::Integer(42));
        assert_eq!(DynamicValue::from(serde_json::json!(1.5)), DynamicValue::Float(1.5));
        assert_eq!(
            DynamicValue::from(serde_json::json!("abc")),
            DynamicValue::Text("abc".to_string())
        );
    }

    #[test]
    fn test_value_from_json_structures_stay_json() {
        let object = serde_json::json!({"a": 1});
        assert_eq!(DynamicValue::from(object.clone()), DynamicValue::Json(object));

        let array = serde_json::json!([1, 2]);
        assert_eq!(DynamicValue::from(array.clone()), DynamicValue::Json(array));
    }

    #[test]
    fn test_value_from_option() {
        assert_eq!(DynamicValue::from(None::<String>), DynamicValue::Null);
        assert_eq!(DynamicValue::from(Some(7i64)), DynamicValue::Integer(7));
    }

    #[test]
    fn test_value_from_rust_types() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(DynamicValue::from(ts), DynamicValue::Timestamp(ts));
        assert_eq!(DynamicValue::from(3i32), DynamicValue::Integer(3));
        assert_eq!(
            DynamicValue::from(vec!["a", "b"]),
            DynamicValue::List(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_value_display_fallback() {
        let ip = std::net::Ipv4Addr::new(10, 0, 0, 1);
        assert_eq!(DynamicValue::display(ip), DynamicValue::Text("10.0.0.1".to_string()));
    }

    #[test]
    fn test_value_as_list() {
        let list = DynamicValue::from(vec![1i64, 2]);
        assert_eq!(list.as_list().unwrap().len(), 2);

        let json_array = DynamicValue::from(serde_json::json!(["x", "y", "z"]));
        assert_eq!(
            json_array.as_list().unwrap(),
            vec![DynamicValue::from("x"), DynamicValue::from("y"), DynamicValue::from("z")]
        );

        assert!(DynamicValue::from("x").as_list().is_none());
        assert!(DynamicValue::from(serde_json::json!({"a": 1})).as_list().is_none());
    }

    #[test]
    fn test_value_deserialize() {
        let value: DynamicValue = serde_json::from_str("\"it's\"").unwrap();
        assert_eq!(value, DynamicValue::Text("it's".to_string()));
    }

    // =========================================================================
    // Operator Tests
    // =========================================================================

    #[test]
    fn test_operator_parse_allowed() {
        assert_eq!(Operator::parse("="), Some(Operator::Eq));
        assert_eq!(Operator::parse("!="), Some(Operator::Ne));
        assert_eq!(Operator::parse(">="), Some(Operator::Gte));
        assert_eq!(Operator::parse(" <= "), Some(Operator::Lte));
        assert_eq!(Operator::parse("like"), Some(Operator::Like));
        assert_eq!(Operator::parse("ILIKE"), Some(Operator::ILike));
        assert_eq!(Operator::parse("in"), Some(Operator::In));
        assert_eq!(Operator::parse("IS"), Some(Operator::Is));
        assert_eq!(Operator::parse("is not"), Some(Operator::IsNot));
    }

    #[test]
    fn test_operator_parse_rejects_everything_else() {
        assert_eq!(Operator::parse("; DROP"), None);
        assert_eq!(Operator::parse("= 1 OR 1 ="), None);
        assert_eq!(Operator::parse("=="), None);
        assert_eq!(Operator::parse("<>"), None);
        assert_eq!(Operator::parse(""), None);
        assert_eq!(Operator::parse("IS  NOT"), None);
        assert_eq!(Operator::parse("-- "), None);
    }

    #[test]
    fn test_operator_round_trips_through_text() {
        for op in Operator::ALL {
            assert_eq!(Operator::parse(op.as_sql()), Some(op));
        }
    }

    // =========================================================================
    // Condition Tests
    // =========================================================================

    #[test]
    fn test_condition_constructors() {
        let cond = Condition::eq("userId", "abc");
        assert_eq!(cond.column, "userId");
        assert_eq!(cond.operator, "=");
        assert_eq!(cond.value, DynamicValue::from("abc"));

        let cond = Condition::is_null("deletedAt");
        assert_eq!(cond.operator, "IS");
        assert!(cond.value.is_null());

        let cond = Condition::raw("userId", "; DROP", "x");
        assert_eq!(cond.operator, "; DROP");
    }

    #[test]
    fn test_condition_deserialize() {
        let cond: Condition =
            serde_json::from_str(r#"{"column": "userId", "operator": "=", "value": "u1"}"#)
                .unwrap();
        assert_eq!(cond, Condition::eq("userId", "u1"));

        let cond: Condition =
            serde_json::from_str(r#"{"column": "deletedAt", "operator": "IS"}"#).unwrap();
        assert!(cond.value.is_null());
    }

    // =========================================================================
    // SortDirection Tests
    // =========================================================================

    #[test]
    fn test_sort_direction_from_str() {
        assert_eq!("asc".parse::<SortDirection>().unwrap(), SortDirection::Asc);
        assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Desc);

        let err = "DESC; DROP TABLE x".parse::<SortDirection>().unwrap_err();
        assert!(err.to_string().contains("Invalid sort order"));
    }

    #[test]
    fn test_sort_direction_deserialize() {
        let dir: SortDirection = serde_json::from_str("\"desc\"").unwrap();
        assert_eq!(dir, SortDirection::Desc);
        assert!(serde_json::from_str::<SortDirection>("\"sideways\"").is_err());
    }

    // =========================================================================
    // QueryOptions Tests
    // =========================================================================

    #[test]
    fn test_query_options_defaults() {
        let options = QueryOptions::new("SecurityLog");
        assert_eq!(options.table, "SecurityLog");
        assert!(options.columns.is_empty());
        assert!(options.conditions.is_empty());
        assert!(options.order_by.is_none());
        assert!(options.pagination.is_none());
    }

    #[test]
    fn test_query_options_deserialize_with_defaults() {
        let options: QueryOptions = serde_json::from_str(
            r#"{
                "table": "SecurityLog",
                "columns": ["userId", "eventType"],
                "conditions": [{"column": "userId", "operator": "=", "value": "u1"}],
                "orderBy": {"column": "createdAt", "direction": "desc"},
                "pagination": {"take": 10}
            }"#,
        )
        .unwrap();

        assert_eq!(options.columns, vec![Column::name("userId"), Column::name("eventType")]);
        assert_eq!(options.conditions.len(), 1);
        assert_eq!(
            options.order_by,
            Some(OrderBy::new("createdAt", SortDirection::Desc))
        );
        let pagination = options.pagination.unwrap();
        assert_eq!(pagination.take, Some(10));
        assert_eq!(pagination.max_limit, 100);
    }

    // =========================================================================
    // Page Tests
    // =========================================================================

    #[test]
    fn test_page_has_more() {
        let page = Page::new(vec![1, 2, 3], 10, 0);
        assert!(page.has_more);

        let page = Page::new(vec![1, 2, 3], 10, 7);
        assert!(!page.has_more);

        let page: Page<i32> = Page::new(vec![], 0, 0);
        assert!(!page.has_more);
    }

    #[test]
    fn test_page_serializes_camel_case() {
        let json = serde_json::to_value(Page::new(vec!["a"], 2, 0)).unwrap();
        assert_eq!(json, serde_json::json!({"data": ["a"], "total": 2, "hasMore": true}));
    }

    #[test]
    fn test_column_deserialize_from_borrowed_input() {
        let input = String::from(r#"["id", "COUNT(DISTINCT \"userId\")"]"#);
        let columns: Vec<Column> = serde_json::from_str(&input).unwrap();
        drop(input);

        assert_eq!(
            columns,
            vec![Column::name("id"), Column::name("COUNT(DISTINCT \"userId\")")]
        );
    }

    #[test]
    fn test_column_deserialize_never_yields_aggregate() {
        let result = serde_json::from_str::<Column>(r#"{"CountAll": {"alias": "total"}}"#);
        assert!(result.is_err());

        let result = serde_json::from_str::<Column>(r#"{"Trusted": "1; DROP TABLE users"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_query_options_requires_table() {
        assert!(serde_json::from_str::<QueryOptions>(r#"{"columns": []}"#).is_err());
    }
}
