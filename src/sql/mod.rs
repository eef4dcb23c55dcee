//! SQL utilities for query construction
//!
//! Provides identifier validation, literal formatting, clause builders and
//! statement assembly.

pub mod condition;
pub mod pagination;
pub mod query;
pub mod sanitize;
pub mod value;

pub use condition::{build_order_by, build_predicates, build_where};
pub use pagination::{DEFAULT_MAX_LIMIT, Pagination, build_pagination};
pub use query::build_query;
pub use sanitize::{is_valid_identifier, quote_identifier, quoted_identifier, validate_identifier};
pub use value::{escape_like, format_value, quote_literal};
