//! # safe-query-store
//!
//! Injection-safe dynamic SQL construction for PostgreSQL, plus a security
//! log store built on top of it.
//!
//! The builder produces plain SQL strings for queries a typed ORM API cannot
//! express (filtered counts, date-range scans, `FILTER (WHERE ...)`
//! aggregates) while inputs such as column names, operators, values and
//! pagination bounds arrive at runtime.
//!
//! ## Guarantees
//!
//! - **Identifiers are allowlisted**: table and column names must match
//!   `^[A-Za-z_][A-Za-z0-9_]*$` and are emitted double-quoted
//! - **Operators are a closed set**: operator text is matched against
//!   [`Operator`] and never copied from input
//! - **Values are always escaped**: every [`DynamicValue`] becomes a keyword,
//!   a number, or a single-quoted literal with doubled quotes
//! - **Filters fail closed**: an invalid filter condition is dropped; an
//!   invalid table, sort column or alias is an error
//! - **Page sizes are capped**: `take` is clamped into `[1, max_limit]`
//!
//! ## Quick Start
//!
//! ```rust
//! use safe_query_store::sql::{Pagination, build_query};
//! use safe_query_store::{Condition, QueryOptions, SortDirection};
//!
//! let sql = build_query(
//!     &QueryOptions::new("SecurityLog")
//!         .with_condition(Condition::eq("userId", "u1"))
//!         .with_condition(Condition::raw("eventType", "; DROP", "x")) // dropped
//!         .with_order_by("createdAt", SortDirection::Desc)
//!         .with_pagination(Pagination::new(Some(500), Some(-10))),
//! )?;
//!
//! assert_eq!(
//!     sql,
//!     "SELECT * FROM \"SecurityLog\" WHERE \"userId\" = 'u1' ORDER BY \"createdAt\" DESC LIMIT 100 OFFSET 0"
//! );
//! # Ok::<(), safe_query_store::QueryError>(())
//! ```
//!
//! ## Security log store
//!
//! ```rust,no_run
//! use safe_query_store::{
//!     NewSecurityEvent, SecurityEventType, SecurityLogQuery, SecurityLogStore, StoreConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoreConfig::builder("postgres://localhost/mydb").build();
//!     let store = SecurityLogStore::new(config).await?;
//!
//!     store
//!         .log_event(NewSecurityEvent::new(SecurityEventType::LoginFailure).with_user("u1"))
//!         .await?;
//!
//!     let page = store
//!         .find_events(&SecurityLogQuery::new().for_user("u1").paginate(10, 0))
//!         .await?;
//!     println!("{} of {} events", page.data.len(), page.total);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! Limits travel with each value instead of living in globals:
//!
//! ```rust
//! use safe_query_store::StoreConfig;
//!
//! let config = StoreConfig::builder("postgres://localhost/mydb")
//!     .table_name("SecurityLog")  // Default table name
//!     .max_limit(100)             // Page size cap (default)
//!     .max_connections(5)         // Pool size for SecurityLogStore::new (default)
//!     .build();
//! ```
//!
//! ## Trust boundary
//!
//! Column names, operators and values in [`Condition`] are untrusted. Raw SQL
//! enters only through [`Column::Trusted`], which accepts `&'static str`, so
//! it can only hold text written in source code.
//!
//! Literals use standard SQL quoting (`'` doubled). The target server must run
//! with `standard_conforming_strings = on`, the PostgreSQL default.

pub mod config;
pub mod error;
pub mod event;
pub mod sql;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use config::{StoreConfig, StoreConfigBuilder};
pub use error::{QueryError, Result};
pub use event::{
    NewSecurityEvent, SecurityEvent, SecurityEventType, SecurityLogQuery, SecurityStats,
};
pub use sql::{Pagination, build_query};
pub use store::SecurityLogStore;
pub use types::{Column, Condition, DynamicValue, Operator, OrderBy, Page, QueryOptions, SortDirection};
