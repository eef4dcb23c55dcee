//! Error types for query construction and security log operations

use thiserror::Error;

/// Errors that can occur while building or executing queries
#[derive(Debug, Error)]
pub enum QueryError {
    /// A developer-controlled identifier (table, sort column, alias) was rejected
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Columns were requested but none of them survived validation
    #[error("Empty projection: {0}")]
    EmptyProjection(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QueryError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_identifier(msg: impl Into<String>) -> Self {
        Self::InvalidIdentifier(msg.into())
    }

    pub fn empty_projection(msg: impl Into<String>) -> Self {
        Self::EmptyProjection(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
