//! Configuration for SecurityLogStore
//!
//! Provides a builder pattern for configuring the store. Every limit lives on
//! the config value and is threaded into each query; nothing is global.

use crate::sql::pagination::DEFAULT_MAX_LIMIT;

/// Default name of the security log table
pub const DEFAULT_TABLE_NAME: &str = "SecurityLog";

/// Configuration for the security log store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// PostgreSQL database URL
    pub database_url: String,
    /// Name of the security log table (default: "SecurityLog")
    pub table_name: String,
    /// Upper bound for a single page of results (default: 100)
    pub max_limit: i64,
    /// Pool size used when the store opens its own connections (default: 5)
    pub max_connections: u32,
}

impl StoreConfig {
    /// Create a new configuration builder
    pub fn builder(database_url: impl Into<String>) -> StoreConfigBuilder {
        StoreConfigBuilder::new(database_url)
    }
}

/// Builder for StoreConfig
#[derive(Debug)]
pub struct StoreConfigBuilder {
    database_url: String,
    table_name: String,
    max_limit: i64,
    max_connections: u32,
}

impl StoreConfigBuilder {
    /// Create a new builder with the database URL
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            max_limit: DEFAULT_MAX_LIMIT,
            max_connections: 5,
        }
    }

    /// Set the security log table name (default: "SecurityLog")
    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = name.into();
        self
    }

    /// Set the page size cap (default: 100)
    pub fn max_limit(mut self, limit: i64) -> Self {
        self.max_limit = limit;
        self
    }

    /// Set the pool size used by `SecurityLogStore::new` (default: 5)
    pub fn max_connections(mut self, connections: u32) -> Self {
        self.max_connections = connections;
        self
    }

    /// Build the configuration
    pub fn build(self) -> StoreConfig {
        StoreConfig {
            database_url: self.database_url,
            table_name: self.table_name,
            max_limit: self.max_limit,
            max_connections: self.max_connections,
        }
    }
}
