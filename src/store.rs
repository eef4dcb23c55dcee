//! SecurityLogStore - security log facade over the safe query builder
//!
//! Turns `SecurityLogQuery` values into `QueryOptions`, runs the generated
//! SQL against PostgreSQL and maps rows back into typed records. This is the
//! only module that performs I/O.

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use crate::config::StoreConfig;
use crate::error::{QueryError, Result};
use crate::event::{
    NewSecurityEvent, SecurityEvent, SecurityEventType, SecurityLogQuery, SecurityStats, columns,
};
use crate::sql::query::build_query;
use crate::sql::sanitize::quoted_identifier;
use crate::types::{Column, Condition, Page, QueryOptions};

const TOTAL_ALIAS: &str = "total";
const UNIQUE_USERS_ALIAS: &str = "uniqueUsers";

/// Security log store backed by a PostgreSQL table
///
/// The table name comes from `StoreConfig` and is validated once at
/// construction; page sizes are capped by `StoreConfig::max_limit`.
pub struct SecurityLogStore {
    /// Database connection pool
    pool: PgPool,
    /// Store configuration
    config: StoreConfig,
    /// Validated, quoted table name
    table: String,
}

impl SecurityLogStore {
    /// Create a new store from configuration
    ///
    /// This will:
    /// 1. Validate the configured table name
    /// 2. Connect to the database
    /// 3. Create the security log table if it doesn't exist
    pub async fn new(config: StoreConfig) -> Result<Self> {
        let table = quoted_identifier(&config.table_name, "table")?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .map_err(|e| QueryError::Connection(format!("Database connection failed: {}", e)))?;

        let store = Self {
            pool,
            config,
            table,
        };
        store.ensure_table().await?;

        Ok(store)
    }

    /// Create a new store from an existing pool
    ///
    /// Use this when the host application already owns a connection pool.
    pub async fn from_pool(pool: PgPool, config: StoreConfig) -> Result<Self> {
        let table = quoted_identifier(&config.table_name, "table")?;
        let store = Self {
            pool,
            config,
            table,
        };
        store.ensure_table().await?;
        Ok(store)
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Ensures the security log table and its lookup index exist
    ///
    /// Called by the constructors; safe to call again.
    pub async fn ensure_table(&self) -> Result<()> {
        let create_sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                "id" TEXT PRIMARY KEY,
                "userId" TEXT,
                "eventType" TEXT NOT NULL,
                "ipAddress" TEXT,
                "userAgent" TEXT,
                "metadata" JSONB,
                "createdAt" TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            self.table
        );
        sqlx::query(&create_sql).execute(&self.pool).await?;

        // Suffix keeps the name inside the identifier alphabet
        let index_name = quoted_identifier(
            &format!("{}_userId_createdAt_idx", self.config.table_name),
            "index",
        )?;
        let index_sql = format!(
            r#"CREATE INDEX IF NOT EXISTS {} ON {} ("userId", "createdAt")"#,
            index_name, self.table
        );
        sqlx::query(&index_sql).execute(&self.pool).await?;

        Ok(())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Record a security event
    pub async fn log_event(&self, event: NewSecurityEvent) -> Result<SecurityEvent> {
        let id = uuid::Uuid::new_v4().to_string();

        let insert_sql = format!(
            r#"
            INSERT INTO {} ("id", "userId", "eventType", "ipAddress", "userAgent", "metadata")
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING "createdAt"
            "#,
            self.table
        );

        let row = sqlx::query(&insert_sql)
            .bind(&id)
            .bind(&event.user_id)
            .bind(event.event_type.as_str())
            .bind(&event.ip_address)
            .bind(&event.user_agent)
            .bind(&event.metadata)
            .fetch_one(&self.pool)
            .await?;

        let created_at: DateTime<Utc> = row.try_get(columns::CREATED_AT)?;

        tracing::debug!(id = %id, event_type = %event.event_type, "Recorded security event");

        Ok(SecurityEvent {
            id,
            user_id: event.user_id,
            event_type: event.event_type,
            ip_address: event.ip_address,
            user_agent: event.user_agent,
            metadata: event.metadata,
            created_at,
        })
    }

    /// Delete events created before `cutoff`, returning the number removed
    pub async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let delete_sql = format!(r#"DELETE FROM {} WHERE "createdAt" < $1"#, self.table);

        let result = sqlx::query(&delete_sql)
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        tracing::debug!(removed = result.rows_affected(), "Purged security events");

        Ok(result.rows_affected())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Find one page of events plus the total match count
    ///
    /// The count and data queries run concurrently on separate pool
    /// connections. Dropping the returned future cancels both.
    pub async fn find_events(&self, query: &SecurityLogQuery) -> Result<Page<SecurityEvent>> {
        let pagination = query.pagination(self.config.max_limit);

        let count_sql = build_query(&count_options(&self.config.table_name, query))?;
        let data_sql = build_query(
            &query.to_query_options(&self.config.table_name, self.config.max_limit),
        )?;

        tracing::debug!(count_sql = %count_sql, data_sql = %data_sql, "Querying security events");

        let (count_row, rows) = tokio::try_join!(
            sqlx::query(&count_sql).fetch_one(&self.pool),
            sqlx::query(&data_sql).fetch_all(&self.pool),
        )?;

        let total: i64 = count_row.try_get(TOTAL_ALIAS)?;
        let events = rows
            .iter()
            .map(row_to_event)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(events, total, pagination.offset()))
    }

    /// Count events matching the query, ignoring pagination
    pub async fn count_events(&self, query: &SecurityLogQuery) -> Result<i64> {
        let count_sql = build_query(&count_options(&self.config.table_name, query))?;
        tracing::debug!(sql = %count_sql, "Counting security events");

        let row = sqlx::query(&count_sql).fetch_one(&self.pool).await?;
        Ok(row.try_get(TOTAL_ALIAS)?)
    }

    /// Summary counts for the events matching the query
    pub async fn stats(&self, query: &SecurityLogQuery) -> Result<SecurityStats> {
        let stats_sql = build_query(&stats_options(&self.config.table_name, query))?;
        tracing::debug!(sql = %stats_sql, "Computing security stats");

        let row = sqlx::query(&stats_sql).fetch_one(&self.pool).await?;

        let mut stats = SecurityStats {
            total: row.try_get(TOTAL_ALIAS)?,
            unique_users: row.try_get(UNIQUE_USERS_ALIAS)?,
            ..SecurityStats::default()
        };
        for event_type in SecurityEventType::ALL {
            let count: i64 = row.try_get(event_type.as_str())?;
            stats.by_event_type.insert(event_type, count);
        }

        Ok(stats)
    }
}

// =============================================================================
// Query Options
// =============================================================================

/// Count query: same filters, no ordering or pagination
fn count_options(table: &str, query: &SecurityLogQuery) -> QueryOptions {
    QueryOptions::new(table)
        .with_column(Column::count_all(TOTAL_ALIAS))
        .with_conditions(query.conditions())
}

/// Stats query: one conditional count per event type
fn stats_options(table: &str, query: &SecurityLogQuery) -> QueryOptions {
    let mut options = QueryOptions::new(table)
        .with_column(Column::count_all(TOTAL_ALIAS))
        .with_column(Column::trusted(
            r#"COUNT(DISTINCT "userId") AS "uniqueUsers""#,
        ))
        .with_conditions(query.conditions());

    for event_type in SecurityEventType::ALL {
        options = options.with_column(Column::count_where(
            event_type.as_str(),
            vec![Condition::eq(columns::EVENT_TYPE, event_type.as_str())],
        ));
    }

    options
}

fn row_to_event(row: &PgRow) -> Result<SecurityEvent> {
    let event_type: String = row.try_get(columns::EVENT_TYPE)?;

    Ok(SecurityEvent {
        id: row.try_get(columns::ID)?,
        user_id: row.try_get(columns::USER_ID)?,
        event_type: event_type.parse()?,
        ip_address: row.try_get(columns::IP_ADDRESS)?,
        user_agent: row.try_get(columns::USER_AGENT)?,
        metadata: row.try_get(columns::METADATA)?,
        created_at: row.try_get(columns::CREATED_AT)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // ==================== Data Query ====================

    #[test]
    fn test_event_query_for_user() {
        let query = SecurityLogQuery::new().for_user("u1").paginate(10, 0);
        let sql = build_query(&query.to_query_options("SecurityLog", 100)).unwrap();

        assert_eq!(
            sql,
            "SELECT \"id\", \"userId\", \"eventType\", \"ipAddress\", \"userAgent\", \"metadata\", \"createdAt\" \
             FROM \"SecurityLog\" WHERE \"userId\" = 'u1' ORDER BY \"createdAt\" DESC LIMIT 10 OFFSET 0"
        );
    }

    #[test]
    fn test_event_query_caps_page_size() {
        let query = SecurityLogQuery::new().paginate(1_000, -5).oldest_first();
        let sql = build_query(&query.to_query_options("SecurityLog", 25)).unwrap();

        assert!(sql.ends_with("ORDER BY \"createdAt\" ASC LIMIT 25 OFFSET 0"));
    }

    #[test]
    fn test_event_query_with_date_range() {
        let from = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let query = SecurityLogQuery::new()
            .with_event_type(SecurityEventType::LoginFailure)
            .between(from, to);
        let sql = build_query(&query.to_query_options("SecurityLog", 100)).unwrap();

        assert!(sql.contains(
            "WHERE \"eventType\" = 'LOGIN_FAILURE' AND \"createdAt\" >= '2024-05-01T00:00:00Z' \
             AND \"createdAt\" < '2024-06-01T00:00:00Z'"
        ));
        assert!(sql.ends_with("LIMIT 100 OFFSET 0"));
    }

    // ==================== Count Query ====================

    #[test]
    fn test_count_query_has_no_order_or_limit() {
        let query = SecurityLogQuery::new().for_user("u1").paginate(10, 20);
        let sql = build_query(&count_options("SecurityLog", &query)).unwrap();

        assert_eq!(
            sql,
            "SELECT COUNT(*) AS \"total\" FROM \"SecurityLog\" WHERE \"userId\" = 'u1'"
        );
    }

    #[test]
    fn test_count_and_data_share_filters() {
        let query = SecurityLogQuery::new()
            .for_user("u'1")
            .with_ip_address("10.0.0.1");
        let count_sql = build_query(&count_options("SecurityLog", &query)).unwrap();
        let data_sql = build_query(&query.to_query_options("SecurityLog", 100)).unwrap();

        let filter = "WHERE \"userId\" = 'u''1' AND \"ipAddress\" = '10.0.0.1'";
        assert!(count_sql.contains(filter));
        assert!(data_sql.contains(filter));
    }

    // ==================== Stats Query ====================

    #[test]
    fn test_stats_query() {
        let query = SecurityLogQuery::new().for_user("u1");
        let sql = build_query(&stats_options("SecurityLog", &query)).unwrap();

        assert!(sql.starts_with(
            "SELECT COUNT(*) AS \"total\", COUNT(DISTINCT \"userId\") AS \"uniqueUsers\", "
        ));
        assert!(sql.contains(
            "COUNT(*) FILTER (WHERE \"eventType\" = 'LOGIN_FAILURE') AS \"LOGIN_FAILURE\""
        ));
        assert!(sql.contains(
            "COUNT(*) FILTER (WHERE \"eventType\" = 'SUSPICIOUS_ACTIVITY') AS \"SUSPICIOUS_ACTIVITY\""
        ));
        assert!(sql.ends_with("FROM \"SecurityLog\" WHERE \"userId\" = 'u1'"));
    }

    #[test]
    fn test_stats_query_has_one_column_per_event_type() {
        let sql = build_query(&stats_options("SecurityLog", &SecurityLogQuery::new())).unwrap();
        assert_eq!(sql.matches("FILTER (WHERE").count(), SecurityEventType::ALL.len());
    }

    // ==================== Table Validation ====================

    #[test]
    fn test_invalid_table_rejected_by_builder() {
        let query = SecurityLogQuery::new();
        let err = build_query(&count_options("Security Log", &query)).unwrap_err();
        assert!(matches!(err, QueryError::InvalidIdentifier(_)));
    }
}
