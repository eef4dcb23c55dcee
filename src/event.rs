//! Security log record types
//!
//! Includes SecurityEvent, NewSecurityEvent, SecurityLogQuery and
//! SecurityStats. `SecurityLogQuery` is the known-field boundary: only the
//! fields declared here can ever become filter conditions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::QueryError;
use crate::sql::pagination::Pagination;
use crate::types::{Condition, Operator, QueryOptions, SortDirection};

/// Column names of the security log table
pub mod columns {
    pub const ID: &str = "id";
    pub const USER_ID: &str = "userId";
    pub const EVENT_TYPE: &str = "eventType";
    pub const IP_ADDRESS: &str = "ipAddress";
    pub const USER_AGENT: &str = "userAgent";
    pub const METADATA: &str = "metadata";
    pub const CREATED_AT: &str = "createdAt";

    /// Projection used when reading full events
    pub const ALL: [&str; 7] = [
        ID, USER_ID, EVENT_TYPE, IP_ADDRESS, USER_AGENT, METADATA, CREATED_AT,
    ];
}

/// Kind of security-relevant event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityEventType {
    LoginSuccess,
    LoginFailure,
    Logout,
    PasswordChange,
    PasswordReset,
    AccountLocked,
    PermissionDenied,
    SuspiciousActivity,
}

impl SecurityEventType {
    pub const ALL: [SecurityEventType; 8] = [
        SecurityEventType::LoginSuccess,
        SecurityEventType::LoginFailure,
        SecurityEventType::Logout,
        SecurityEventType::PasswordChange,
        SecurityEventType::PasswordReset,
        SecurityEventType::AccountLocked,
        SecurityEventType::PermissionDenied,
        SecurityEventType::SuspiciousActivity,
    ];

    /// Stored text; also a valid identifier, used as the stats column alias
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityEventType::LoginSuccess => "LOGIN_SUCCESS",
            SecurityEventType::LoginFailure => "LOGIN_FAILURE",
            SecurityEventType::Logout => "LOGOUT",
            SecurityEventType::PasswordChange => "PASSWORD_CHANGE",
            SecurityEventType::PasswordReset => "PASSWORD_RESET",
            SecurityEventType::AccountLocked => "ACCOUNT_LOCKED",
            SecurityEventType::PermissionDenied => "PERMISSION_DENIED",
            SecurityEventType::SuspiciousActivity => "SUSPICIOUS_ACTIVITY",
        }
    }
}

impl fmt::Display for SecurityEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecurityEventType {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| QueryError::validation(format!("Unknown security event type: '{}'", s)))
    }
}

/// A stored security log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityEvent {
    pub id: String,
    pub user_id: Option<String>,
    pub event_type: SecurityEventType,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Request to record a new security event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSecurityEvent {
    pub event_type: SecurityEventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl NewSecurityEvent {
    pub fn new(event_type: SecurityEventType) -> Self {
        Self {
            event_type,
            user_id: None,
            ip_address: None,
            user_agent: None,
            metadata: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_ip_address(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Domain query over the security log
///
/// `from` is inclusive and `to` is exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityLogQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Empty matches every type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_types: Vec<SecurityEventType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<i64>,
    /// Sort direction on `createdAt` (default: newest first)
    #[serde(default = "default_direction")]
    pub direction: SortDirection,
}

fn default_direction() -> SortDirection {
    SortDirection::Desc
}

impl Default for SecurityLogQuery {
    fn default() -> Self {
        Self {
            user_id: None,
            event_types: Vec::new(),
            ip_address: None,
            from: None,
            to: None,
            take: None,
            skip: None,
            direction: default_direction(),
        }
    }
}

impl SecurityLogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_event_type(mut self, event_type: SecurityEventType) -> Self {
        self.event_types.push(event_type);
        self
    }

    pub fn with_ip_address(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    pub fn between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn since(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    pub fn paginate(mut self, take: i64, skip: i64) -> Self {
        self.take = Some(take);
        self.skip = Some(skip);
        self
    }

    pub fn oldest_first(mut self) -> Self {
        self.direction = SortDirection::Asc;
        self
    }

    /// Filter conditions for the populated fields, in a fixed order
    pub fn conditions(&self) -> Vec<Condition> {
        let mut conditions = Vec::new();

        if let Some(user_id) = &self.user_id {
            conditions.push(Condition::eq(columns::USER_ID, user_id.as_str()));
        }

        match self.event_types.as_slice() {
            [] => {}
            [single] => conditions.push(Condition::eq(columns::EVENT_TYPE, single.as_str())),
            many => conditions.push(Condition::is_in(
                columns::EVENT_TYPE,
                many.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
            )),
        }

        if let Some(ip_address) = &self.ip_address {
            conditions.push(Condition::eq(columns::IP_ADDRESS, ip_address.as_str()));
        }
        if let Some(from) = self.from {
            conditions.push(Condition::gte(columns::CREATED_AT, from));
        }
        if let Some(to) = self.to {
            conditions.push(Condition::new(columns::CREATED_AT, Operator::Lt, to));
        }

        conditions
    }

    /// Pagination bounds capped at `max_limit`
    pub fn pagination(&self, max_limit: i64) -> Pagination {
        Pagination::new(self.take, self.skip).with_max_limit(max_limit)
    }

    /// Data query for one page of full events, ordered on `createdAt`
    pub fn to_query_options(&self, table: &str, max_limit: i64) -> QueryOptions {
        QueryOptions::new(table)
            .with_columns(columns::ALL)
            .with_conditions(self.conditions())
            .with_order_by(columns::CREATED_AT, self.direction)
            .with_pagination(self.pagination(max_limit))
    }
}

/// Summary counts over a filtered slice of the security log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityStats {
    pub total: i64,
    pub unique_users: i64,
    pub by_event_type: BTreeMap<SecurityEventType, i64>,
}

impl SecurityStats {
    pub fn count(&self, event_type: SecurityEventType) -> i64 {
        self.by_event_type.get(&event_type).copied().unwrap_or(0)
    }
}
