//! LIMIT/OFFSET construction with a hard page-size cap

use serde::Deserialize;

/// Page size cap used when none is configured
pub const DEFAULT_MAX_LIMIT: i64 = 100;

fn default_max_limit() -> i64 {
    DEFAULT_MAX_LIMIT
}

/// Pagination bounds
///
/// Out-of-range values are clamped, never rejected: `take` into
/// `[1, max_limit]` and `skip` to at least zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Requested page size; `None` means `max_limit`
    #[serde(default)]
    pub take: Option<i64>,
    /// Rows to skip; `None` means zero
    #[serde(default)]
    pub skip: Option<i64>,
    /// Hard cap on the page size (default: 100)
    #[serde(default = "default_max_limit")]
    pub max_limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            take: None,
            skip: None,
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }
}

impl Pagination {
    pub fn new(take: Option<i64>, skip: Option<i64>) -> Self {
        Self {
            take,
            skip,
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }

    pub fn with_take(mut self, take: i64) -> Self {
        self.take = Some(take);
        self
    }

    pub fn with_skip(mut self, skip: i64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn with_max_limit(mut self, max_limit: i64) -> Self {
        self.max_limit = max_limit;
        self
    }

    /// Effective LIMIT after clamping
    pub fn limit(&self) -> i64 {
        let max_limit = self.max_limit.max(1);
        self.take.unwrap_or(max_limit).clamp(1, max_limit)
    }

    /// Effective OFFSET after clamping
    pub fn offset(&self) -> i64 {
        self.skip.unwrap_or(0).max(0)
    }

    pub fn to_sql(&self) -> String {
        format!("LIMIT {} OFFSET {}", self.limit(), self.offset())
    }
}

/// Build a `LIMIT <n> OFFSET <m>` clause
///
/// Both keywords are always emitted. A `max_limit` below one is treated as one.
///
/// # Example
/// ```
/// use safe_query_store::sql::build_pagination;
///
/// assert_eq!(build_pagination(Some(500), Some(-10), 100), "LIMIT 100 OFFSET 0");
/// assert_eq!(build_pagination(Some(5), Some(20), 100), "LIMIT 5 OFFSET 20");
/// ```
pub fn build_pagination(take: Option<i64>, skip: Option<i64>, max_limit: i64) -> String {
    Pagination {
        take,
        skip,
        max_limit,
    }
    .to_sql()
}
