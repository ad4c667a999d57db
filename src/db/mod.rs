//! Hosted backend abstraction
//!
//! Persistence, querying and auth live in a hosted backend-as-a-service. Every
//! component talks to it through the `Backend` capability, injected as an
//! `Arc<dyn Backend>`, so the HTTP client can be swapped for the in-memory
//! implementation in tests and local runs.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Display;

use crate::error::AppResult;

pub mod memory;
pub mod query;
pub mod rest;

pub use memory::MemoryBackend;
pub use query::{Filter, RowQuery, SortOrder};
pub use rest::RestBackend;

/// Tables exposed by the hosted backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Products,
    Categories,
    Orders,
    Users,
    UserActivity,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Products => "products",
            Table::Categories => "categories",
            Table::Orders => "orders",
            Table::Users => "users",
            Table::UserActivity => "user_activity",
        }
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request/response capability of the hosted backend
///
/// Rows travel as JSON objects; callers decode them into typed records with
/// [`fetch`].
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Read rows matching the query
    async fn query(&self, table: Table, query: &RowQuery) -> AppResult<Vec<Value>>;

    /// Append one row
    async fn insert(&self, table: Table, record: Value) -> AppResult<()>;

    /// Count rows matching every filter
    async fn count(&self, table: Table, filters: &[Filter]) -> AppResult<u64>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Runs a query and decodes the rows, skipping any that don't fit `T`
pub async fn fetch<T: DeserializeOwned>(
    backend: &dyn Backend,
    table: Table,
    query: &RowQuery,
) -> AppResult<Vec<T>> {
    let rows = backend.query(table, query).await?;
    Ok(decode_rows(table, rows))
}

/// Decodes rows leniently. Malformed rows are logged and dropped, never fatal.
pub fn decode_rows<T: DeserializeOwned>(table: Table, rows: Vec<Value>) -> Vec<T> {
    let total = rows.len();
    let decoded: Vec<T> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(table = %table, error = %e, "Skipping malformed row");
                None
            }
        })
        .collect();

    if decoded.len() < total {
        tracing::debug!(
            table = %table,
            total,
            decoded = decoded.len(),
            "Some rows could not be decoded"
        );
    }

    decoded
}
