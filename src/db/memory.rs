use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{Backend, Filter, RowQuery, SortOrder, Table};
use crate::error::AppResult;

/// In-process backend holding rows as JSON objects
///
/// Evaluates the same filter/sort vocabulary as the hosted backend. Relations
/// are stored pre-embedded (orders carry their `order_items`), so the query's
/// `select` projection is ignored.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    tables: Arc<RwLock<HashMap<Table, Vec<Value>>>>,
}

impl MemoryBackend {
    /// Creates an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend seeded with rows per table
    pub fn with_tables(tables: impl IntoIterator<Item = (Table, Vec<Value>)>) -> Self {
        Self {
            tables: Arc::new(RwLock::new(tables.into_iter().collect())),
        }
    }

    /// Snapshot of every row in a table, in insertion order
    pub async fn rows(&self, table: Table) -> Vec<Value> {
        let tables = self.tables.read().await;
        tables.get(&table).cloned().unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Backend for MemoryBackend {
    async fn query(&self, table: Table, query: &RowQuery) -> AppResult<Vec<Value>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Value> = tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters.iter().all(|f| matches_filter(row, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            sort_rows(&mut rows, order);
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        tracing::trace!(table = %table, returned = rows.len(), "Memory query");

        Ok(rows)
    }

    async fn insert(&self, table: Table, record: Value) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables.entry(table).or_default().push(record);
        Ok(())
    }

    async fn count(&self, table: Table, filters: &[Filter]) -> AppResult<u64> {
        let tables = self.tables.read().await;
        let count = tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| filters.iter().all(|f| matches_filter(row, f)))
                    .count()
            })
            .unwrap_or(0);
        Ok(count as u64)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

fn column<'a>(row: &'a Value, name: &str) -> Option<&'a Value> {
    row.get(name).filter(|v| !v.is_null())
}

fn number(row: &Value, name: &str) -> Option<f64> {
    column(row, name).and_then(Value::as_f64)
}

fn matches_filter(row: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(name, value) => column(row, name) == Some(value),
        Filter::In(name, values) => column(row, name).is_some_and(|v| values.contains(v)),
        Filter::Gte(name, bound) => number(row, name).is_some_and(|n| n >= *bound),
        Filter::Lte(name, bound) => number(row, name).is_some_and(|n| n <= *bound),
        Filter::Lt(name, bound) => number(row, name).is_some_and(|n| n < *bound),
        Filter::AnyContains { columns, needle } => {
            let needle = needle.to_lowercase();
            columns.iter().any(|name| {
                column(row, name)
                    .and_then(Value::as_str)
                    .is_some_and(|s| s.to_lowercase().contains(&needle))
            })
        }
    }
}

fn sort_rows(rows: &mut [Value], order: &SortOrder) {
    rows.sort_by(|a, b| {
        match (column(a, &order.column), column(b, &order.column)) {
            (Some(x), Some(y)) => {
                let ord = compare_values(x, y);
                if order.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => Ordering::Equal,
        },
        (Value::String(x), Value::String(y)) => {
            // Timestamps may differ in offset or precision
            match (
                x.parse::<DateTime<Utc>>(),
                y.parse::<DateTime<Utc>>(),
            ) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}
