use serde_json::Value;

/// A single row constraint understood by every backend
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Column equals value
    Eq(String, Value),
    /// Column is one of the values
    In(String, Vec<Value>),
    /// Column is a number >= bound
    Gte(String, f64),
    /// Column is a number <= bound
    Lte(String, f64),
    /// Column is a number < bound
    Lt(String, f64),
    /// Any of the columns contains `needle`, ignoring case
    AnyContains { columns: Vec<String>, needle: String },
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Filter::Eq(column.to_string(), value.into())
    }

    pub fn is_in<V: Into<Value>>(column: &str, values: impl IntoIterator<Item = V>) -> Self {
        Filter::In(
            column.to_string(),
            values.into_iter().map(Into::into).collect(),
        )
    }

    pub fn gte(column: &str, bound: f64) -> Self {
        Filter::Gte(column.to_string(), bound)
    }

    pub fn lte(column: &str, bound: f64) -> Self {
        Filter::Lte(column.to_string(), bound)
    }

    pub fn lt(column: &str, bound: f64) -> Self {
        Filter::Lt(column.to_string(), bound)
    }

    pub fn any_contains(columns: &[&str], needle: &str) -> Self {
        Filter::AnyContains {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            needle: needle.to_string(),
        }
    }
}

/// Result ordering on one column. Rows missing the column sort last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub column: String,
    pub ascending: bool,
}

impl SortOrder {
    pub fn asc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            ascending: true,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            ascending: false,
        }
    }
}

/// A read against one table: projection, AND-combined filters, ordering and limit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowQuery {
    /// Column projection, including embedded relations (e.g. `*, order_items(*)`).
    /// `None` selects every column.
    pub select: Option<String>,
    pub filters: Vec<Filter>,
    pub order: Option<SortOrder>,
    pub limit: Option<usize>,
}

impl RowQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
