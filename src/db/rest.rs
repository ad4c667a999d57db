//! Hosted backend over its PostgREST-style HTTP row API
//!
//! API Flow:
//! 1. Query: GET /rest/v1/{table}?select=..&col=op.value&order=..&limit=..
//! 2. Insert: POST /rest/v1/{table} with a JSON body
//! 3. Count: HEAD /rest/v1/{table} with `Prefer: count=exact`, total read from `Content-Range`

use reqwest::{header::CONTENT_RANGE, Client as HttpClient, Method, RequestBuilder, Response};
use serde_json::Value;

use super::{Backend, Filter, RowQuery, Table};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct RestBackend {
    http_client: HttpClient,
    base_url: String,
    api_key: String,
}

impl RestBackend {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    /// Starts an authenticated request against a table
    fn request(&self, method: Method, table: Table) -> RequestBuilder {
        self.http_client
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Turns a non-success response into a backend error
    async fn check_status(table: Table, response: Response) -> AppResult<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(
            table = %table,
            status = %status,
            body = %body,
            "Backend request failed"
        );
        Err(AppError::Backend(format!(
            "{} returned status {}: {}",
            table, status, body
        )))
    }
}

#[async_trait::async_trait]
impl Backend for RestBackend {
    async fn query(&self, table: Table, query: &RowQuery) -> AppResult<Vec<Value>> {
        let params = query_params(query);
        tracing::debug!(table = %table, params = ?params, "Querying backend");

        let response = self.request(Method::GET, table).query(&params).send().await?;
        let rows: Vec<Value> = Self::check_status(table, response).await?.json().await?;

        tracing::debug!(table = %table, rows = rows.len(), "Backend query returned");
        Ok(rows)
    }

    async fn insert(&self, table: Table, record: Value) -> AppResult<()> {
        let response = self
            .request(Method::POST, table)
            .header("Prefer", "return=minimal")
            .json(&record)
            .send()
            .await?;
        Self::check_status(table, response).await?;
        Ok(())
    }

    async fn count(&self, table: Table, filters: &[Filter]) -> AppResult<u64> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(filters.iter().map(filter_param));

        let response = self
            .request(Method::HEAD, table)
            .header("Prefer", "count=exact")
            .query(&params)
            .send()
            .await?;
        let response = Self::check_status(table, response).await?;

        response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|h| h.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| {
                AppError::Backend(format!("{} count response missing Content-Range total", table))
            })
    }

    fn name(&self) -> &'static str {
        "rest"
    }
}

/// Renders a query into PostgREST query-string parameters
pub(crate) fn query_params(query: &RowQuery) -> Vec<(String, String)> {
    let mut params = vec![(
        "select".to_string(),
        query.select.clone().unwrap_or_else(|| "*".to_string()),
    )];

    params.extend(query.filters.iter().map(filter_param));

    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push((
            "order".to_string(),
            format!("{}.{}.nullslast", order.column, direction),
        ));
    }

    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }

    params
}

fn filter_param(filter: &Filter) -> (String, String) {
    match filter {
        Filter::Eq(column, value) => (column.clone(), format!("eq.{}", render_value(value))),
        Filter::In(column, values) => {
            let list: Vec<String> = values.iter().map(|v| quote(&render_value(v))).collect();
            (column.clone(), format!("in.({})", list.join(",")))
        }
        Filter::Gte(column, bound) => (column.clone(), format!("gte.{}", bound)),
        Filter::Lte(column, bound) => (column.clone(), format!("lte.{}", bound)),
        Filter::Lt(column, bound) => (column.clone(), format!("lt.{}", bound)),
        Filter::AnyContains { columns, needle } => {
            let pattern = quote(&format!("*{}*", needle));
            let clauses: Vec<String> = columns
                .iter()
                .map(|c| format!("{}.ilike.{}", c, pattern))
                .collect();
            ("or".to_string(), format!("({})", clauses.join(",")))
        }
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Double-quotes a value inside a PostgREST list so reserved characters
/// (`,` `.` `:` `(` `)`) are taken literally
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Extracts the total from a `Content-Range` header such as `0-24/3573` or `*/0`
pub(crate) fn parse_content_range_total(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SortOrder;

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_query_params_default_select() {
        let params = query_params(&RowQuery::new());
        assert_eq!(params, vec![("select".to_string(), "*".to_string())]);
    }

    #[test]
    fn test_query_params_filters_order_and_limit() {
        let query = RowQuery::new()
            .select("*, categories(name)")
            .filter(Filter::eq("brand", "Nike"))
            .filter(Filter::gte("price", 100.0))
            .filter(Filter::lte("price", 200.5))
            .order_by(SortOrder::desc("rating"))
            .limit(10);

        let params = query_params(&query);
        assert_eq!(param(&params, "select"), Some("*, categories(name)"));
        assert_eq!(param(&params, "brand"), Some("eq.Nike"));
        assert_eq!(param(&params, "order"), Some("rating.desc.nullslast"));
        assert_eq!(param(&params, "limit"), Some("10"));

        let price: Vec<&str> = params
            .iter()
            .filter(|(k, _)| k == "price")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(price, vec!["gte.100", "lte.200.5"]);
    }

    #[test]
    fn test_in_filter_quotes_values() {
        let params = query_params(&RowQuery::new().filter(Filter::is_in("category_id", ["shoes", "a,b"])));
        assert_eq!(param(&params, "category_id"), Some(r#"in.("shoes","a,b")"#));
    }

    #[test]
    fn test_any_contains_renders_or_ilike() {
        let params = query_params(
            &RowQuery::new().filter(Filter::any_contains(&["name", "description", "brand"], "air max")),
        );
        assert_eq!(
            param(&params, "or"),
            Some(r#"(name.ilike."*air max*",description.ilike."*air max*",brand.ilike."*air max*")"#)
        );
    }

    #[test]
    fn test_quote_escapes_quotes_and_backslashes() {
        assert_eq!(quote(r#"12" \ pipe"#), r#""12\" \\ pipe""#);
    }

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("0-24/3573"), Some(3573));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-24/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn test_table_url_trims_trailing_slash() {
        let backend = RestBackend::new("https://shop.example.co/", "anon");
        assert_eq!(
            backend.table_url(Table::UserActivity),
            "https://shop.example.co/rest/v1/user_activity"
        );
    }
}
