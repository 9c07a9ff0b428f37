//! Relational backend client over the Supabase PostgREST API.
//!
//! Operations: `list_tables`, `read_records`, `create_record`,
//! `update_record`, `delete_record`. Filters are rendered as PostgREST
//! query pairs, e.g. `{age: {gt: 18}}` becomes `age=gt.18`.

use async_trait::async_trait;
use mcpgate_config::SupabaseConfig;
use mcpgate_core::client::parse_parameters;
use mcpgate_core::{
    CapabilityClient, ClientError, FilterExpression, FilterOp, McpResponse, Parameters, Predicate,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

use crate::http::{build_client, send_json};

const OPERATIONS: &[&str] = &[
    "list_tables",
    "read_records",
    "create_record",
    "update_record",
    "delete_record",
];

pub struct SupabaseClient {
    rest_url: String,
    api_key: String,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ReadRecords {
    table: String,
    #[serde(default)]
    filter: Option<FilterExpression>,
}

#[derive(Deserialize)]
struct CreateRecord {
    table: String,
    data: Value,
}

#[derive(Deserialize)]
struct UpdateRecord {
    table: String,
    data: Map<String, Value>,
    filter: FilterExpression,
}

#[derive(Deserialize)]
struct DeleteRecord {
    table: String,
    filter: FilterExpression,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            rest_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            timeout,
            client: build_client(timeout)?,
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.rest_url, path))
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn list_tables(&self) -> Result<McpResponse, ClientError> {
        let openapi = send_json(
            "list_tables",
            self.request(reqwest::Method::GET, ""),
            self.timeout,
        )
        .await?;
        Ok(McpResponse::new().with("tables", table_names(&openapi)))
    }

    async fn read_records(&self, params: ReadRecords) -> Result<McpResponse, ClientError> {
        check_table(&params.table)?;
        let mut query = vec![("select".to_string(), "*".to_string())];
        if let Some(filter) = &params.filter {
            query.extend(query_pairs(&filter.predicates()));
        }
        debug!(table = %params.table, predicates = query.len() - 1, "Reading records");

        let data = send_json(
            "read_records",
            self.request(reqwest::Method::GET, &params.table).query(&query),
            self.timeout,
        )
        .await?;
        Ok(McpResponse::new().with("data", data))
    }

    async fn create_record(&self, params: CreateRecord) -> Result<McpResponse, ClientError> {
        check_table(&params.table)?;
        if !(params.data.is_object() || params.data.is_array()) {
            return Err(ClientError::InvalidParameters(
                "create_record: data must be an object or an array of objects".into(),
            ));
        }

        let data = send_json(
            "create_record",
            self.request(reqwest::Method::POST, &params.table)
                .header("Prefer", "return=representation")
                .json(&params.data),
            self.timeout,
        )
        .await?;
        Ok(McpResponse::new().with("data", data))
    }

    async fn update_record(&self, params: UpdateRecord) -> Result<McpResponse, ClientError> {
        check_table(&params.table)?;
        let query = required_filter("update_record", &params.filter)?;

        let data = send_json(
            "update_record",
            self.request(reqwest::Method::PATCH, &params.table)
                .header("Prefer", "return=representation")
                .query(&query)
                .json(&params.data),
            self.timeout,
        )
        .await?;
        Ok(McpResponse::new().with("data", data))
    }

    async fn delete_record(&self, params: DeleteRecord) -> Result<McpResponse, ClientError> {
        check_table(&params.table)?;
        let query = required_filter("delete_record", &params.filter)?;

        let data = send_json(
            "delete_record",
            self.request(reqwest::Method::DELETE, &params.table)
                .header("Prefer", "return=representation")
                .query(&query),
            self.timeout,
        )
        .await?;
        Ok(McpResponse::new().with("data", data))
    }
}

#[async_trait]
impl CapabilityClient for SupabaseClient {
    fn service(&self) -> &str {
        "supabase"
    }

    fn operations(&self) -> &[&'static str] {
        OPERATIONS
    }

    async fn invoke(
        &self,
        action: &str,
        parameters: &Parameters,
    ) -> Result<McpResponse, ClientError> {
        match action {
            "list_tables" => self.list_tables().await,
            "read_records" => self.read_records(parse_parameters(action, parameters)?).await,
            "create_record" => self.create_record(parse_parameters(action, parameters)?).await,
            "update_record" => self.update_record(parse_parameters(action, parameters)?).await,
            "delete_record" => self.delete_record(parse_parameters(action, parameters)?).await,
            _ => Err(self.unsupported(action)),
        }
    }
}

fn check_table(table: &str) -> Result<(), ClientError> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(ClientError::InvalidParameters(format!(
            "invalid table name '{table}'"
        )))
    }
}

/// Writes must be scoped; an empty filter would touch every row.
fn required_filter(
    action: &str,
    filter: &FilterExpression,
) -> Result<Vec<(String, String)>, ClientError> {
    if filter.is_empty() {
        return Err(ClientError::InvalidParameters(format!(
            "{action}: filter must not be empty"
        )));
    }
    Ok(query_pairs(&filter.predicates()))
}

/// Render predicates as PostgREST `column=op.value` query pairs.
pub fn query_pairs(predicates: &[Predicate]) -> Vec<(String, String)> {
    predicates
        .iter()
        .map(|p| {
            let rendered = match (&p.op, &p.value) {
                (FilterOp::Eq, Value::Null) => "is.null".to_string(),
                (FilterOp::Neq, Value::Null) => "not.is.null".to_string(),
                (op, value) => format!("{op}.{}", render_value(value)),
            };
            (p.column.clone(), rendered)
        })
        .collect()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Table names from the PostgREST OpenAPI root document.
fn table_names(openapi: &Value) -> Vec<String> {
    let mut names: Vec<String> = match openapi.get("definitions").and_then(Value::as_object) {
        Some(definitions) => definitions.keys().cloned().collect(),
        None => openapi
            .get("paths")
            .and_then(Value::as_object)
            .map(|paths| {
                paths
                    .keys()
                    .map(|p| p.trim_start_matches('/'))
                    .filter(|p| !p.is_empty() && !p.starts_with("rpc/"))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
    };
    names.sort();
    names
}
