//! Document workspace client (Notion API).

use async_trait::async_trait;
use mcpgate_config::NotionConfig;
use mcpgate_core::client::parse_parameters;
use mcpgate_core::{CapabilityClient, ClientError, McpResponse, Parameters};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

use crate::http::{build_client, send_json};

pub struct NotionClient {
    api_url: String,
    token: String,
    api_version: String,
    default_database: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct GetDatabaseInfo {
    #[serde(default)]
    database_id: Option<String>,
}

impl NotionClient {
    pub fn new(config: &NotionConfig, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            api_version: config.api_version.clone(),
            default_database: config.database_id.clone(),
            timeout,
            client: build_client(timeout)?,
        })
    }

    async fn get_database_info(&self, params: GetDatabaseInfo) -> Result<McpResponse, ClientError> {
        let database_id = params
            .database_id
            .filter(|id| !id.trim().is_empty())
            .or_else(|| self.default_database.clone())
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                ClientError::InvalidParameters(
                    "get_database_info: database_id is required (none configured)".into(),
                )
            })?;

        let request = self
            .client
            .get(format!("{}/databases/{}", self.api_url, database_id))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", &self.api_version);
        let database = send_json("get_database_info", request, self.timeout).await?;

        Ok(McpResponse::new().with("database", summarize(&database)))
    }
}

#[async_trait]
impl CapabilityClient for NotionClient {
    fn service(&self) -> &str {
        "notion"
    }

    fn operations(&self) -> &[&'static str] {
        &["get_database_info"]
    }

    async fn invoke(
        &self,
        action: &str,
        parameters: &Parameters,
    ) -> Result<McpResponse, ClientError> {
        match action {
            "get_database_info" => {
                self.get_database_info(parse_parameters(action, parameters)?)
                    .await
            }
            _ => Err(self.unsupported(action)),
        }
    }
}

/// Reduce a Notion database object to `{id, title, url, properties}`.
fn summarize(database: &Value) -> Value {
    let title: String = database
        .get("title")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("plain_text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();

    let mut properties: Vec<&str> = database
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| props.keys().map(String::as_str).collect())
        .unwrap_or_default();
    properties.sort_unstable();

    json!({
        "id": database.get("id").cloned().unwrap_or(Value::Null),
        "title": title,
        "url": database.get("url").cloned().unwrap_or(Value::Null),
        "properties": properties,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(api_url: &str, database_id: Option<&str>) -> NotionClient {
        NotionClient::new(
            &NotionConfig {
                token: "secret_token".into(),
                database_id: database_id.map(str::to_string),
                api_url: api_url.into(),
                api_version: "2022-06-28".into(),
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn fake_notion() -> Router {
        Router::new().route(
            "/databases/{id}",
            get(
                |Path(id): Path<String>, headers: HeaderMap| async move {
                    if headers.get("Notion-Version").is_none() {
                        return Err(StatusCode::BAD_REQUEST);
                    }
                    Ok(Json(json!({
                        "object": "database",
                        "id": id,
                        "url": "https://www.notion.so/db",
                        "title": [{"plain_text": "Road"}, {"plain_text": "map"}],
                        "properties": {"Status": {}, "Name": {}}
                    })))
                },
            ),
        )
    }

    #[test]
    fn summarize_joins_title_parts() {
        let summary = summarize(&json!({
            "id": "abc",
            "title": [{"plain_text": "Sample "}, {"plain_text": "Database"}]
        }));
        assert_eq!(summary["id"], "abc");
        assert_eq!(summary["title"], "Sample Database");
        assert_eq!(summary["properties"], json!([]));
    }

    #[tokio::test]
    async fn uses_configured_default_database() {
        let base = spawn(fake_notion()).await;
        let result = client(&base, Some("db-42"))
            .invoke("get_database_info", &Parameters::new())
            .await
            .unwrap();
        let database = result.get("database").unwrap();
        assert_eq!(database["id"], "db-42");
        assert_eq!(database["title"], "Roadmap");
        assert_eq!(database["properties"], json!(["Name", "Status"]));
    }

    #[tokio::test]
    async fn explicit_database_id_wins() {
        let base = spawn(fake_notion()).await;
        let mut params = Parameters::new();
        params.insert("database_id".into(), json!("other"));
        let result = client(&base, Some("db-42"))
            .invoke("get_database_info", &params)
            .await
            .unwrap();
        assert_eq!(result.get("database").unwrap()["id"], "other");
    }

    #[tokio::test]
    async fn blank_database_id_uses_default() {
        let base = spawn(fake_notion()).await;
        let mut params = Parameters::new();
        params.insert("database_id".into(), json!("  "));
        let result = client(&base, Some("db-42"))
            .invoke("get_database_info", &params)
            .await
            .unwrap();
        assert_eq!(result.get("database").unwrap()["id"], "db-42");
    }

    #[tokio::test]
    async fn missing_database_id_is_invalid() {
        let err = client("http://127.0.0.1:9", None)
            .invoke("get_database_info", &Parameters::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn create_page_declines() {
        let err = client("http://127.0.0.1:9", None)
            .invoke("create_page", &Parameters::new())
            .await
            .unwrap_err();
        assert!(err.is_decline());
    }
}
