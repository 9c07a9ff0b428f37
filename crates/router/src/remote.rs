//! Remote gateway client: the router's primary tier.
//!
//! Speaks the same protocol the router exposes: `POST {base}/{service}` with
//! `{action, parameters}`, and `GET {base}/health`. Timeouts are applied by
//! the caller so that probe and dispatch can use different bounds.

use async_trait::async_trait;
use mcpgate_core::{McpRequest, McpResponse, TransportError};
use tracing::debug;

/// A process implementing the `(service, action, parameters)` protocol.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Base URL, for diagnostics.
    fn base_url(&self) -> &str;

    /// Hit the health surface. `Ok` means a 2xx answer.
    async fn health(&self) -> Result<(), TransportError>;

    /// Forward a request. `Ok` carries the response body untouched.
    async fn call(&self, request: &McpRequest) -> Result<McpResponse, TransportError>;
}

/// HTTP implementation over reqwest.
pub struct HttpRemoteGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRemoteGateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl RemoteGateway for HttpRemoteGateway {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn health(&self) -> Result<(), TransportError> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(TransportError::Status {
                status_code: status.as_u16(),
                body: String::new(),
            })
        }
    }

    async fn call(&self, request: &McpRequest) -> Result<McpResponse, TransportError> {
        let url = format!("{}/{}", self.base_url, request.service);
        debug!(url = %url, action = %request.action, "Forwarding to remote gateway");

        let response = self
            .client
            .post(&url)
            .json(&request.body())
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status_code: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TransportError::MalformedBody(e.to_string()))?;

        McpResponse::from_value(body)
            .ok_or_else(|| TransportError::MalformedBody("expected a JSON object".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn fake_gateway() -> Router {
        Router::new()
            .route("/health", get(|| async { Json(json!({"status": "ok"})) }))
            .route(
                "/{service}",
                post(|Path(service): Path<String>, Json(body): Json<Value>| async move {
                    match service.as_str() {
                        "broken" => Err(StatusCode::INTERNAL_SERVER_ERROR),
                        "list" => Ok(Json(json!([1, 2, 3]))),
                        _ => Ok(Json(json!({"service": service, "echo": body}))),
                    }
                }),
            )
    }

    #[tokio::test]
    async fn call_returns_body_verbatim() {
        let base = spawn(fake_gateway()).await;
        let gateway = HttpRemoteGateway::new(format!("{base}/")).unwrap();
        assert_eq!(gateway.base_url(), base);

        let mut request = McpRequest::new("supabase", "list_tables");
        request.parameters.insert("table".into(), json!("users"));
        let response = gateway.call(&request).await.unwrap();
        assert_eq!(
            response.into_value(),
            json!({
                "service": "supabase",
                "echo": {"action": "list_tables", "parameters": {"table": "users"}}
            })
        );
    }

    #[tokio::test]
    async fn call_keeps_remote_key_order() {
        let app = Router::new().route(
            "/{service}",
            post(|| async {
                (
                    [("content-type", "application/json")],
                    r#"{"zeta": 1, "alpha": {"y": true, "b": false}, "mid": null}"#,
                )
            }),
        );
        let base = spawn(app).await;
        let gateway = HttpRemoteGateway::new(base).unwrap();

        let response = gateway
            .call(&McpRequest::new("supabase", "list_tables"))
            .await
            .unwrap();
        let keys: Vec<&str> = response.as_map().keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"zeta":1,"alpha":{"y":true,"b":false},"mid":null}"#
        );
    }

    #[tokio::test]
    async fn error_status_is_transport_error() {
        let base = spawn(fake_gateway()).await;
        let gateway = HttpRemoteGateway::new(base).unwrap();
        let err = gateway
            .call(&McpRequest::new("broken", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Status { status_code: 500, .. }));
    }

    #[tokio::test]
    async fn non_object_body_is_malformed() {
        let base = spawn(fake_gateway()).await;
        let gateway = HttpRemoteGateway::new(base).unwrap();
        let err = gateway.call(&McpRequest::new("list", "x")).await.unwrap_err();
        assert!(matches!(err, TransportError::MalformedBody(_)));
    }

    #[tokio::test]
    async fn health_ok_and_connection_refused() {
        let base = spawn(fake_gateway()).await;
        assert!(HttpRemoteGateway::new(base).unwrap().health().await.is_ok());

        let dead = HttpRemoteGateway::new("http://127.0.0.1:9").unwrap();
        assert!(matches!(
            dead.health().await,
            Err(TransportError::Network(_))
        ));
    }
}
