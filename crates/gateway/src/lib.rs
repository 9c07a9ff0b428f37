//! HTTP surface for mcpgate.
//!
//! Exposes the same `(service, action, parameters)` protocol the remote
//! gateway speaks, so callers can point at either one:
//!
//! - `POST /mcp/{service}` with `{action, parameters?}`
//! - `GET /health`
//! - `GET /` (service index)
//!
//! Built on Axum; every request is resolved by the tiered router.

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::{
    Router,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use mcpgate_config::AppConfig;
use mcpgate_core::ActionBody;
use mcpgate_router::{GatewayRouter, INVALID_REQUEST};

/// Header naming the tier that produced the response.
pub const TIER_HEADER: &str = "x-mcp-tier";

/// Services the gateway knows about, reported in `/health` whether or not a
/// client is configured for them.
const KNOWN_SERVICES: [&str; 3] = ["notion", "supabase", "youtube"];

type SharedRouter = Arc<GatewayRouter>;

/// Build the Axum router with all gateway routes.
pub fn build_router(router: SharedRouter) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/mcp/{service}", post(dispatch_handler))
        .with_state(router)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server and run until Ctrl-C.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let clients = mcpgate_clients::build_registry(&config)?;
    let router = Arc::new(mcpgate_router::build_from_config(&config, clients)?);

    // Seed the health snapshot; the periodic prober starts with an immediate tick.
    let prober_task = router.prober().cloned().map(|prober| {
        match config.remote.probe_interval() {
            Some(interval) => prober.spawn_periodic(interval),
            None => tokio::spawn(async move {
                prober.probe().await;
            }),
        }
    });

    let app = build_router(router);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(task) = prober_task {
        task.abort();
    }
    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

// --- Handlers ---

async fn dispatch_handler(
    State(router): State<SharedRouter>,
    Path(service): Path<String>,
    body: Result<Json<ActionBody>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!(service = %service, error = %rejection, "Unparseable request body");
            return invalid_request();
        }
    };

    let report = router.dispatch_report(body.into_request(service)).await;
    match report.served_by {
        Some(tier) => ([(TIER_HEADER, tier.as_str())], Json(report.response)).into_response(),
        None => invalid_request(),
    }
}

fn invalid_request() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": INVALID_REQUEST })),
    )
        .into_response()
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    remote_gateway: RemoteHealth,
    clients: BTreeMap<String, bool>,
}

#[derive(Serialize)]
struct RemoteHealth {
    url: Option<String>,
    enabled: bool,
    /// `None` until the first probe completes.
    reachable: Option<bool>,
    last_checked: Option<DateTime<Utc>>,
}

async fn health_handler(State(router): State<SharedRouter>) -> Json<HealthResponse> {
    let state = router.prober().and_then(|p| p.state());

    let mut clients: BTreeMap<String, bool> = KNOWN_SERVICES
        .iter()
        .map(|s| (s.to_string(), false))
        .collect();
    for service in router.clients().services() {
        clients.insert(service.to_string(), true);
    }

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        remote_gateway: RemoteHealth {
            url: router.remote_url().map(str::to_string),
            enabled: router.prober().is_some(),
            reachable: state.map(|s| s.reachable),
            last_checked: state.map(|s| s.last_checked),
        },
        clients,
    })
}

#[derive(Serialize)]
struct IndexResponse {
    name: &'static str,
    version: &'static str,
    endpoints: Vec<&'static str>,
    services: BTreeMap<String, Vec<&'static str>>,
}

async fn index_handler(State(router): State<SharedRouter>) -> Json<IndexResponse> {
    let services = router
        .clients()
        .services()
        .into_iter()
        .filter_map(|name| {
            router
                .clients()
                .get(name)
                .map(|client| (name.to_string(), client.operations().to_vec()))
        })
        .collect();

    Json(IndexResponse {
        name: "mcpgate",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: vec!["POST /mcp/{service}", "GET /health"],
        services,
    })
}
