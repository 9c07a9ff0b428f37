//! `mcpgate call`: Dispatch one request in-process.

use mcpgate_core::{McpRequest, Parameters};
use std::path::Path;
use tracing::debug;

pub async fn run(
    config_path: Option<&Path>,
    service: String,
    action: String,
    params: Option<String>,
    trace: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let parameters = parse_params(params.as_deref())?;

    let clients = mcpgate_clients::build_registry(&config)?;
    let router = mcpgate_router::build_from_config(&config, clients)?;

    let report = router
        .dispatch_report(McpRequest::new(service, action).with_parameters(parameters))
        .await;

    debug!(
        request_id = %report.request_id,
        attempts = report.attempts.len(),
        "Dispatch finished"
    );
    println!("{}", serde_json::to_string_pretty(&report.response)?);

    match report.served_by {
        Some(tier) => eprintln!("served by: {tier}"),
        None => eprintln!("rejected: no tier attempted"),
    }
    if trace {
        for attempt in &report.attempts {
            eprintln!(
                "  {:<6} {:?} {}ms {}",
                attempt.tier.as_str(),
                attempt.status,
                attempt.elapsed_ms,
                attempt.reason.as_deref().unwrap_or("")
            );
        }
    }

    Ok(())
}

/// Parse `--params`; absent means an empty object.
fn parse_params(raw: Option<&str>) -> Result<Parameters, Box<dyn std::error::Error>> {
    let Some(raw) = raw else {
        return Ok(Parameters::new());
    };
    match serde_json::from_str::<serde_json::Value>(raw)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(format!("--params must be a JSON object, got {other}").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn call_dispatches_with_default_config() {
        let missing = std::env::temp_dir().join("mcpgate-call-test-missing.toml");
        run(
            Some(&missing),
            "youtube".into(),
            "get_transcript".into(),
            Some(r#"{"url": "abc"}"#.into()),
            true,
        )
        .await
        .unwrap();
    }

    #[test]
    fn params_default_to_empty() {
        assert!(parse_params(None).unwrap().is_empty());
    }

    #[test]
    fn params_must_be_an_object() {
        assert!(parse_params(Some("[1, 2]")).is_err());
        assert!(parse_params(Some("{oops")).is_err());
        let params = parse_params(Some(r#"{"table": "users"}"#)).unwrap();
        assert_eq!(params["table"], "users");
    }
}
