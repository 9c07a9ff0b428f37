//! Stub tier: deterministic canned responses.
//!
//! Used when neither the remote gateway nor a capability client handled the
//! request. Always answers, and answers identically for identical input.

use mcpgate_core::{McpRequest, McpResponse, Parameters};
use serde_json::{Map, Value, json};

/// The canned response for `(service, action)`, or a generic acknowledgement.
pub fn respond(request: &McpRequest) -> McpResponse {
    let parameters = &request.parameters;
    let canned = match (request.service.as_str(), request.action.as_str()) {
        ("youtube", "get_transcript") => {
            let url = parameters.get("url").and_then(Value::as_str).unwrap_or("");
            let lang = parameters.get("lang").and_then(Value::as_str).unwrap_or("en");
            Some(json!({
                "transcript": format!("Mock transcript for {url}"),
                "language": lang,
            }))
        }
        ("notion", "get_database_info") => Some(json!({
            "database": {"id": "sample-id", "title": "Sample Database"}
        })),
        ("supabase", "read_records") => {
            let table = parameters.get("table").and_then(Value::as_str).unwrap_or("");
            Some(json!({
                "data": [{"id": 1, "name": format!("Sample record from {table}")}]
            }))
        }
        ("supabase", "create_record") => Some(rows(record(json!(999), parameters.get("data")))),
        ("supabase", "update_record") => {
            Some(rows(record(filter_id(parameters), parameters.get("data"))))
        }
        ("supabase", "delete_record") => {
            let mut row = record(filter_id(parameters), None);
            row.insert("deleted".into(), Value::Bool(true));
            Some(rows(row))
        }
        _ => None,
    };

    canned
        .and_then(McpResponse::from_value)
        .unwrap_or_else(|| acknowledge(request))
}

/// `{id, ...data}`; fields in `data` override the id, as an object spread would.
fn record(id: Value, data: Option<&Value>) -> Map<String, Value> {
    let mut row = Map::new();
    row.insert("id".into(), id);
    if let Some(Value::Object(fields)) = data {
        row.extend(fields.clone());
    }
    row
}

/// `filter.id` when present, else 1.
fn filter_id(parameters: &Parameters) -> Value {
    parameters
        .get("filter")
        .and_then(|f| f.get("id"))
        .filter(|id| !id.is_null())
        .cloned()
        .unwrap_or_else(|| json!(1))
}

fn rows(row: Map<String, Value>) -> Value {
    json!({ "data": [Value::Object(row)] })
}

fn acknowledge(request: &McpRequest) -> McpResponse {
    McpResponse::new()
        .with("status", "success")
        .with(
            "message",
            format!("mock response for {}/{}", request.service, request.action),
        )
        .with("parameters", Value::Object(request.parameters.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(service: &str, action: &str, parameters: Value) -> McpRequest {
        McpRequest::new(service, action)
            .with_parameters(parameters.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn transcript_stub_echoes_url_and_lang() {
        let response = respond(&request(
            "youtube",
            "get_transcript",
            json!({"url": "abc", "lang": "es"}),
        ));
        assert_eq!(
            response.into_value(),
            json!({"transcript": "Mock transcript for abc", "language": "es"})
        );
    }

    #[test]
    fn transcript_stub_defaults_to_english() {
        let response = respond(&request("youtube", "get_transcript", json!({"url": "xyz"})));
        assert_eq!(response.get("language"), Some(&json!("en")));
    }

    #[test]
    fn notion_database_stub() {
        let response = respond(&request("notion", "get_database_info", json!({})));
        assert_eq!(response.get("database").unwrap()["title"], "Sample Database");
    }

    #[test]
    fn read_records_stub_names_the_table() {
        let response = respond(&request("supabase", "read_records", json!({"table": "users"})));
        assert_eq!(
            response.into_value(),
            json!({"data": [{"id": 1, "name": "Sample record from users"}]})
        );
    }

    #[test]
    fn create_record_stub_echoes_data() {
        let response = respond(&request(
            "supabase",
            "create_record",
            json!({"table": "users", "data": {"name": "Ada", "age": 36}}),
        ));
        assert_eq!(
            response.into_value(),
            json!({"data": [{"id": 999, "name": "Ada", "age": 36}]})
        );
    }

    #[test]
    fn update_record_stub_uses_filter_id() {
        let response = respond(&request(
            "supabase",
            "update_record",
            json!({"table": "users", "data": {"name": "Grace"}, "filter": {"id": 7}}),
        ));
        assert_eq!(
            response.into_value(),
            json!({"data": [{"id": 7, "name": "Grace"}]})
        );

        let without_filter = respond(&request(
            "supabase",
            "update_record",
            json!({"table": "users", "data": {"name": "Grace"}}),
        ));
        assert_eq!(without_filter.get("data").unwrap()[0]["id"], 1);
    }

    #[test]
    fn delete_record_stub_marks_deleted() {
        let response = respond(&request(
            "supabase",
            "delete_record",
            json!({"table": "users", "filter": {"id": 42}}),
        ));
        assert_eq!(
            response.into_value(),
            json!({"data": [{"id": 42, "deleted": true}]})
        );

        let without_filter = respond(&request("supabase", "delete_record", json!({"table": "users"})));
        assert_eq!(
            without_filter.into_value(),
            json!({"data": [{"id": 1, "deleted": true}]})
        );
    }

    #[test]
    fn unknown_pair_gets_generic_acknowledgement() {
        let response = respond(&request("supabase", "list_tables", json!({})));
        assert_eq!(
            response.into_value(),
            json!({
                "status": "success",
                "message": "mock response for supabase/list_tables",
                "parameters": {}
            })
        );
    }

    #[test]
    fn acknowledgement_echoes_parameters() {
        let params = json!({"table": "users", "filter": {"age": {"gt": 18}}});
        let response = respond(&request("weather", "forecast", params.clone()));
        assert_eq!(response.get("parameters"), Some(&params));
    }

    #[test]
    fn stub_is_deterministic() {
        let req = request("supabase", "read_records", json!({"table": "orders"}));
        assert_eq!(respond(&req), respond(&req));
    }
}
