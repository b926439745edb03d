use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use maven_check_mcp::maven::{InMemorySource, VersionCache};
use maven_check_mcp::{create_app, register_tools, MavenMCP, MavenService};

fn app() -> Router {
    let source = InMemorySource::new()
        .with_versions(
            "org.apache.commons:commons-lang3",
            "jar",
            &["3.12.0", "3.13.0", "3.14.0", "3.15.0-RC1"],
        )
        .with_versions("org.json:json", "jar", &["20231013", "20240303"])
        .with_failure("com.example:flaky", 503);
    let service = MavenService::new(Arc::new(source), VersionCache::disabled());
    let mut mcp = MavenMCP::new();
    register_tools(&mut mcp, Arc::new(service)).unwrap();
    create_app(mcp)
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn rpc(method: &str, params: Value) -> Value {
    let (status, body) = post_json(
        app(),
        "/mcp",
        json!({"jsonrpc": "2.0", "id": 7, "method": method, "params": params}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 7);
    body
}

fn envelope_text(body: &Value) -> Value {
    let text = body["result"]["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}

#[tokio::test]
async fn health_check() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn lists_tools_with_schemas() {
    let body = rpc("tools/list", json!({})).await;
    let tools = body["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 5);

    let component = tools
        .iter()
        .find(|t| t["name"] == "find_maven_latest_component_version")
        .unwrap();
    assert_eq!(
        component["inputSchema"]["required"],
        json!(["dependency", "version", "target_component"])
    );
    assert_eq!(component["annotations"]["readOnlyHint"], true);
}

#[tokio::test]
async fn tools_call_success() {
    let body = rpc(
        "tools/call",
        json!({
            "name": "get_maven_all_latest_versions",
            "arguments": {"dependency": "org.apache.commons:commons-lang3", "version": "3.12.0"}
        }),
    )
    .await;
    assert_eq!(body["result"]["isError"], false);
    assert_eq!(
        envelope_text(&body),
        json!({
            "tool_name": "get_maven_all_latest_versions",
            "status": "success",
            "result": {
                "latest_major_version": "3.14.0",
                "latest_minor_version": "3.14.0",
                "latest_patch_version": "3.12.0"
            }
        })
    );
}

#[tokio::test]
async fn tools_call_error_sets_is_error() {
    let body = rpc(
        "tools/call",
        json!({
            "name": "get_maven_latest_version",
            "arguments": {"dependency": "com.example:flaky"}
        }),
    )
    .await;
    assert_eq!(body["result"]["isError"], true);
    let envelope = envelope_text(&body);
    assert_eq!(envelope["status"], "error");
    assert_eq!(envelope["error"]["code"], "MAVEN_API_ERROR");
}

#[tokio::test]
async fn batch_partial_success_is_not_an_error() {
    let body = rpc(
        "tools/call",
        json!({
            "name": "batch_maven_versions_check",
            "arguments": {"dependencies": [
                {"dependency": "org.json:json", "version": "20231013"},
                {"dependency": "com.example:missing", "version": "1.0.0"}
            ]}
        }),
    )
    .await;
    assert_eq!(body["result"]["isError"], false);
    let envelope = envelope_text(&body);
    assert_eq!(envelope["status"], "partial_success");
    assert_eq!(
        envelope["result"]["summary"],
        json!({"total": 2, "success": 1, "failed": 1})
    );
    assert_eq!(
        envelope["result"]["dependencies"][1]["error"]["code"],
        "DEPENDENCY_NOT_FOUND"
    );
}

#[tokio::test]
async fn call_tool_endpoint_returns_envelope() {
    let (status, body) = post_json(
        app(),
        "/mcp/call-tool",
        json!({
            "name": "check_maven_version_exists",
            "arguments": {"dependency": "org.apache.commons:commons-lang3", "version": "3.13.0"}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], json!({"exists": true}));

    let (status, _) = post_json(app(), "/mcp/call-tool", json!({"name": "nope"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_jsonrpc_is_parse_error() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mcp")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], -32700);
}

#[tokio::test]
async fn notifications_are_accepted_without_body() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mcp")
                .body(Body::from(
                    json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}
