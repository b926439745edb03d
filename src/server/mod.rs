//! MCP 服务器模块
//!
//! 这个模块包含协议层的全部实现：
//! - [MavenMCP][]: 核心管理器，持有已注册的工具
//! - [handle_jsonrpc][]: 三种传输共用的 JSON-RPC 分发
//! - [create_app][]: HTTP / WebSocket 的 Axum 路由
//!
//! ## 模块结构
//!
//! - [tools](tools/index.html): 工具管理实现
//! - [ws](ws/index.html): WebSocket支持实现
//! - [stdio](stdio/index.html): 标准输入输出传输

pub mod stdio;
pub mod tools;
pub mod ws;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

pub use tools::{DuplicateBehavior, FunctionTool, ToolAnnotations, ToolArguments, ToolManager};

/// MCP 协议版本
pub const PROTOCOL_VERSION: &str = "2024-11-05";
/// 对外公布的服务器名称
pub const SERVER_NAME: &str = "maven-check-mcp";

/// 核心类
#[derive(Debug, Clone, Default)]
pub struct MavenMCP {
    tool_manager: ToolManager,
}

impl MavenMCP {
    /// 创建新的实例
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用指定的重复行为创建新的实例
    pub fn with_behavior(tool_behavior: DuplicateBehavior) -> Self {
        Self {
            tool_manager: ToolManager::with_behavior(tool_behavior),
        }
    }

    /// 添加工具
    pub fn add_tool(&mut self, tool: FunctionTool) -> Result<(), String> {
        self.tool_manager.add_tool(tool)
    }

    /// 列出所有工具
    pub fn mcp_list_tools(&self) -> Vec<&FunctionTool> {
        self.tool_manager.list_tools()
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tool_manager.get_tool(name).is_some()
    }

    /// 调用工具
    pub async fn mcp_call_tool(&self, name: &str, arguments: ToolArguments) -> Result<Value, String> {
        self.tool_manager.call_tool(name, arguments).await
    }
}

// JSON-RPC数据结构定义
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
    /// 缺少 `id` 为通知；显式的 `"id": null` 仍是请求
    #[serde(
        default,
        deserialize_with = "present_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<Value>,
}

fn present_id<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

// JSON-RPC响应结构
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

// JSON-RPC错误结构
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;

impl JsonRpcResponse {
    pub fn result(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// 无法解析的请求
    pub fn parse_error(e: impl std::fmt::Display) -> Self {
        Self::error(None, PARSE_ERROR, format!("Parse error: {}", e))
    }
}

#[derive(Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: ToolArguments,
}

/// 处理一条 JSON-RPC 消息；通知（没有 id 字段）不产生响应
pub async fn handle_jsonrpc(mcp: &MavenMCP, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
    debug!(
        "Received JSON-RPC request: method={}, id={:?}",
        request.method, request.id
    );

    if request.id.is_none() {
        debug!("Received notification: {}", request.method);
        return None;
    }

    let id = request.id;
    let response = match request.method.as_str() {
        "initialize" => JsonRpcResponse::result(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {
                        "listChanged": false
                    }
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": crate::version()
                }
            }),
        ),
        "ping" => JsonRpcResponse::result(id, json!({})),
        "tools/list" => JsonRpcResponse::result(id, json!({ "tools": mcp.mcp_list_tools() })),
        "tools/call" => {
            let params = match request.params {
                Some(params) => params,
                None => return Some(JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params")),
            };
            let params: CallToolParams = match serde_json::from_value(params) {
                Ok(params) => params,
                Err(e) => {
                    return Some(JsonRpcResponse::error(
                        id,
                        INVALID_PARAMS,
                        format!("Invalid params: {}", e),
                    ))
                }
            };

            match mcp.mcp_call_tool(&params.name, params.arguments).await {
                Ok(result) => {
                    let is_error = result.get("status").and_then(Value::as_str) == Some("error");
                    JsonRpcResponse::result(id, tool_content(&result, is_error))
                }
                Err(e) => {
                    warn!("tools/call {} failed: {}", params.name, e);
                    JsonRpcResponse::result(id, tool_content(&Value::String(e), true))
                }
            }
        }
        other => {
            warn!("Method not found: {}", other);
            JsonRpcResponse::error(id, METHOD_NOT_FOUND, "Method not found")
        }
    };
    Some(response)
}

fn tool_content(result: &Value, is_error: bool) -> Value {
    let text = match result {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    json!({
        "content": [{
            "type": "text",
            "text": text
        }],
        "isError": is_error
    })
}

/// 创建Axum应用
pub fn create_app(mcp: MavenMCP) -> Router {
    let shared_state = Arc::new(mcp);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/mcp/tools", get(mcp_list_tools_handler))
        .route("/mcp/call-tool", post(mcp_call_tool_handler))
        .route("/mcp", post(mcp_jsonrpc_handler))
        .route("/mcp/ws", get(ws::ws_handler))
        .with_state(shared_state)
}

// HTTP处理函数
async fn root() -> String {
    format!("Welcome to {} {}!", SERVER_NAME, crate::version())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn mcp_list_tools_handler(State(mcp): State<Arc<MavenMCP>>) -> Json<Value> {
    Json(json!(mcp.mcp_list_tools()))
}

async fn mcp_call_tool_handler(
    State(mcp): State<Arc<MavenMCP>>,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, String)> {
    let request: CallToolParams = serde_json::from_slice(&body)
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid JSON: {}", e)))?;

    if !mcp.has_tool(&request.name) {
        return Err((
            StatusCode::NOT_FOUND,
            format!("Tool '{}' not found", request.name),
        ));
    }

    match mcp.mcp_call_tool(&request.name, request.arguments).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            error!("Tool '{}' failed: {}", request.name, e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e))
        }
    }
}

async fn mcp_jsonrpc_handler(State(mcp): State<Arc<MavenMCP>>, body: Bytes) -> impl IntoResponse {
    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            warn!("Failed to parse JSON-RPC request: {}", e);
            return (StatusCode::OK, Json(JsonRpcResponse::parse_error(e))).into_response();
        }
    };

    let method = request.method.clone();
    match handle_jsonrpc(&mcp, request).await {
        Some(response) => {
            info!("Handled JSON-RPC {} over HTTP", method);
            (StatusCode::OK, Json(response)).into_response()
        }
        None => StatusCode::ACCEPTED.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: &str, id: Option<Value>, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id,
        }
    }

    fn mcp() -> MavenMCP {
        let mut mcp = MavenMCP::new();
        mcp.add_tool(FunctionTool::from_function(
            |args: ToolArguments| async move {
                let fail = args
                    .and_then(|map| map.get("fail").and_then(Value::as_bool))
                    .unwrap_or(false);
                let status = if fail { "error" } else { "success" };
                Ok::<_, String>(json!({"tool_name": "lookup", "status": status}))
            },
            "lookup",
            "Returns a fixed envelope",
            None,
            None,
        ))
        .unwrap();
        mcp
    }

    #[tokio::test]
    async fn notifications_have_no_response() {
        let response = handle_jsonrpc(&mcp(), request("notifications/initialized", None, None)).await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn null_id_is_a_request() {
        let mcp = mcp();
        let request: JsonRpcRequest =
            serde_json::from_value(json!({"jsonrpc": "2.0", "method": "ping", "id": null})).unwrap();
        assert_eq!(request.id, Some(Value::Null));
        let response = handle_jsonrpc(&mcp, request).await.unwrap();
        assert_eq!(response.id, Some(Value::Null));
        assert_eq!(response.result, Some(json!({})));
        let wire = serde_json::to_value(&response).unwrap();
        assert_eq!(wire["id"], Value::Null);

        let notification: JsonRpcRequest =
            serde_json::from_value(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
                .unwrap();
        assert_eq!(notification.id, None);
        assert!(handle_jsonrpc(&mcp, notification).await.is_none());
    }

    #[tokio::test]
    async fn initialize_reports_tools_capability() {
        let response = handle_jsonrpc(&mcp(), request("initialize", Some(json!(1)), None))
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        assert!(result["capabilities"]["tools"].is_object());
        assert_eq!(response.id, Some(json!(1)));
    }

    #[tokio::test]
    async fn tools_call_marks_error_envelopes() {
        let mcp = mcp();
        let ok = handle_jsonrpc(
            &mcp,
            request("tools/call", Some(json!(2)), Some(json!({"name": "lookup"}))),
        )
        .await
        .unwrap();
        assert_eq!(ok.result.unwrap()["isError"], false);

        let failed = handle_jsonrpc(
            &mcp,
            request(
                "tools/call",
                Some(json!(3)),
                Some(json!({"name": "lookup", "arguments": {"fail": true}})),
            ),
        )
        .await
        .unwrap();
        let result = failed.result.unwrap();
        assert_eq!(result["isError"], true);
        let text = result["content"][0]["text"].as_str().unwrap();
        let envelope: Value = serde_json::from_str(text).unwrap();
        assert_eq!(envelope["status"], "error");
    }

    #[tokio::test]
    async fn protocol_errors() {
        let mcp = mcp();
        let unknown_tool = handle_jsonrpc(
            &mcp,
            request("tools/call", Some(json!(4)), Some(json!({"name": "nope"}))),
        )
        .await
        .unwrap();
        assert_eq!(unknown_tool.result.unwrap()["isError"], true);

        let missing = handle_jsonrpc(&mcp, request("tools/call", Some(json!(5)), None))
            .await
            .unwrap();
        assert_eq!(missing.error.unwrap().code, INVALID_PARAMS);

        let unknown_method = handle_jsonrpc(&mcp, request("resources/list", Some(json!(6)), None))
            .await
            .unwrap();
        assert_eq!(unknown_method.error.unwrap().code, METHOD_NOT_FOUND);
    }
}
