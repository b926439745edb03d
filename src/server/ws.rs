//! WebSocket传输层
//!
//! 每条文本消息是一条 JSON-RPC 请求，交给 [`handle_jsonrpc`] 处理。

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use std::sync::Arc;

use crate::server::{handle_jsonrpc, JsonRpcRequest, JsonRpcResponse, MavenMCP};

/// WebSocket连接处理函数
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<MavenMCP>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// 处理WebSocket连接
async fn handle_socket(socket: WebSocket, state: Arc<MavenMCP>) {
    info!("WebSocket connection established");

    let (mut sender, mut receiver) = socket.split();

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => {
                debug!("Received message: {}", text);
                if let Err(e) = handle_message(&text, &state, &mut sender).await {
                    warn!("Error handling message: {}", e);
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    info!("WebSocket connection closed");
}

/// 处理接收到的消息
async fn handle_message(
    text: &str,
    state: &MavenMCP,
    sender: &mut SplitSink<WebSocket, Message>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let response = match serde_json::from_str::<JsonRpcRequest>(text) {
        Ok(request) => handle_jsonrpc(state, request).await,
        Err(e) => {
            warn!("Failed to parse JSON-RPC message: {}", e);
            Some(JsonRpcResponse::parse_error(e))
        }
    };

    if let Some(response) = response {
        let response_text = serde_json::to_string(&response)?;
        sender.send(Message::Text(response_text)).await?;
    }
    Ok(())
}
