//! 标准输入输出传输
//!
//! 每行一条 JSON-RPC 消息。日志只写 stderr，stdout 只承载协议。

use log::{info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::server::{handle_jsonrpc, JsonRpcRequest, JsonRpcResponse, MavenMCP};

/// 在进程的 stdin/stdout 上运行，直到输入结束
pub async fn serve_stdio(mcp: &MavenMCP) -> std::io::Result<()> {
    info!("Serving MCP over stdio");
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve_lines(mcp, stdin, stdout).await
}

/// 逐行读取请求并写回响应
pub async fn serve_lines<R, W>(mcp: &MavenMCP, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => handle_jsonrpc(mcp, request).await,
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                Some(JsonRpcResponse::parse_error(e))
            }
        };

        if let Some(response) = response {
            let mut text = serde_json::to_string(&response)?;
            text.push('\n');
            writer.write_all(text.as_bytes()).await?;
            writer.flush().await?;
        }
    }
    info!("stdin closed, shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::PARSE_ERROR;
    use serde_json::Value;

    #[tokio::test]
    async fn answers_requests_line_by_line() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n",
            "not json\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n",
        );
        let mut output = Vec::new();
        serve_lines(&MavenMCP::new(), input.as_bytes(), &mut output)
            .await
            .unwrap();

        let responses: Vec<JsonRpcResponse> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0].id, Some(Value::from(1)));
        assert_eq!(responses[1].error.as_ref().unwrap().code, PARSE_ERROR);
        assert_eq!(responses[2].result.as_ref().unwrap()["tools"], Value::Array(vec![]));
    }

    #[tokio::test]
    async fn null_id_still_gets_a_reply() {
        let input = concat!(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#, "\n");
        let mut output = Vec::new();
        serve_lines(&MavenMCP::new(), input.as_bytes(), &mut output)
            .await
            .unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].as_object().unwrap().contains_key("id"));
        assert_eq!(lines[0]["id"], Value::Null);
        assert_eq!(lines[0]["result"], serde_json::json!({}));
    }
}
