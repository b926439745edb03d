//! maven-check-mcp - 查询 Maven Central 依赖版本的 MCP 服务器
//!
//! 这个库提供版本解析、比较与选择，以及通过 MCP 协议暴露的五个工具：
//!
//! - `get_maven_latest_version`: 最新稳定版本
//! - `check_maven_version_exists`: 指定版本是否存在
//! - `find_maven_latest_component_version`: 按 major/minor/patch 查找最新版本
//! - `get_maven_all_latest_versions`: 一次取回三个维度的最新版本
//! - `batch_maven_versions_check`: 批量检查
//!
//! 支持 stdio、HTTP 和 WebSocket 三种传输。
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use maven_check_mcp::{create_app, register_tools, MavenMCP, MavenService, Settings};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::new();
//!     let service = Arc::new(MavenService::from_settings(&settings)?);
//!
//!     let mut mcp = MavenMCP::new();
//!     register_tools(&mut mcp, service)?;
//!
//!     let listener = tokio::net::TcpListener::bind(settings.bind_address()).await?;
//!     axum::serve(listener, create_app(mcp)).await?;
//!     Ok(())
//! }
//! ```
//!
//! 版本选择也可以脱离服务器单独使用：
//!
//! ```rust
//! use maven_check_mcp::{ParsedVersion, SelectionPolicy, Selector};
//!
//! let versions: Vec<ParsedVersion> = ["1.9.0", "2.0.0-RC1", "1.10.2"]
//!     .iter()
//!     .map(|v| ParsedVersion::parse(v))
//!     .collect();
//! let latest = Selector::new().select(&versions, SelectionPolicy::AbsoluteLatest);
//! assert_eq!(latest.map(|v| v.raw()), Some("1.10.2"));
//! ```

pub mod maven;
pub mod server;
pub mod settings;

pub use maven::{
    register_tools, ErrorCode, MavenError, MavenService, ParsedVersion, ResultEnvelope,
    SelectionPolicy, Selector, VersionKind,
};
pub use server::tools::{DuplicateBehavior as ToolDuplicateBehavior, FunctionTool, ToolAnnotations};
pub use server::{create_app, MavenMCP};
pub use settings::Settings;

/// 获取库版本
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
