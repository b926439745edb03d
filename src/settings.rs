use serde::Deserialize;
use std::time::Duration;

/// 应用设置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP/WebSocket 传输监听地址
    pub host: String,
    /// HTTP/WebSocket 传输监听端口
    pub port: u16,
    /// 调试日志
    pub debug: bool,
    /// Maven Central Solr 搜索接口
    pub search_url: String,
    /// 仓库根地址，用于读取 maven-metadata.xml
    pub repository_url: String,
    /// 单次上游请求超时（秒）
    pub request_timeout_secs: u64,
    /// 每页搜索结果数
    pub search_page_size: u32,
    /// 每次查询最多翻页数
    pub max_search_pages: u32,
    /// 版本缓存有效期（秒），0 表示禁用
    pub cache_ttl_secs: u64,
    /// 版本缓存容量，0 表示禁用
    pub cache_capacity: usize,
    /// 批量查询时的最大并发数
    pub batch_concurrency: usize,
}

impl Settings {
    /// 创建新的设置实例
    pub fn new() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            debug: false,
            search_url: default_search_url(),
            repository_url: default_repository_url(),
            request_timeout_secs: 30,
            search_page_size: 100,
            max_search_pages: 10,
            cache_ttl_secs: 300,
            cache_capacity: 512,
            batch_concurrency: 8,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// `RUST_LOG` 未设置时的默认日志级别
    pub fn default_log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }

    /// HTTP 传输的监听地址
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

fn default_search_url() -> String {
    "https://search.maven.org/solrsearch/select".to_string()
}

fn default_repository_url() -> String {
    "https://repo1.maven.org/maven2".to_string()
}
