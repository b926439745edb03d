//! maven-check 命令行入口

use clap::{Parser, ValueEnum};
use log::{error, info};
use std::process::ExitCode;
use std::sync::Arc;

use maven_check_mcp::server::stdio::serve_stdio;
use maven_check_mcp::{create_app, register_tools, MavenMCP, MavenService, Settings, ToolDuplicateBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    /// 标准输入输出
    Stdio,
    /// HTTP JSON-RPC，同时提供 WebSocket
    Http,
    /// 与 http 相同
    Ws,
}

/// Maven Central 版本查询 MCP 服务器
#[derive(Debug, Parser)]
#[command(name = "maven-check", version, about)]
struct Cli {
    /// Enable debug logging
    #[arg(long, env = "MAVEN_CHECK_DEBUG")]
    debug: bool,

    /// Transport to serve MCP on
    #[arg(long, value_enum, default_value_t = Transport::Stdio, env = "MAVEN_CHECK_TRANSPORT")]
    transport: Transport,

    /// Bind host for the http/ws transport
    #[arg(long, default_value = "127.0.0.1", env = "MAVEN_CHECK_HOST")]
    host: String,

    /// Bind port for the http/ws transport
    #[arg(long, default_value_t = 8000, env = "MAVEN_CHECK_PORT")]
    port: u16,

    /// Maven Central Solr search endpoint
    #[arg(long, default_value = "https://search.maven.org/solrsearch/select", env = "MAVEN_CHECK_SEARCH_URL")]
    search_url: String,

    /// Repository root used for maven-metadata.xml lookups
    #[arg(long, default_value = "https://repo1.maven.org/maven2", env = "MAVEN_CHECK_REPOSITORY_URL")]
    repository_url: String,

    /// Upstream request timeout in seconds
    #[arg(long, default_value_t = 30, env = "MAVEN_CHECK_REQUEST_TIMEOUT")]
    request_timeout_secs: u64,

    /// Rows requested per search page
    #[arg(long, default_value_t = 100, env = "MAVEN_CHECK_SEARCH_PAGE_SIZE")]
    search_page_size: u32,

    /// Maximum search pages fetched per query
    #[arg(long, default_value_t = 10, env = "MAVEN_CHECK_MAX_SEARCH_PAGES")]
    max_search_pages: u32,

    /// Version cache TTL in seconds, 0 disables caching
    #[arg(long, default_value_t = 300, env = "MAVEN_CHECK_CACHE_TTL")]
    cache_ttl_secs: u64,

    /// Maximum cached artifact queries, 0 disables caching
    #[arg(long, default_value_t = 512, env = "MAVEN_CHECK_CACHE_CAPACITY")]
    cache_capacity: usize,

    /// Maximum batch items checked concurrently
    #[arg(long, default_value_t = 8, env = "MAVEN_CHECK_BATCH_CONCURRENCY")]
    batch_concurrency: usize,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            host: self.host.clone(),
            port: self.port,
            debug: self.debug,
            search_url: self.search_url.clone(),
            repository_url: self.repository_url.clone(),
            request_timeout_secs: self.request_timeout_secs,
            search_page_size: self.search_page_size,
            max_search_pages: self.max_search_pages,
            cache_ttl_secs: self.cache_ttl_secs,
            cache_capacity: self.cache_capacity,
            batch_concurrency: self.batch_concurrency,
        }
    }
}

fn init_logging(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();
}

async fn run(transport: Transport, settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let service = Arc::new(MavenService::from_settings(&settings)?);

    let mut mcp = MavenMCP::with_behavior(ToolDuplicateBehavior::Error);
    register_tools(&mut mcp, service)?;

    match transport {
        Transport::Stdio => serve_stdio(&mcp).await?,
        Transport::Http | Transport::Ws => {
            let address = settings.bind_address();
            let listener = tokio::net::TcpListener::bind(&address).await?;
            info!("HTTP endpoints available at http://{}", address);
            info!("MCP JSON-RPC endpoint available at http://{}/mcp", address);
            info!("WebSocket endpoint available at ws://{}/mcp/ws", address);
            axum::serve(listener, create_app(mcp)).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = cli.settings();
    init_logging(settings.default_log_level());
    info!("Starting maven-check v{}", maven_check_mcp::version());

    match run(cli.transport, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("maven-check failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
