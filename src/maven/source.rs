//! 上游版本数据源
//!
//! [`VersionSource`] 是取版本的外部协作者：Solr 搜索为主，
//! `maven-metadata.xml` 为备。[`MavenCentralClient`] 是基于 reqwest 的实现。

use async_trait::async_trait;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

use super::coordinate::DependencyCoordinate;
use crate::settings::Settings;

static VERSIONS_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<versions>(.*?)</versions>").unwrap());

static VERSION_ELEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<version>\s*([^<\s]+)\s*</version>").unwrap());

/// 一次上游查询的键：坐标 + 打包类型 + classifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactQuery {
    pub group_id: String,
    pub artifact_id: String,
    pub packaging: String,
    pub classifier: Option<String>,
}

impl ArtifactQuery {
    pub fn new(
        coordinate: &DependencyCoordinate,
        packaging: impl Into<String>,
        classifier: Option<String>,
    ) -> Self {
        Self {
            group_id: coordinate.group_id().to_string(),
            artifact_id: coordinate.artifact_id().to_string(),
            packaging: packaging.into(),
            classifier,
        }
    }

    pub fn with_artifact_id(&self, artifact_id: &str) -> Self {
        Self {
            artifact_id: artifact_id.to_string(),
            ..self.clone()
        }
    }

    pub fn with_packaging(&self, packaging: &str) -> Self {
        Self {
            packaging: packaging.to_string(),
            ..self.clone()
        }
    }

    /// Solr 查询表达式
    pub fn solr_query(&self) -> String {
        let mut query = format!(
            "g:\"{}\" AND a:\"{}\" AND p:\"{}\"",
            self.group_id, self.artifact_id, self.packaging
        );
        if let Some(classifier) = &self.classifier {
            query.push_str(&format!(" AND l:\"{}\"", classifier));
        }
        query
    }

    /// 仓库中 maven-metadata.xml 的相对路径
    pub fn metadata_path(&self) -> String {
        format!(
            "{}/{}/maven-metadata.xml",
            self.group_id.replace('.', "/"),
            self.artifact_id
        )
    }
}

impl fmt::Display for ArtifactQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.group_id, self.artifact_id, self.packaging)?;
        if let Some(classifier) = &self.classifier {
            write!(f, " [{}]", classifier)?;
        }
        Ok(())
    }
}

/// 上游请求错误
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to Maven Central failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Maven Central returned HTTP {status} {reason}")]
    Status { status: u16, reason: String },

    #[error("unexpected response from Maven Central: {0}")]
    Decode(String),
}

impl FetchError {
    fn from_status(status: StatusCode) -> Self {
        FetchError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }
}

/// 版本数据源
///
/// 两个方法的返回约定相同：按上游顺序去重后的原始版本字符串，空列表表示没有版本。
#[async_trait]
pub trait VersionSource: Send + Sync {
    /// 通过搜索接口获取版本
    async fn search_versions(&self, query: &ArtifactQuery) -> Result<Vec<String>, FetchError>;

    /// 直接读取仓库元数据获取版本，只在搜索结果为空时使用
    async fn metadata_versions(&self, query: &ArtifactQuery) -> Result<Vec<String>, FetchError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    response: SearchBody,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(rename = "numFound", default)]
    num_found: u64,
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    #[serde(default)]
    v: Option<String>,
}

/// Maven Central 客户端
#[derive(Debug, Clone)]
pub struct MavenCentralClient {
    http: reqwest::Client,
    search_url: String,
    repository_url: String,
    page_size: u32,
    max_pages: u32,
}

impl MavenCentralClient {
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("maven-check-mcp/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.request_timeout())
            .build()?;

        Ok(Self {
            http,
            search_url: settings.search_url.clone(),
            repository_url: settings.repository_url.trim_end_matches('/').to_string(),
            page_size: settings.search_page_size.max(1),
            max_pages: settings.max_search_pages.max(1),
        })
    }

    async fn search_page(&self, q: &str, start: u64) -> Result<SearchBody, FetchError> {
        let rows = self.page_size.to_string();
        let start = start.to_string();
        debug!("GET {} q={} start={} rows={}", self.search_url, q, start, rows);

        let response = self
            .http
            .get(&self.search_url)
            .query(&[
                ("q", q),
                ("core", "gav"),
                ("rows", rows.as_str()),
                ("start", start.as_str()),
                ("wt", "json"),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(status));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.without_url().to_string()))?;
        Ok(body.response)
    }
}

#[async_trait]
impl VersionSource for MavenCentralClient {
    async fn search_versions(&self, query: &ArtifactQuery) -> Result<Vec<String>, FetchError> {
        let q = query.solr_query();
        let mut seen = HashSet::new();
        let mut versions = Vec::new();

        for page in 0..u64::from(self.max_pages) {
            let start = page * u64::from(self.page_size);
            let body = self.search_page(&q, start).await?;
            let returned = body.docs.len() as u64;

            for doc in body.docs {
                if let Some(v) = doc.v.filter(|v| !v.is_empty()) {
                    if seen.insert(v.clone()) {
                        versions.push(v);
                    }
                }
            }

            if returned == 0 || start + returned >= body.num_found {
                break;
            }
        }

        debug!("search returned {} versions for {}", versions.len(), query);
        Ok(versions)
    }

    async fn metadata_versions(&self, query: &ArtifactQuery) -> Result<Vec<String>, FetchError> {
        let url = format!("{}/{}", self.repository_url, query.metadata_path());
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Http(e.without_url()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(FetchError::from_status(status));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Decode(e.without_url().to_string()))?;
        Ok(parse_metadata_versions(&text))
    }
}

/// 从 maven-metadata.xml 中提取 `<versions>` 下的全部版本
pub fn parse_metadata_versions(xml: &str) -> Vec<String> {
    let Some(block) = VERSIONS_BLOCK.captures(xml) else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    VERSION_ELEMENT
        .captures_iter(&block[1])
        .map(|caps| caps[1].to_string())
        .filter(|v| seen.insert(v.clone()))
        .collect()
}
