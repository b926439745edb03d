//! 内存版本数据源，用于测试和离线演示

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::source::{ArtifactQuery, FetchError, VersionSource};

fn search_key(dependency: &str, packaging: &str, classifier: Option<&str>) -> String {
    format!("{}:{}:{}", dependency, packaging, classifier.unwrap_or(""))
}

fn query_key(query: &ArtifactQuery) -> String {
    search_key(
        &format!("{}:{}", query.group_id, query.artifact_id),
        &query.packaging,
        query.classifier.as_deref(),
    )
}

fn coordinate_key(query: &ArtifactQuery) -> String {
    format!("{}:{}", query.group_id, query.artifact_id)
}

/// 预置版本列表的数据源，记录调用次数
#[derive(Debug, Default)]
pub struct InMemorySource {
    search: HashMap<String, Vec<String>>,
    metadata: HashMap<String, Vec<String>>,
    failures: HashMap<String, u16>,
    panics: HashSet<String>,
    search_calls: AtomicUsize,
    metadata_calls: AtomicUsize,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为 `groupId:artifactId` + 打包类型预置搜索结果
    pub fn with_versions(mut self, dependency: &str, packaging: &str, versions: &[&str]) -> Self {
        self.search.insert(
            search_key(dependency, packaging, None),
            versions.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    pub fn with_classified_versions(
        mut self,
        dependency: &str,
        packaging: &str,
        classifier: &str,
        versions: &[&str],
    ) -> Self {
        self.search.insert(
            search_key(dependency, packaging, Some(classifier)),
            versions.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    /// 预置仓库元数据中的版本
    pub fn with_metadata(mut self, dependency: &str, versions: &[&str]) -> Self {
        self.metadata.insert(
            dependency.to_string(),
            versions.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    /// 搜索该坐标时返回指定 HTTP 状态的错误
    pub fn with_failure(mut self, dependency: &str, status: u16) -> Self {
        self.failures.insert(dependency.to_string(), status);
        self
    }

    /// 搜索该坐标时 panic
    pub fn with_panic(mut self, dependency: &str) -> Self {
        self.panics.insert(dependency.to_string());
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VersionSource for InMemorySource {
    async fn search_versions(&self, query: &ArtifactQuery) -> Result<Vec<String>, FetchError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let coordinate = coordinate_key(query);
        if self.panics.contains(&coordinate) {
            panic!("simulated failure for {}", coordinate);
        }
        if let Some(status) = self.failures.get(&coordinate) {
            return Err(FetchError::Status {
                status: *status,
                reason: reqwest::StatusCode::from_u16(*status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Unknown")
                    .to_string(),
            });
        }
        Ok(self.search.get(&query_key(query)).cloned().unwrap_or_default())
    }

    async fn metadata_versions(&self, query: &ArtifactQuery) -> Result<Vec<String>, FetchError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .metadata
            .get(&coordinate_key(query))
            .cloned()
            .unwrap_or_default())
    }
}
