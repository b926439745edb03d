//! 工具操作
//!
//! 每个操作都是同一套组合：校验输入 → 取版本（带缓存与兜底）→ 解析 → 选择 → 信封。
//! 操作从不返回 `Err`，所有失败都落在 [`ResultEnvelope`] 的 `error` 里。

use futures::FutureExt;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use super::cache::VersionCache;
use super::coordinate::{
    resolve_packaging, validate_classifier, validate_coordinate, validate_target_component,
    validate_version_string, DependencyCoordinate, TargetComponent, ANY_KIND, PINNABLE_KINDS,
};
use super::envelope::{AllLatestVersions, LatestVersion, ResultEnvelope, VersionExists};
use super::error::{ErrorCode, MavenError};
use super::fallback::FallbackTable;
use super::selector::{SelectionPolicy, Selector};
use super::source::{ArtifactQuery, FetchError, MavenCentralClient, VersionSource};
use super::version::{ParsedVersion, VersionKind};
use crate::settings::Settings;

pub const LATEST_VERSION_TOOL: &str = "get_maven_latest_version";
pub const VERSION_EXISTS_TOOL: &str = "check_maven_version_exists";
pub const COMPONENT_VERSION_TOOL: &str = "find_maven_latest_component_version";
pub const ALL_LATEST_VERSIONS_TOOL: &str = "get_maven_all_latest_versions";
pub const BATCH_VERSIONS_TOOL: &str = "batch_maven_versions_check";

/// `get_maven_latest_version` 参数
#[derive(Deserialize, Debug, Clone, Default)]
pub struct LatestVersionArgs {
    pub dependency: Option<String>,
    pub packaging: Option<String>,
    pub classifier: Option<String>,
    pub include_prerelease: Option<bool>,
}

/// `check_maven_version_exists` 参数
#[derive(Deserialize, Debug, Clone, Default)]
pub struct VersionExistsArgs {
    pub dependency: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub classifier: Option<String>,
}

/// `find_maven_latest_component_version` 参数
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ComponentVersionArgs {
    pub dependency: Option<String>,
    pub version: Option<String>,
    pub target_component: Option<String>,
    pub packaging: Option<String>,
    pub classifier: Option<String>,
    pub include_prerelease: Option<bool>,
}

/// `get_maven_all_latest_versions` 参数
#[derive(Deserialize, Debug, Clone, Default)]
pub struct AllLatestVersionsArgs {
    pub dependency: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub classifier: Option<String>,
    pub include_prerelease: Option<bool>,
}

/// Maven 版本查询服务，持有数据源、缓存与兜底表
pub struct MavenService {
    source: Arc<dyn VersionSource>,
    cache: VersionCache,
    fallbacks: FallbackTable,
    pub(crate) batch_concurrency: usize,
}

impl MavenService {
    pub fn new(source: Arc<dyn VersionSource>, cache: VersionCache) -> Self {
        Self {
            source,
            cache,
            fallbacks: FallbackTable::standard(),
            batch_concurrency: 8,
        }
    }

    /// 按设置创建连接 Maven Central 的服务
    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        let client = MavenCentralClient::new(settings)?;
        Ok(Self::new(Arc::new(client), VersionCache::from_settings(settings))
            .with_batch_concurrency(settings.batch_concurrency))
    }

    pub fn with_fallbacks(mut self, fallbacks: FallbackTable) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    pub fn with_batch_concurrency(mut self, batch_concurrency: usize) -> Self {
        self.batch_concurrency = batch_concurrency.max(1);
        self
    }

    pub fn cache(&self) -> &VersionCache {
        &self.cache
    }

    /// 获取最新版本
    pub async fn get_latest_version(&self, args: LatestVersionArgs) -> ResultEnvelope {
        info!(
            "{} called with: dependency={:?}, packaging={:?}, classifier={:?}",
            LATEST_VERSION_TOOL, args.dependency, args.packaging, args.classifier
        );
        guarded(LATEST_VERSION_TOOL, self.latest_version(args)).await
    }

    /// 检查指定版本是否存在
    pub async fn check_version_exists(&self, args: VersionExistsArgs) -> ResultEnvelope {
        info!(
            "{} called with: dependency={:?}, version={:?}, packaging={:?}, classifier={:?}",
            VERSION_EXISTS_TOOL, args.dependency, args.version, args.packaging, args.classifier
        );
        guarded(VERSION_EXISTS_TOOL, self.version_exists(args)).await
    }

    /// 按目标分量查找最新版本
    pub async fn find_latest_component_version(&self, args: ComponentVersionArgs) -> ResultEnvelope {
        info!(
            "{} called with: dependency={:?}, version={:?}, target_component={:?}, packaging={:?}, classifier={:?}",
            COMPONENT_VERSION_TOOL,
            args.dependency,
            args.version,
            args.target_component,
            args.packaging,
            args.classifier
        );
        guarded(COMPONENT_VERSION_TOOL, self.latest_component_version(args)).await
    }

    /// 一次取回 major/minor/patch 三个维度的最新版本
    pub async fn get_all_latest_versions(&self, args: AllLatestVersionsArgs) -> ResultEnvelope {
        info!(
            "{} called with: dependency={:?}, version={:?}, packaging={:?}, classifier={:?}",
            ALL_LATEST_VERSIONS_TOOL, args.dependency, args.version, args.packaging, args.classifier
        );
        guarded(ALL_LATEST_VERSIONS_TOOL, self.all_latest_versions(args)).await
    }

    async fn latest_version(&self, args: LatestVersionArgs) -> Result<LatestVersion, MavenError> {
        let coordinate = validate_coordinate(args.dependency.as_deref())?;
        let query = build_query(&coordinate, args.packaging.as_deref(), args.classifier.as_deref())?;
        let versions = self.fetch_parsed(&coordinate, &query).await?;

        let selector = Selector::including_prerelease(args.include_prerelease.unwrap_or(false));
        let latest = selector
            .select(&versions, SelectionPolicy::AbsoluteLatest)
            .ok_or_else(|| {
                MavenError::version_not_found(format!(
                    "No stable version of {} found in Maven Central",
                    coordinate
                ))
            })?;

        info!("Latest version of {}: {}", coordinate, latest);
        Ok(LatestVersion {
            latest_version: latest.raw().to_string(),
        })
    }

    async fn version_exists(&self, args: VersionExistsArgs) -> Result<VersionExists, MavenError> {
        let coordinate = validate_coordinate(args.dependency.as_deref())?;
        let requested = validate_version_string(args.version.as_deref(), ANY_KIND)?;
        let query = build_query(&coordinate, args.packaging.as_deref(), args.classifier.as_deref())?;
        let versions = self.fetch_versions(&coordinate, &query).await?;

        let exists = versions.iter().any(|v| v == requested.raw())
            || versions
                .iter()
                .any(|v| ParsedVersion::parse(v).is_equivalent(&requested));

        info!("{} {} exists: {}", coordinate, requested, exists);
        Ok(VersionExists { exists })
    }

    async fn latest_component_version(
        &self,
        args: ComponentVersionArgs,
    ) -> Result<LatestVersion, MavenError> {
        let coordinate = validate_coordinate(args.dependency.as_deref())?;
        let target = validate_target_component(args.target_component.as_deref())?;
        let allowed = match target {
            TargetComponent::Major => ANY_KIND,
            TargetComponent::Minor | TargetComponent::Patch => PINNABLE_KINDS,
        };
        let current = validate_version_string(args.version.as_deref(), allowed)?;
        let query = build_query(&coordinate, args.packaging.as_deref(), args.classifier.as_deref())?;
        let versions = self.fetch_parsed(&coordinate, &query).await?;

        let selector = Selector::including_prerelease(args.include_prerelease.unwrap_or(false));
        let policy = pinned_policy(&current, target);
        let latest = select_or_not_found(&selector, &versions, policy, &coordinate)?;

        info!(
            "Latest {} version of {} for {}: {}",
            target.as_str(),
            coordinate,
            current,
            latest
        );
        Ok(LatestVersion { latest_version: latest })
    }

    async fn all_latest_versions(
        &self,
        args: AllLatestVersionsArgs,
    ) -> Result<AllLatestVersions, MavenError> {
        let coordinate = validate_coordinate(args.dependency.as_deref())?;
        let current = validate_version_string(args.version.as_deref(), PINNABLE_KINDS)?;
        let query = build_query(&coordinate, args.packaging.as_deref(), args.classifier.as_deref())?;
        let versions = self.fetch_parsed(&coordinate, &query).await?;

        let selector = Selector::including_prerelease(args.include_prerelease.unwrap_or(false));
        let pick = |target| {
            selector
                .select(&versions, pinned_policy(&current, target))
                .map(|v| v.raw().to_string())
        };
        let latest_major_version = select_or_not_found(
            &selector,
            &versions,
            pinned_policy(&current, TargetComponent::Major),
            &coordinate,
        )?;
        // 固定的主版本或次版本下没有候选时，退回上一级的结果
        let latest_minor_version = pick(TargetComponent::Minor).unwrap_or_else(|| {
            debug!("No {} versions within major of {}, using latest major", coordinate, current);
            latest_major_version.clone()
        });
        let latest_patch_version = pick(TargetComponent::Patch).unwrap_or_else(|| {
            debug!("No {} versions within minor of {}, using latest minor", coordinate, current);
            latest_minor_version.clone()
        });
        let result = AllLatestVersions {
            latest_major_version,
            latest_minor_version,
            latest_patch_version,
        };

        info!("All latest versions of {} for {}: {:?}", coordinate, current, result);
        Ok(result)
    }

    async fn fetch_parsed(
        &self,
        coordinate: &DependencyCoordinate,
        query: &ArtifactQuery,
    ) -> Result<Vec<ParsedVersion>, MavenError> {
        let versions = self.fetch_versions(coordinate, query).await?;
        Ok(versions.iter().map(|v| ParsedVersion::parse(v)).collect())
    }

    /// 取版本列表：缓存 → 搜索 → 仓库元数据 → 兜底表
    ///
    /// 搜索出错直接报告 `MAVEN_API_ERROR`；元数据和兜底中的错误只记日志。
    /// 最终为空则报告 `DEPENDENCY_NOT_FOUND`。
    async fn fetch_versions(
        &self,
        coordinate: &DependencyCoordinate,
        query: &ArtifactQuery,
    ) -> Result<Arc<Vec<String>>, MavenError> {
        if let Some(cached) = self.cache.get(query) {
            debug!("Cache hit for {}", query);
            return Ok(cached);
        }

        let mut versions = self.source.search_versions(query).await.map_err(|e| {
            error!("Error querying Maven Central for {}: {}", query, e);
            MavenError::new(
                ErrorCode::MavenApiError,
                format!("Error querying Maven Central: {}", e),
            )
        })?;

        if versions.is_empty() {
            info!("Search returned no versions for {}, trying repository metadata", query);
            versions = self.metadata_or_empty(query).await;
        }

        if versions.is_empty() {
            for alternative in self.fallbacks.alternatives(query) {
                warn!("No versions for {}, falling back to {}", query, alternative);
                versions = match self.source.search_versions(&alternative).await {
                    Ok(found) if !found.is_empty() => found,
                    Ok(_) => self.metadata_or_empty(&alternative).await,
                    Err(e) => {
                        warn!("Fallback search for {} failed: {}", alternative, e);
                        Vec::new()
                    }
                };
                if !versions.is_empty() {
                    break;
                }
            }
        }

        if versions.is_empty() {
            return Err(MavenError::dependency_not_found(&coordinate.to_string()));
        }
        Ok(self.cache.insert(query.clone(), versions))
    }

    async fn metadata_or_empty(&self, query: &ArtifactQuery) -> Vec<String> {
        match self.source.metadata_versions(query).await {
            Ok(versions) => versions,
            Err(e) => {
                warn!("Repository metadata lookup for {} failed: {}", query, e);
                Vec::new()
            }
        }
    }
}

fn build_query(
    coordinate: &DependencyCoordinate,
    packaging: Option<&str>,
    classifier: Option<&str>,
) -> Result<ArtifactQuery, MavenError> {
    let packaging = resolve_packaging(coordinate, packaging)?;
    let classifier = validate_classifier(classifier)?;
    debug!("Using packaging type {} for {}", packaging, coordinate);
    Ok(ArtifactQuery::new(coordinate, packaging, classifier))
}

/// 由调用方当前版本与目标分量得到选择策略
///
/// 日历版本没有主/次版本线，三个分量都退化为绝对最新。
fn pinned_policy(current: &ParsedVersion, target: TargetComponent) -> SelectionPolicy {
    if current.kind() == VersionKind::Calendar {
        return SelectionPolicy::AbsoluteLatest;
    }
    match target {
        TargetComponent::Major => SelectionPolicy::AbsoluteLatest,
        TargetComponent::Minor => SelectionPolicy::LatestWithinMajor(current.major().unwrap_or(0)),
        TargetComponent::Patch => SelectionPolicy::LatestWithinMajorMinor(
            current.major().unwrap_or(0),
            current.minor().unwrap_or(0),
        ),
    }
}

fn select_or_not_found(
    selector: &Selector,
    versions: &[ParsedVersion],
    policy: SelectionPolicy,
    coordinate: &DependencyCoordinate,
) -> Result<String, MavenError> {
    selector
        .select(versions, policy)
        .map(|v| v.raw().to_string())
        .ok_or_else(|| {
            MavenError::version_not_found(format!(
                "No versions of {} matching {} found in Maven Central",
                coordinate, policy
            ))
        })
}

/// 在操作边界兜住 panic，转成 `INTERNAL_SERVER_ERROR`
pub(crate) async fn guarded<T, F>(tool_name: &str, operation: F) -> ResultEnvelope
where
    T: Serialize,
    F: Future<Output = Result<T, MavenError>>,
{
    match AssertUnwindSafe(operation).catch_unwind().await {
        Ok(Ok(result)) => ResultEnvelope::success(tool_name, &result),
        Ok(Err(e)) => {
            warn!("{} failed: {}", tool_name, e);
            ResultEnvelope::error(tool_name, e)
        }
        Err(_) => {
            error!("{} aborted with an unexpected internal failure", tool_name);
            ResultEnvelope::error(tool_name, MavenError::internal())
        }
    }
}
