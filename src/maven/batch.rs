//! 批量版本检查

use futures::stream::{self, StreamExt};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::envelope::{Outcome, ResultEnvelope};
use super::error::{ErrorCode, MavenError};
use super::operations::{AllLatestVersionsArgs, MavenService, BATCH_VERSIONS_TOOL};

/// 批量请求中的一项
#[derive(Deserialize, Debug, Clone)]
pub struct BatchEntry {
    pub dependency: String,
    pub version: String,
    #[serde(default)]
    pub packaging: Option<String>,
    #[serde(default)]
    pub classifier: Option<String>,
}

/// 单项结果，`status` 与 `result`/`error` 来自该项自身的信封
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BatchItemResult {
    pub dependency: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
}

/// 批量结果，`dependencies` 与输入顺序一致
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub dependencies: Vec<BatchItemResult>,
    pub summary: BatchSummary,
}

/// 结构校验：必须是非空数组，每一项都能解析成 [`BatchEntry`]
fn parse_entries(dependencies: Option<&Value>) -> Result<Vec<BatchEntry>, MavenError> {
    let items = match dependencies {
        None | Some(Value::Null) => return Err(MavenError::missing_parameter("dependencies")),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(MavenError::invalid_input(
                "Parameter 'dependencies' must be an array",
            ))
        }
    };
    if items.is_empty() {
        return Err(MavenError::new(
            ErrorCode::EmptyDependencies,
            "Dependencies array cannot be empty",
        ));
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            BatchEntry::deserialize(item).map_err(|e| {
                MavenError::invalid_input(format!(
                    "Invalid dependency entry at index {}: {}",
                    index, e
                ))
            })
        })
        .collect()
}

impl MavenService {
    /// 对多个依赖执行 all-latest 检查
    ///
    /// 各项有界并发执行，单项失败不影响其他项；结果顺序与输入一致。
    pub async fn batch_versions_check(&self, dependencies: Option<&Value>) -> ResultEnvelope {
        let batch_id = Uuid::new_v4();
        let entries = match parse_entries(dependencies) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("[batch {}] rejected: {}", batch_id, e);
                return ResultEnvelope::error(BATCH_VERSIONS_TOOL, e);
            }
        };

        info!(
            "[batch {}] checking {} dependencies with concurrency {}",
            batch_id,
            entries.len(),
            self.batch_concurrency
        );

        let results: Vec<BatchItemResult> = stream::iter(entries)
            .map(|entry| async move {
                let args = AllLatestVersionsArgs {
                    dependency: Some(entry.dependency.clone()),
                    version: Some(entry.version),
                    packaging: entry.packaging,
                    classifier: entry.classifier,
                    include_prerelease: None,
                };
                let envelope = self.get_all_latest_versions(args).await;
                BatchItemResult {
                    dependency: entry.dependency,
                    outcome: envelope.outcome,
                }
            })
            .buffered(self.batch_concurrency)
            .collect()
            .await;

        let failed = results.iter().filter(|r| r.outcome.is_error()).count();
        let summary = BatchSummary {
            total: results.len(),
            success: results.len() - failed,
            failed,
        };
        info!(
            "[batch {}] finished: total={}, success={}, failed={}",
            batch_id, summary.total, summary.success, summary.failed
        );

        let report = BatchReport {
            dependencies: results,
            summary,
        };
        if failed == 0 {
            ResultEnvelope::success(BATCH_VERSIONS_TOOL, &report)
        } else {
            ResultEnvelope::partial_success(BATCH_VERSIONS_TOOL, &report)
        }
    }
}
