//! 统一的工具返回信封
//!
//! 成功：`{"tool_name": ..., "status": "success", "result": {...}}`
//! 失败：`{"tool_name": ..., "status": "error", "error": {"code": ..., "message": ...}}`

use log::error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::MavenError;

/// 信封状态与内容
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success { result: Value },
    PartialSuccess { result: Value },
    Error { error: MavenError },
}

impl Outcome {
    /// 序列化失败时转为内部错误
    fn from_result<T: Serialize>(result: &T) -> Self {
        match serde_json::to_value(result) {
            Ok(result) => Outcome::Success { result },
            Err(e) => {
                error!("Failed to serialize tool result: {}", e);
                Outcome::Error {
                    error: MavenError::internal(),
                }
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error { .. })
    }

    pub fn result(&self) -> Option<&Value> {
        match self {
            Outcome::Success { result } | Outcome::PartialSuccess { result } => Some(result),
            Outcome::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&MavenError> {
        match self {
            Outcome::Error { error } => Some(error),
            _ => None,
        }
    }
}

/// 每个工具操作都返回的信封，构造后不再修改
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResultEnvelope {
    pub tool_name: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ResultEnvelope {
    pub fn success<T: Serialize>(tool_name: &str, result: &T) -> Self {
        Self {
            tool_name: tool_name.to_string(),
            outcome: Outcome::from_result(result),
        }
    }

    pub fn partial_success<T: Serialize>(tool_name: &str, result: &T) -> Self {
        let outcome = match Outcome::from_result(result) {
            Outcome::Success { result } => Outcome::PartialSuccess { result },
            other => other,
        };
        Self {
            tool_name: tool_name.to_string(),
            outcome,
        }
    }

    pub fn error(tool_name: &str, error: MavenError) -> Self {
        Self {
            tool_name: tool_name.to_string(),
            outcome: Outcome::Error { error },
        }
    }

    pub fn is_error(&self) -> bool {
        self.outcome.is_error()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            error!("Failed to serialize envelope: {}", e);
            serde_json::json!({
                "tool_name": self.tool_name,
                "status": "error",
                "error": MavenError::internal(),
            })
        })
    }
}

/// `get_maven_latest_version` 与 `find_maven_latest_component_version` 的结果
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LatestVersion {
    pub latest_version: String,
}

/// `check_maven_version_exists` 的结果
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VersionExists {
    pub exists: bool,
}

/// `get_maven_all_latest_versions` 的结果
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AllLatestVersions {
    pub latest_major_version: String,
    pub latest_minor_version: String,
    pub latest_patch_version: String,
}
