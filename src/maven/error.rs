use serde::{Deserialize, Serialize};
use std::fmt;

/// 工具错误码
///
/// 序列化为 `INVALID_INPUT_FORMAT` 这样的大写蛇形字符串。
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// 依赖坐标、版本等输入格式不正确
    InvalidInputFormat,
    /// target_component 不是 major/minor/patch
    InvalidTargetComponent,
    /// 缺少必需参数
    MissingParameter,
    /// 上游没有该依赖的任何版本
    DependencyNotFound,
    /// 依赖存在，但没有满足条件的版本
    VersionNotFound,
    /// 批量请求为空
    EmptyDependencies,
    /// Maven Central 请求失败
    MavenApiError,
    /// 服务内部错误
    InternalServerError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInputFormat => "INVALID_INPUT_FORMAT",
            ErrorCode::InvalidTargetComponent => "INVALID_TARGET_COMPONENT",
            ErrorCode::MissingParameter => "MISSING_PARAMETER",
            ErrorCode::DependencyNotFound => "DEPENDENCY_NOT_FOUND",
            ErrorCode::VersionNotFound => "VERSION_NOT_FOUND",
            ErrorCode::EmptyDependencies => "EMPTY_DEPENDENCIES",
            ErrorCode::MavenApiError => "MAVEN_API_ERROR",
            ErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 返回给调用方的错误对象，序列化为 `{code, message}`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct MavenError {
    pub code: ErrorCode,
    pub message: String,
}

impl MavenError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInputFormat, message)
    }

    pub fn missing_parameter(name: &str) -> Self {
        Self::new(
            ErrorCode::MissingParameter,
            format!("Required parameter '{}' is missing", name),
        )
    }

    pub fn dependency_not_found(dependency: &str) -> Self {
        Self::new(
            ErrorCode::DependencyNotFound,
            format!("No versions found for {} in Maven Central", dependency),
        )
    }

    pub fn version_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::VersionNotFound, message)
    }

    /// 内部错误只带通用消息，不向调用方泄露细节
    pub fn internal() -> Self {
        Self::new(
            ErrorCode::InternalServerError,
            "An unexpected error occurred while processing the request",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_code_and_message() {
        let error = MavenError::missing_parameter("dependency");
        let value = serde_json::to_value(&error).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "code": "MISSING_PARAMETER",
                "message": "Required parameter 'dependency' is missing"
            })
        );
    }

    #[test]
    fn display_matches_wire_code() {
        for code in [
            ErrorCode::InvalidInputFormat,
            ErrorCode::InvalidTargetComponent,
            ErrorCode::EmptyDependencies,
            ErrorCode::MavenApiError,
        ] {
            let wire = serde_json::to_value(code).unwrap();
            assert_eq!(wire.as_str(), Some(code.as_str()));
        }
    }

    #[test]
    fn internal_error_hides_details() {
        let error = MavenError::internal();
        assert_eq!(error.code, ErrorCode::InternalServerError);
        assert!(!error.message.contains("panic"));
    }
}
