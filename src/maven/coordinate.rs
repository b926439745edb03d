//! 依赖坐标与输入校验

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

use super::error::{ErrorCode, MavenError};
use super::version::{ParsedVersion, VersionKind};

// Maven 对 groupId/artifactId 的字符限制
static MAVEN_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").unwrap());

/// 默认打包类型
pub const DEFAULT_PACKAGING: &str = "jar";

/// `groupId:artifactId` 依赖坐标，与版本无关
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyCoordinate {
    group_id: String,
    artifact_id: String,
}

impl DependencyCoordinate {
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    /// BOM 类工件：artifactId 以 `-bom` 或 `-dependencies` 结尾（区分大小写）
    pub fn is_pom_like(&self) -> bool {
        self.artifact_id.ends_with("-bom") || self.artifact_id.ends_with("-dependencies")
    }

    /// 未显式指定时的打包类型
    pub fn default_packaging(&self) -> &'static str {
        if self.is_pom_like() {
            "pom"
        } else {
            DEFAULT_PACKAGING
        }
    }
}

impl fmt::Display for DependencyCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

impl FromStr for DependencyCoordinate {
    type Err = MavenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_coordinate(Some(s))
    }
}

/// 校验 `groupId:artifactId`
///
/// 空或缺失返回 `MISSING_PARAMETER`；格式错误（冒号数量不对、某侧为空、
/// 夹带版本号、非法字符）返回 `INVALID_INPUT_FORMAT`。
pub fn validate_coordinate(s: Option<&str>) -> Result<DependencyCoordinate, MavenError> {
    let s = match s.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return Err(MavenError::missing_parameter("dependency")),
    };

    let malformed = || {
        MavenError::invalid_input(format!(
            "Dependency '{}' does not match the required format 'groupId:artifactId'",
            s
        ))
    };

    let (group_id, artifact_id) = s.split_once(':').ok_or_else(malformed)?;
    if artifact_id.contains(':') {
        return Err(MavenError::invalid_input(format!(
            "Dependency '{}' must not include a version; use the format 'groupId:artifactId'",
            s
        )));
    }
    if !MAVEN_ID.is_match(group_id) || !MAVEN_ID.is_match(artifact_id) {
        return Err(malformed());
    }
    if ParsedVersion::parse(artifact_id).kind() != VersionKind::Opaque {
        return Err(MavenError::invalid_input(format!(
            "Dependency '{}' looks like it ends with a version; use the format 'groupId:artifactId'",
            s
        )));
    }

    Ok(DependencyCoordinate {
        group_id: group_id.to_string(),
        artifact_id: artifact_id.to_string(),
    })
}

/// 解析实际使用的打包类型：显式值优先，否则按 BOM 规则取默认值
pub fn resolve_packaging(
    coordinate: &DependencyCoordinate,
    packaging: Option<&str>,
) -> Result<String, MavenError> {
    match packaging.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) if MAVEN_ID.is_match(p) => Ok(p.to_string()),
        Some(p) => Err(MavenError::invalid_input(format!("Invalid packaging '{}'", p))),
        None => Ok(coordinate.default_packaging().to_string()),
    }
}

/// 校验可选的 classifier，空字符串视为未提供
pub fn validate_classifier(classifier: Option<&str>) -> Result<Option<String>, MavenError> {
    match classifier.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) if MAVEN_ID.is_match(c) => Ok(Some(c.to_string())),
        Some(c) => Err(MavenError::invalid_input(format!("Invalid classifier '{}'", c))),
        None => Ok(None),
    }
}

/// 校验调用方传入的版本字符串，要求其类别在 `allowed_kinds` 之内
pub fn validate_version_string(
    s: Option<&str>,
    allowed_kinds: &[VersionKind],
) -> Result<ParsedVersion, MavenError> {
    let s = match s.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return Err(MavenError::missing_parameter("version")),
    };
    let parsed = ParsedVersion::parse(s);
    if !allowed_kinds.contains(&parsed.kind()) {
        return Err(MavenError::invalid_input(format!(
            "Version '{}' is not in a recognized format such as 'MAJOR.MINOR.PATCH' or 'YYYYMMDD'",
            s
        )));
    }
    Ok(parsed)
}

/// 可以提供主/次版本号的版本类别
pub const PINNABLE_KINDS: &[VersionKind] = &[
    VersionKind::Semver,
    VersionKind::Partial,
    VersionKind::Numeric,
    VersionKind::Calendar,
];

/// 所有版本类别
pub const ANY_KIND: &[VersionKind] = &[
    VersionKind::Semver,
    VersionKind::Partial,
    VersionKind::Numeric,
    VersionKind::Calendar,
    VersionKind::Opaque,
];

/// 语义化版本的目标分量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetComponent {
    Major,
    Minor,
    Patch,
}

impl TargetComponent {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetComponent::Major => "major",
            TargetComponent::Minor => "minor",
            TargetComponent::Patch => "patch",
        }
    }
}

/// 校验 target_component，只接受 `major`、`minor`、`patch`
pub fn validate_target_component(s: Option<&str>) -> Result<TargetComponent, MavenError> {
    match s {
        None | Some("") => Err(MavenError::missing_parameter("target_component")),
        Some("major") => Ok(TargetComponent::Major),
        Some("minor") => Ok(TargetComponent::Minor),
        Some("patch") => Ok(TargetComponent::Patch),
        Some(other) => Err(MavenError::new(
            ErrorCode::InvalidTargetComponent,
            format!(
                "Target component '{}' must be one of: major, minor, patch",
                other
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_coordinates_round_trip() {
        for (g, a) in [
            ("org.apache.commons", "commons-lang3"),
            ("com.google.guava", "guava"),
            ("io.netty", "netty-all"),
            ("org.json", "json"),
            ("a", "b"),
        ] {
            let coordinate = validate_coordinate(Some(&format!("{}:{}", g, a))).unwrap();
            assert_eq!(coordinate.group_id(), g);
            assert_eq!(coordinate.artifact_id(), a);
            assert_eq!(coordinate.to_string(), format!("{}:{}", g, a));
        }
    }

    #[test]
    fn missing_is_distinguished_from_malformed() {
        assert_eq!(validate_coordinate(None).unwrap_err().code, ErrorCode::MissingParameter);
        assert_eq!(validate_coordinate(Some("")).unwrap_err().code, ErrorCode::MissingParameter);
        assert_eq!(validate_coordinate(Some("  ")).unwrap_err().code, ErrorCode::MissingParameter);

        for bad in [
            "invalid-format",
            ":artifact",
            "group:",
            "org.example:lib:1.0.0",
            "a:b:c",
            "org.example:1.2.3",
            "org example:lib",
        ] {
            assert_eq!(
                validate_coordinate(Some(bad)).unwrap_err().code,
                ErrorCode::InvalidInputFormat,
                "{}",
                bad
            );
        }
    }

    #[test]
    fn bom_like_artifacts_default_to_pom() {
        for dependency in [
            "org.springframework.boot:spring-boot-dependencies",
            "software.amazon.awssdk:bom",
            "com.fasterxml.jackson:jackson-bom",
        ] {
            let coordinate: DependencyCoordinate = dependency.parse().unwrap();
            if dependency.ends_with(":bom") {
                // 必须是 "-bom" 后缀
                assert!(!coordinate.is_pom_like());
                continue;
            }
            assert!(coordinate.is_pom_like());
            assert_eq!(resolve_packaging(&coordinate, None).unwrap(), "pom");
        }

        let upper: DependencyCoordinate = "com.example:thing-BOM".parse().unwrap();
        assert!(!upper.is_pom_like());
    }

    #[test]
    fn explicit_packaging_wins() {
        let coordinate: DependencyCoordinate =
            "org.springframework.boot:spring-boot-dependencies".parse().unwrap();
        assert_eq!(resolve_packaging(&coordinate, Some("jar")).unwrap(), "jar");
        assert_eq!(resolve_packaging(&coordinate, Some("")).unwrap(), "pom");
        assert!(resolve_packaging(&coordinate, Some("j ar")).is_err());

        let plain: DependencyCoordinate = "com.google.guava:guava".parse().unwrap();
        assert_eq!(resolve_packaging(&plain, None).unwrap(), "jar");
    }

    #[test]
    fn classifier_validation() {
        assert_eq!(validate_classifier(None).unwrap(), None);
        assert_eq!(validate_classifier(Some("")).unwrap(), None);
        assert_eq!(validate_classifier(Some("sources")).unwrap().as_deref(), Some("sources"));
        assert!(validate_classifier(Some("src/main")).is_err());
    }

    #[test]
    fn version_string_validation() {
        assert_eq!(
            validate_version_string(None, PINNABLE_KINDS).unwrap_err().code,
            ErrorCode::MissingParameter
        );
        assert_eq!(
            validate_version_string(Some("not-a-version"), PINNABLE_KINDS).unwrap_err().code,
            ErrorCode::InvalidInputFormat
        );
        assert!(validate_version_string(Some("not-a-version"), ANY_KIND).is_ok());
        assert_eq!(
            validate_version_string(Some("20231013"), PINNABLE_KINDS).unwrap().kind(),
            VersionKind::Calendar
        );
    }

    #[test]
    fn target_component_validation() {
        assert_eq!(validate_target_component(Some("minor")).unwrap(), TargetComponent::Minor);
        assert_eq!(
            validate_target_component(Some("build")).unwrap_err().code,
            ErrorCode::InvalidTargetComponent
        );
        assert_eq!(
            validate_target_component(Some("MAJOR")).unwrap_err().code,
            ErrorCode::InvalidTargetComponent
        );
        assert_eq!(
            validate_target_component(None).unwrap_err().code,
            ErrorCode::MissingParameter
        );
    }
}
