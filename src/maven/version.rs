//! 版本解析
//!
//! 把上游返回的原始版本字符串解析为可比较的 [`ParsedVersion`]。
//! 解析永远不会失败：无法识别的字符串归为 [`VersionKind::Opaque`]。
//!
//! 识别顺序（先匹配者胜出）：
//! 1. `MAJOR.MINOR.PATCH`，可带 `-`/`.`/`+` 后缀
//! 2. `MAJOR.MINOR`，可带字母开头的后缀
//! 3. 八位 `YYYYMMDD` 日历版本
//! 4. 其他纯数字
//! 5. 其余一律不透明

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static SEMVER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)(?:[.+-](.+))?$").unwrap());

static PARTIAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\.(\d+)(?:[.+-]([A-Za-z].*))?$").unwrap());

static BARE_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

// 预发布标记后面只能是结尾、数字、点或连字符，避免把 "android" 之类当成 alpha
static PRERELEASE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(alpha|beta|rc|cr|snapshot|preview|pre|m)(?:$|[\d.-])").unwrap()
});

/// 版本的分类，决定比较策略
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VersionKind {
    Semver,
    Calendar,
    Numeric,
    Partial,
    Opaque,
}

impl VersionKind {
    /// 跨类比较时的等级：数字族 > 日历 > 不透明
    pub(crate) fn rank(&self) -> u8 {
        match self {
            VersionKind::Semver | VersionKind::Partial | VersionKind::Numeric => 2,
            VersionKind::Calendar => 1,
            VersionKind::Opaque => 0,
        }
    }
}

/// 解析后的版本，构造后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVersion {
    raw: String,
    kind: VersionKind,
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    /// 数字部分之后的完整后缀，如 `jre`、`RC1`
    qualifier: Option<String>,
    prerelease: bool,
}

impl ParsedVersion {
    /// 解析原始版本字符串
    pub fn parse(raw: &str) -> Self {
        if let Some(caps) = SEMVER.captures(raw) {
            if let (Some(major), Some(minor), Some(patch)) = (
                parse_component(&caps[1]),
                parse_component(&caps[2]),
                parse_component(&caps[3]),
            ) {
                let qualifier = caps.get(4).map(|q| q.as_str());
                return Self::numeric(raw, VersionKind::Semver, major, Some(minor), Some(patch), qualifier);
            }
        }

        if let Some(caps) = PARTIAL.captures(raw) {
            if let (Some(major), Some(minor)) =
                (parse_component(&caps[1]), parse_component(&caps[2]))
            {
                let qualifier = caps.get(3).map(|q| q.as_str());
                return Self::numeric(raw, VersionKind::Partial, major, Some(minor), None, qualifier);
            }
        }

        if BARE_INTEGER.is_match(raw) {
            if let Some(value) = parse_component(raw) {
                if raw.len() == 8 && looks_like_date(raw) {
                    return Self::numeric(raw, VersionKind::Calendar, value, None, None, None);
                }
                return Self::numeric(raw, VersionKind::Numeric, value, Some(0), Some(0), None);
            }
        }

        Self {
            raw: raw.to_string(),
            kind: VersionKind::Opaque,
            major: None,
            minor: None,
            patch: None,
            qualifier: None,
            prerelease: false,
        }
    }

    fn numeric(
        raw: &str,
        kind: VersionKind,
        major: u64,
        minor: Option<u64>,
        patch: Option<u64>,
        qualifier: Option<&str>,
    ) -> Self {
        Self {
            raw: raw.to_string(),
            kind,
            major: Some(major),
            minor,
            patch,
            qualifier: qualifier.map(str::to_string),
            prerelease: qualifier.map_or(false, is_prerelease_qualifier),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> VersionKind {
        self.kind
    }

    pub fn major(&self) -> Option<u64> {
        self.major
    }

    pub fn minor(&self) -> Option<u64> {
        self.minor
    }

    pub fn patch(&self) -> Option<u64> {
        self.patch
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// 仅当后缀是预发布标记时返回后缀
    pub fn prerelease(&self) -> Option<&str> {
        if self.prerelease {
            self.qualifier()
        } else {
            None
        }
    }

    pub fn is_prerelease(&self) -> bool {
        self.prerelease
    }

    /// 比较用的三元组，缺失分量按 0 处理
    pub fn numeric_key(&self) -> (u64, u64, u64) {
        (
            self.major.unwrap_or(0),
            self.minor.unwrap_or(0),
            self.patch.unwrap_or(0),
        )
    }

    /// 判断两个版本在解析意义上是否等价，例如 `1.0` 与 `1.0.0`
    pub fn is_equivalent(&self, other: &ParsedVersion) -> bool {
        if self.raw == other.raw {
            return true;
        }
        if self.kind == VersionKind::Opaque || other.kind == VersionKind::Opaque {
            return false;
        }
        if self.kind.rank() != other.kind.rank() {
            return false;
        }
        let same_qualifier = match (&self.qualifier, &other.qualifier) {
            (None, None) => true,
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        };
        same_qualifier && self.numeric_key() == other.numeric_key()
    }
}

impl fmt::Display for ParsedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for ParsedVersion {
    fn from(raw: &str) -> Self {
        ParsedVersion::parse(raw)
    }
}

fn parse_component(digits: &str) -> Option<u64> {
    digits.parse().ok()
}

fn is_prerelease_qualifier(qualifier: &str) -> bool {
    PRERELEASE_MARKER.is_match(qualifier) || qualifier.to_ascii_lowercase().contains("snapshot")
}

fn looks_like_date(digits: &str) -> bool {
    let year: u32 = digits[..4].parse().unwrap_or(0);
    let month: u32 = digits[4..6].parse().unwrap_or(0);
    let day: u32 = digits[6..8].parse().unwrap_or(0);
    (1900..=2100).contains(&year) && (1..=12).contains(&month) && (1..=31).contains(&day)
}
