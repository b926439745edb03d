//! 版本比较与选择
//!
//! 同类版本按 `(major, minor, patch)` 整数比较；不同类按等级比较：
//! SEMVER/PARTIAL/NUMERIC > CALENDAR > OPAQUE。三元组相同时按原始字符串字典序决出，
//! 保证结果确定。

use std::cmp::Ordering;
use std::fmt;

use super::version::{ParsedVersion, VersionKind};

/// 选择策略，每次请求构造一次
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    AbsoluteLatest,
    LatestWithinMajor(u64),
    LatestWithinMajorMinor(u64, u64),
}

impl SelectionPolicy {
    fn admits(&self, version: &ParsedVersion) -> bool {
        match *self {
            SelectionPolicy::AbsoluteLatest => true,
            SelectionPolicy::LatestWithinMajor(major) => version.major() == Some(major),
            SelectionPolicy::LatestWithinMajorMinor(major, minor) => {
                version.major() == Some(major) && version.minor().unwrap_or(0) == minor
            }
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionPolicy::AbsoluteLatest => write!(f, "latest"),
            SelectionPolicy::LatestWithinMajor(major) => write!(f, "major={}", major),
            SelectionPolicy::LatestWithinMajorMinor(major, minor) => {
                write!(f, "major={}, minor={}", major, minor)
            }
        }
    }
}

/// 两个版本的全序比较
pub fn compare(a: &ParsedVersion, b: &ParsedVersion) -> Ordering {
    a.kind()
        .rank()
        .cmp(&b.kind().rank())
        .then_with(|| match (a.kind(), b.kind()) {
            (VersionKind::Opaque, VersionKind::Opaque) => Ordering::Equal,
            _ => a.numeric_key().cmp(&b.numeric_key()),
        })
        // 同一三元组上正式版高于预发布版
        .then_with(|| b.is_prerelease().cmp(&a.is_prerelease()))
        .then_with(|| a.raw().cmp(b.raw()))
}

/// 版本选择器
#[derive(Debug, Clone, Copy, Default)]
pub struct Selector {
    include_prerelease: bool,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 显式要求把预发布版本纳入候选
    pub fn including_prerelease(include_prerelease: bool) -> Self {
        Self { include_prerelease }
    }

    /// 按策略选出最新版本；没有候选时返回 `None`
    pub fn select<'a>(
        &self,
        versions: &'a [ParsedVersion],
        policy: SelectionPolicy,
    ) -> Option<&'a ParsedVersion> {
        versions
            .iter()
            .filter(|v| self.include_prerelease || !v.is_prerelease())
            .filter(|v| policy.admits(v))
            .max_by(|a, b| compare(a, b))
    }
}

/// 使用默认选择器（排除预发布）
pub fn select(versions: &[ParsedVersion], policy: SelectionPolicy) -> Option<&ParsedVersion> {
    Selector::new().select(versions, policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(raws: &[&str]) -> Vec<ParsedVersion> {
        raws.iter().map(|raw| ParsedVersion::parse(raw)).collect()
    }

    fn pick(raws: &[&str], policy: SelectionPolicy) -> Option<String> {
        let versions = parsed(raws);
        select(&versions, policy).map(|v| v.raw().to_string())
    }

    #[test]
    fn absolute_latest_compares_components_as_integers() {
        assert_eq!(
            pick(&["1.9.0", "1.10.0", "1.2.11"], SelectionPolicy::AbsoluteLatest).as_deref(),
            Some("1.10.0")
        );
    }

    #[test]
    fn prerelease_is_excluded_by_default() {
        assert_eq!(
            pick(&["1.0.0", "1.1.0-RC1"], SelectionPolicy::AbsoluteLatest).as_deref(),
            Some("1.0.0")
        );

        let versions = parsed(&["1.0.0", "1.1.0-RC1"]);
        let chosen = Selector::including_prerelease(true)
            .select(&versions, SelectionPolicy::AbsoluteLatest)
            .unwrap();
        assert_eq!(chosen.raw(), "1.1.0-RC1");
    }

    #[test]
    fn only_prereleases_yield_nothing() {
        assert_eq!(pick(&["2.0.0-M1", "2.0.0-RC1"], SelectionPolicy::AbsoluteLatest), None);
    }

    #[test]
    fn calendar_versions_compare_numerically() {
        assert_eq!(
            pick(&["20230101", "20231013", "20240303"], SelectionPolicy::AbsoluteLatest).as_deref(),
            Some("20240303")
        );
    }

    #[test]
    fn within_major() {
        assert_eq!(
            pick(&["1.9.0", "2.0.0", "2.3.1", "3.0.0"], SelectionPolicy::LatestWithinMajor(2)).as_deref(),
            Some("2.3.1")
        );
    }

    #[test]
    fn within_major_minor() {
        assert_eq!(
            pick(&["2.3.0", "2.3.1", "2.4.0"], SelectionPolicy::LatestWithinMajorMinor(2, 3)).as_deref(),
            Some("2.3.1")
        );
    }

    #[test]
    fn absent_major_is_not_found() {
        assert_eq!(pick(&["1.0.0", "2.0.0"], SelectionPolicy::LatestWithinMajor(9)), None);
    }

    #[test]
    fn partial_versions_compete_with_semver() {
        assert_eq!(
            pick(&["1.9", "1.9.1", "1.10"], SelectionPolicy::AbsoluteLatest).as_deref(),
            Some("1.10")
        );
        assert_eq!(
            pick(&["2.3", "2.3.1", "2.4"], SelectionPolicy::LatestWithinMajorMinor(2, 3)).as_deref(),
            Some("2.3.1")
        );
    }

    #[test]
    fn numeric_family_outranks_calendar_and_opaque() {
        assert_eq!(
            pick(&["20240303", "1.0.0", "zzz"], SelectionPolicy::AbsoluteLatest).as_deref(),
            Some("1.0.0")
        );
        assert_eq!(
            pick(&["20240303", "nightly"], SelectionPolicy::AbsoluteLatest).as_deref(),
            Some("20240303")
        );
    }

    #[test]
    fn opaque_only_falls_back_to_lexical_order() {
        assert_eq!(
            pick(&["abc123", "fed456", "0badf00d"], SelectionPolicy::AbsoluteLatest).as_deref(),
            Some("fed456")
        );
    }

    #[test]
    fn equal_tuples_break_ties_on_raw_text() {
        assert_eq!(
            pick(&["31.1.0-android", "31.1.0-jre"], SelectionPolicy::AbsoluteLatest).as_deref(),
            Some("31.1.0-jre")
        );
    }

    #[test]
    fn stable_release_beats_its_own_prereleases() {
        for raws in [["1.0.0", "1.0.0-RC1"], ["1.0.0", "1.0.0-SNAPSHOT"], ["1.0.0-M2", "1.0.0"]] {
            let versions = parsed(&raws);
            let selector = Selector::including_prerelease(true);
            for policy in [
                SelectionPolicy::AbsoluteLatest,
                SelectionPolicy::LatestWithinMajor(1),
                SelectionPolicy::LatestWithinMajorMinor(1, 0),
            ] {
                let chosen = selector.select(&versions, policy).unwrap();
                assert_eq!(chosen.raw(), "1.0.0", "{:?} under {:?}", raws, policy);
            }
        }
        assert_eq!(
            compare(&ParsedVersion::parse("1.0.0"), &ParsedVersion::parse("1.0.0-RC1")),
            Ordering::Greater
        );
    }

    #[test]
    fn absolute_latest_dominates_every_stable_entry() {
        let raws = ["0.1.0", "3.4.5", "3.10.0", "10.0.1", "9.99.99", "10.0.0", "2.0.0-beta"];
        let versions = parsed(&raws);
        let best = select(&versions, SelectionPolicy::AbsoluteLatest).unwrap();
        for v in versions.iter().filter(|v| !v.is_prerelease()) {
            assert!(best.numeric_key() >= v.numeric_key());
        }
        assert_eq!(best.raw(), "10.0.1");
    }
}
