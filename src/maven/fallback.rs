//! 特定工件的兜底查询表
//!
//! 只有在搜索接口与仓库元数据都没有结果时才会查表。每条规则把原查询改写成
//! 另一个查询，由调用方按顺序重试；解析器和选择器对这些规则一无所知。

use super::source::ArtifactQuery;

/// 规则匹配的工件模式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactPattern {
    /// 精确匹配 groupId 与 artifactId
    Exact {
        group_id: &'static str,
        artifact_id: &'static str,
    },
    /// artifactId 后缀匹配
    ArtifactSuffix(&'static str),
    /// 按打包类型匹配
    Packaging(&'static str),
}

impl ArtifactPattern {
    pub fn matches(&self, query: &ArtifactQuery) -> bool {
        match self {
            ArtifactPattern::Exact {
                group_id,
                artifact_id,
            } => query.group_id == *group_id && query.artifact_id == *artifact_id,
            ArtifactPattern::ArtifactSuffix(suffix) => query.artifact_id.ends_with(suffix),
            ArtifactPattern::Packaging(packaging) => query.packaging == *packaging,
        }
    }
}

/// 兜底策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackStrategy {
    /// 同组内版本同步发布的兄弟工件
    SiblingArtifact {
        artifact_id: &'static str,
        packaging: &'static str,
    },
    /// 换一种打包类型重试
    AlternatePackaging(&'static str),
}

impl FallbackStrategy {
    fn rewrite(&self, query: &ArtifactQuery) -> ArtifactQuery {
        match self {
            FallbackStrategy::SiblingArtifact {
                artifact_id,
                packaging,
            } => query.with_artifact_id(artifact_id).with_packaging(packaging),
            FallbackStrategy::AlternatePackaging(packaging) => query.with_packaging(packaging),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackRule {
    pub pattern: ArtifactPattern,
    pub strategy: FallbackStrategy,
}

/// 兜底规则表，按顺序匹配
#[derive(Debug, Clone, Default)]
pub struct FallbackTable {
    rules: Vec<FallbackRule>,
}

impl FallbackTable {
    /// 空表，不做任何兜底
    pub fn empty() -> Self {
        Self::default()
    }

    /// 内置规则
    pub fn standard() -> Self {
        Self::empty()
            .with_rule(
                ArtifactPattern::Exact {
                    group_id: "org.springframework.boot",
                    artifact_id: "spring-boot-dependencies",
                },
                FallbackStrategy::SiblingArtifact {
                    artifact_id: "spring-boot",
                    packaging: "jar",
                },
            )
            .with_rule(
                ArtifactPattern::ArtifactSuffix("-bom"),
                FallbackStrategy::AlternatePackaging("jar"),
            )
            .with_rule(
                ArtifactPattern::ArtifactSuffix("-dependencies"),
                FallbackStrategy::AlternatePackaging("jar"),
            )
            .with_rule(
                ArtifactPattern::Packaging("jar"),
                FallbackStrategy::AlternatePackaging("pom"),
            )
    }

    pub fn with_rule(mut self, pattern: ArtifactPattern, strategy: FallbackStrategy) -> Self {
        self.rules.push(FallbackRule { pattern, strategy });
        self
    }

    /// 按规则顺序给出改写后的查询，去掉重复以及与原查询相同的项
    pub fn alternatives(&self, query: &ArtifactQuery) -> Vec<ArtifactQuery> {
        let mut alternatives: Vec<ArtifactQuery> = Vec::new();
        for rule in self.rules.iter().filter(|rule| rule.pattern.matches(query)) {
            let rewritten = rule.strategy.rewrite(query);
            if rewritten != *query && !alternatives.contains(&rewritten) {
                alternatives.push(rewritten);
            }
        }
        alternatives
    }
}
