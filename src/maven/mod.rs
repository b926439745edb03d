//! Maven 版本查询
//!
//! 解析器、选择器、坐标校验是纯函数；[`MavenService`] 把它们和上游数据源、
//! 缓存、兜底表组合成五个工具操作。

pub mod batch;
pub mod cache;
pub mod coordinate;
pub mod envelope;
pub mod error;
pub mod fallback;
pub mod memory;
pub mod operations;
pub mod selector;
pub mod source;
pub mod tools;
pub mod version;

pub use batch::{BatchEntry, BatchItemResult, BatchReport, BatchSummary};
pub use cache::VersionCache;
pub use coordinate::{validate_coordinate, DependencyCoordinate, TargetComponent};
pub use envelope::{AllLatestVersions, LatestVersion, Outcome, ResultEnvelope, VersionExists};
pub use error::{ErrorCode, MavenError};
pub use fallback::FallbackTable;
pub use memory::InMemorySource;
pub use operations::{
    AllLatestVersionsArgs, ComponentVersionArgs, LatestVersionArgs, MavenService,
    VersionExistsArgs,
};
pub use selector::{SelectionPolicy, Selector};
pub use source::{ArtifactQuery, FetchError, MavenCentralClient, VersionSource};
pub use tools::register_tools;
pub use version::{ParsedVersion, VersionKind};
