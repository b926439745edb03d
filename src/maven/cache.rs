//! 上游版本列表的有界 TTL 缓存
//!
//! 缓存由调用方显式创建并传入 [`MavenService`](super::operations::MavenService)，
//! 不存在全局状态。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::source::ArtifactQuery;
use crate::settings::Settings;

#[derive(Debug)]
struct CacheEntry {
    versions: Arc<Vec<String>>,
    inserted_at: Instant,
}

/// 以 `(groupId, artifactId, packaging, classifier)` 为键的版本缓存
#[derive(Debug)]
pub struct VersionCache {
    ttl: Duration,
    capacity: usize,
    entries: Mutex<HashMap<ArtifactQuery, CacheEntry>>,
}

impl VersionCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// 不缓存任何内容
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, 0)
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.cache_ttl(), settings.cache_capacity)
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero() && self.capacity > 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ArtifactQuery, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 读取未过期的条目，过期条目顺便删除
    pub fn get(&self, key: &ArtifactQuery) -> Option<Arc<Vec<String>>> {
        if !self.is_enabled() {
            return None;
        }
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.versions.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// 写入条目；满容量时先清掉过期项，再淘汰最早写入的项
    pub fn insert(&self, key: ArtifactQuery, versions: Vec<String>) -> Arc<Vec<String>> {
        let versions = Arc::new(versions);
        if !self.is_enabled() {
            return versions;
        }

        let mut entries = self.lock();
        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            let ttl = self.ttl;
            entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
            while entries.len() >= self.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.inserted_at)
                    .map(|(key, _)| key.clone());
                match oldest {
                    Some(oldest) => {
                        entries.remove(&oldest);
                    }
                    None => break,
                }
            }
        }

        entries.insert(
            key,
            CacheEntry {
                versions: versions.clone(),
                inserted_at: Instant::now(),
            },
        );
        versions
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
