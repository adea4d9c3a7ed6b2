//! 进程内缓存 (In-memory Cache)
//!
//! 惰性过期：读取时比较 `expires_at`，过期条目视为缺失并等待下一次写入覆盖，不做后台清扫。

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tokio::time::Instant;

use crate::core::model::{ActressDetail, GalleryEntry};
use crate::engine::paginator::PhotoCollection;

/// 结构化缓存键 `(operation, parameters)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Latest,
    Letter(char),
    AlbumPhotos(String),
    Actress { id: String, with_images: bool },
}

/// 缓存载荷
#[derive(Debug, Clone)]
pub enum CachedPayload {
    Entries(Vec<GalleryEntry>),
    /// 仅缓存完整遍历的相册
    Photos(PhotoCollection),
    Detail(ActressDetail),
}

impl CachedPayload {
    /// 列表类载荷中的条目，其余载荷为空
    pub fn entries(&self) -> &[GalleryEntry] {
        match self {
            CachedPayload::Entries(entries) => entries,
            _ => &[],
        }
    }
}

#[derive(Debug)]
pub(crate) struct CacheEntry<V> {
    pub(crate) value: Arc<V>,
    pub(crate) expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        now <= self.expires_at
    }
}

/// 带逐条过期时间的键值缓存
///
/// 条目整体替换，读者只拿到 `Arc` 快照，不会观察到写了一半的值。
/// 迭代顺序为键的首次写入顺序。禁用时 `get` 总是未命中，但写入的条目仍可通过
/// `live_entries` 遍历 (列表查找与搜索依赖它)。
pub struct TtlCache<K, V> {
    entries: RwLock<IndexMap<K, CacheEntry<V>>>,
    enabled: bool,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(enabled: bool) -> Self {
        Self {
            entries: RwLock::new(IndexMap::new()),
            enabled,
        }
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        if !self.enabled {
            return None;
        }
        let now = Instant::now();
        self.entries
            .read()
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone())
    }

    pub fn put(&self, key: K, value: V, ttl: Duration) -> Arc<V> {
        let value = Arc::new(value);
        let entry = CacheEntry {
            value: value.clone(),
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().insert(key, entry);
        value
    }

    /// 所有未过期条目的快照
    pub fn live_entries(&self) -> Vec<(K, Arc<V>)> {
        let now = Instant::now();
        self.entries
            .read()
            .iter()
            .filter(|(_, entry)| entry.is_live(now))
            .map(|(k, entry)| (k.clone(), entry.value.clone()))
            .collect()
    }

    /// 包含已过期但尚未覆盖的条目
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
