use std::num::NonZeroUsize;

use lru::LruCache;

use crate::target::TargetRoute;

#[derive(Clone)]
struct CacheEntry {
    target: TargetRoute,
    revision: u64,
}

/// 路由解析结果缓存。
///
/// 键为 `{方法} {URI} {ajax}`，值为解析出的分发目标。同一URI的ajax请求
/// 与普通请求解析出的目标不同（布局开关相反），因此ajax标志必须参与键。
/// 条目携带写入时的路由表修订号，路由表变化后旧条目在查询时自然失效。
pub struct RouteCache {
    cache: LruCache<String, CacheEntry>,
}

impl RouteCache {
    // 根据容量构造
    pub fn from_capacity(capacity: usize) -> Self {
        if capacity == 0 {
            panic!("调用from_capacity时指定的大小是0。如果需要自动设置大小，请在调用处进行处理，而不是传入0");
        }
        Self {
            cache: LruCache::new(NonZeroUsize::new(capacity).unwrap()),
        }
    }

    /// 构造缓存键
    pub fn key(method: &str, uri: &str, ajax: bool) -> String {
        format!("{} {} {}", method, uri, ajax)
    }

    // 放入
    pub fn push(&mut self, key: &str, target: TargetRoute, revision: u64) {
        let entry = CacheEntry { target, revision };
        self.cache.put(key.to_string(), entry);
    }

    // 查询有效缓存
    pub fn find(&mut self, key: &str, current_revision: u64) -> Option<&TargetRoute> {
        match self.cache.get(key) {
            Some(entry) => {
                if entry.revision == current_revision {
                    Some(&entry.target)
                } else {
                    None
                }
            }
            None => None,
        }
    }

    // 测试
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }
}
