//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! 资源缓存实现
//!
//! 读穿透 + 写穿透缓存，位于资源提供方之前。
//!
//! # 并发模型
//!
//! - **读闸门**: 全局互斥锁，缓存检查与后端读取整体串行，同一个键的缓存击穿最多触发一次后端读取
//! - **写闸门**: 容量为 1 的信号量，写操作彼此串行，但与读操作互不阻塞
//! - 两个闸门只在单次缓存/后端操作期间持有
//!
//! 缓存不做淘汰，也不过期；一旦填充即视为权威值，不再回源校验。

use crate::error::{CacheError, ProviderError};
use crate::provider::ResourceProvider;
use dashmap::DashMap;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, warn};

/// 缓存统计信息
#[derive(Debug, Default)]
pub struct CacheStats {
    /// 命中次数
    hits: AtomicU64,
    /// 未命中次数（即后端读取次数）
    misses: AtomicU64,
    /// 后端读取失败次数
    fetch_failures: AtomicU64,
    /// 写入次数
    writes: AtomicU64,
    /// 写入失败次数
    write_failures: AtomicU64,
}

impl CacheStats {
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn fetch_failures(&self) -> u64 {
        self.fetch_failures.load(Ordering::Relaxed)
    }

    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits() + self.misses();
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }
}

/// 资源缓存
pub struct ResourceCache<T> {
    /// 缓存数据
    entries: DashMap<String, T>,
    /// 读闸门
    fetch_gate: Mutex<()>,
    /// 写闸门
    write_gate: Semaphore,
    /// 统计信息
    stats: CacheStats,
}

impl<T> ResourceCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            fetch_gate: Mutex::new(()),
            write_gate: Semaphore::new(1),
            stats: CacheStats::default(),
        }
    }

    /// 读取资源，未命中时回源并填充缓存
    ///
    /// 后端失败（包括 panic）时缓存保持不变。
    pub async fn get_or_fetch<P>(&self, key: &str, provider: &P) -> Result<T, CacheError>
    where
        P: ResourceProvider<T> + ?Sized,
    {
        let _gate = self.fetch_gate.lock().await;

        if let Some(value) = self.peek(key) {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            debug!("缓存命中: key={}", key);
            return Ok(value);
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        debug!("缓存未命中，回源读取: key={}", key);

        match guarded(provider.get_resource(key)).await {
            Ok(value) => {
                self.entries.insert(key.to_string(), value.clone());
                Ok(value)
            }
            Err(e) => {
                self.stats.fetch_failures.fetch_add(1, Ordering::Relaxed);
                warn!("回源读取失败: key={}, error={}", key, e);
                Err(e)
            }
        }
    }

    /// 写穿透：先写后端，成功后覆盖缓存
    ///
    /// 后端失败时缓存保持不变，即使后端已部分写入。
    pub async fn write_through<P>(&self, key: &str, value: T, provider: &P) -> Result<(), CacheError>
    where
        P: ResourceProvider<T> + ?Sized,
    {
        let _permit = self
            .write_gate
            .acquire()
            .await
            .map_err(|_| CacheError::GateClosed)?;

        match guarded(provider.add_or_update_resource(key, value.clone())).await {
            Ok(()) => {
                self.entries.insert(key.to_string(), value);
                self.stats.writes.fetch_add(1, Ordering::Relaxed);
                debug!("写穿透完成: key={}", key);
                Ok(())
            }
            Err(e) => {
                self.stats.write_failures.fetch_add(1, Ordering::Relaxed);
                warn!("后端写入失败: key={}, error={}", key, e);
                Err(e)
            }
        }
    }

    /// 只读查看缓存，不回源
    pub fn peek(&self, key: &str) -> Option<T> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl<T> Default for ResourceCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// 执行后端调用，将 panic 转为错误
async fn guarded<F, R>(call: F) -> Result<R, CacheError>
where
    F: Future<Output = Result<R, ProviderError>>,
{
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(result) => result.map_err(CacheError::from),
        Err(payload) => Err(CacheError::ProviderPanicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
