//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! 资源提供方抽象层
//!
//! 定义后端存储接口和基本实现。后端持有资源的持久副本，缓存只是它的镜像。

use crate::error::ProviderError;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// 资源提供方接口
#[async_trait]
pub trait ResourceProvider<T>: Send + Sync {
    /// 读取资源，未知键或后端故障时返回错误
    async fn get_resource(&self, id: &str) -> Result<T, ProviderError>;

    /// 新增或覆盖资源
    async fn add_or_update_resource(&self, id: &str, resource: T) -> Result<(), ProviderError>;
}

/// 内存资源提供方
///
/// 基于 DashMap，同时记录读写次数，便于观察缓存是否生效。
pub struct MemoryProvider<T> {
    data: DashMap<String, T>,
    fetches: AtomicU64,
    stores: AtomicU64,
}

impl<T> MemoryProvider<T> {
    /// 创建空的内存提供方
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
            fetches: AtomicU64::new(0),
            stores: AtomicU64::new(0),
        }
    }

    /// 预置资源（不计入写次数）
    pub fn with_resources<I>(resources: I) -> Self
    where
        I: IntoIterator<Item = (String, T)>,
    {
        let provider = Self::new();
        for (id, resource) in resources {
            provider.data.insert(id, resource);
        }
        provider
    }

    /// 读取次数
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    /// 写入次数
    pub fn store_count(&self) -> u64 {
        self.stores.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> Default for MemoryProvider<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> ResourceProvider<T> for MemoryProvider<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn get_resource(&self, id: &str) -> Result<T, ProviderError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.data
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))
    }

    async fn add_or_update_resource(&self, id: &str, resource: T) -> Result<(), ProviderError> {
        self.stores.fetch_add(1, Ordering::Relaxed);
        self.data.insert(id.to_string(), resource);
        Ok(())
    }
}

type FetchFn<T> = Box<dyn Fn(&str) -> Result<T, ProviderError> + Send + Sync>;
type StoreFn<T> = Box<dyn Fn(&str, T) -> Result<(), ProviderError> + Send + Sync>;

/// 闭包资源提供方
///
/// 由一对读写闭包构成，常用于测试中注入行为。
pub struct FnProvider<T> {
    fetch: FetchFn<T>,
    store: StoreFn<T>,
}

impl<T> FnProvider<T> {
    pub fn new<F, S>(fetch: F, store: S) -> Self
    where
        F: Fn(&str) -> Result<T, ProviderError> + Send + Sync + 'static,
        S: Fn(&str, T) -> Result<(), ProviderError> + Send + Sync + 'static,
    {
        Self {
            fetch: Box::new(fetch),
            store: Box::new(store),
        }
    }
}

#[async_trait]
impl<T> ResourceProvider<T> for FnProvider<T>
where
    T: Send + 'static,
{
    async fn get_resource(&self, id: &str) -> Result<T, ProviderError> {
        (self.fetch)(id)
    }

    async fn add_or_update_resource(&self, id: &str, resource: T) -> Result<(), ProviderError> {
        (self.store)(id, resource)
    }
}
