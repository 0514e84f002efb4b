//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! 守卫工厂模块
//!
//! 提供统一的守卫创建接口。
//!
//! # 示例
//!
//! ```rust
//! use resguard::factory::ResourceGuardBuilder;
//! use resguard::provider::MemoryProvider;
//! use std::sync::Arc;
//!
//! let guard = ResourceGuardBuilder::<String>::new()
//!     .provider(Arc::new(MemoryProvider::<String>::new()))
//!     .build()
//!     .unwrap();
//! assert_eq!(guard.cache_len(), 0);
//! ```

use crate::clock::{Clock, SystemClock};
use crate::config::ThrottleSettings;
use crate::error::GuardError;
use crate::guard::ResourceGuard;
use crate::provider::ResourceProvider;
use std::path::Path;
use std::sync::Arc;

#[cfg(feature = "monitoring")]
use crate::telemetry::Metrics;

/// 守卫工厂
pub struct GuardFactory;

impl GuardFactory {
    /// 从配置、资源提供方和时钟创建守卫
    pub fn create<T>(
        settings: ThrottleSettings,
        provider: Arc<dyn ResourceProvider<T>>,
        clock: Arc<dyn Clock>,
    ) -> Result<ResourceGuard<T>, GuardError>
    where
        T: Clone + Send + Sync + 'static,
    {
        ResourceGuard::new(settings, provider, clock)
    }

    /// 从配置文件创建使用系统时钟的守卫
    pub fn from_config_file<T>(
        path: impl AsRef<Path>,
        provider: Arc<dyn ResourceProvider<T>>,
    ) -> Result<ResourceGuard<T>, GuardError>
    where
        T: Clone + Send + Sync + 'static,
    {
        let settings = ThrottleSettings::from_file(path)?;
        ResourceGuard::new(settings, provider, Arc::new(SystemClock))
    }
}

/// 守卫构建器
///
/// 未指定时使用默认配置和系统时钟；资源提供方必须指定。
pub struct ResourceGuardBuilder<T> {
    settings: ThrottleSettings,
    provider: Option<Arc<dyn ResourceProvider<T>>>,
    clock: Arc<dyn Clock>,
    #[cfg(feature = "monitoring")]
    metrics: Option<Arc<Metrics>>,
}

impl<T> ResourceGuardBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            settings: ThrottleSettings::default(),
            provider: None,
            clock: Arc::new(SystemClock),
            #[cfg(feature = "monitoring")]
            metrics: None,
        }
    }

    pub fn settings(mut self, settings: ThrottleSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn provider(mut self, provider: Arc<dyn ResourceProvider<T>>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[cfg(feature = "monitoring")]
    pub fn metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> Result<ResourceGuard<T>, GuardError> {
        let provider = self
            .provider
            .ok_or_else(|| GuardError::ConfigError("未指定资源提供方".to_string()))?;
        let guard = ResourceGuard::new(self.settings, provider, self.clock)?;

        #[cfg(feature = "monitoring")]
        let guard = match self.metrics {
            Some(metrics) => guard.with_metrics(metrics),
            None => guard,
        };

        Ok(guard)
    }
}

impl<T> Default for ResourceGuardBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
