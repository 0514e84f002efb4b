//! 测试通用工具模块
//!
//! 提供测试中常用的工具函数和辅助结构。

#![allow(dead_code)]

use resguard::{
    FnProvider, ManualClock, MemoryProvider, ProviderError, ResourceGuard, ResourceProvider,
    ThrottleSettings,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// 初始化测试日志，输出由测试框架捕获
///
/// 可重复调用；`RUST_LOG` 优先于默认过滤器。
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("resguard=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// 默认测试配置：1 分钟窗口、每窗口 2 次、封禁 1 分钟
pub fn default_settings() -> ThrottleSettings {
    ThrottleSettings::new(Duration::from_secs(60), 2, Duration::from_secs(60))
}

/// 从 Unix 纪元开始的手动时钟
pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::at_epoch())
}

/// 计数型资源提供方
///
/// 读取总是返回 `value`，同时记录读写次数。
pub struct CountingProvider {
    pub provider: Arc<dyn ResourceProvider<i32>>,
    pub fetches: Arc<AtomicUsize>,
    pub stores: Arc<AtomicUsize>,
}

impl CountingProvider {
    pub fn constant(value: i32) -> Self {
        let fetches = Arc::new(AtomicUsize::new(0));
        let stores = Arc::new(AtomicUsize::new(0));
        let fetch_counter = fetches.clone();
        let store_counter = stores.clone();

        let provider = FnProvider::new(
            move |_: &str| {
                fetch_counter.fetch_add(1, Ordering::SeqCst);
                Ok(value)
            },
            move |_: &str, _: i32| {
                store_counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        );

        Self {
            provider: Arc::new(provider),
            fetches,
            stores,
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn store_count(&self) -> usize {
        self.stores.load(Ordering::SeqCst)
    }
}

/// 写入总是失败的资源提供方
pub fn read_only_provider(value: i32) -> Arc<dyn ResourceProvider<i32>> {
    Arc::new(FnProvider::new(
        move |_: &str| Ok(value),
        |id: &str, _: i32| Err(ProviderError::WriteFailed(format!("{} is read-only", id))),
    ))
}

/// 预置资源的内存提供方
pub fn memory_provider(resources: &[(&str, i32)]) -> Arc<MemoryProvider<i32>> {
    Arc::new(MemoryProvider::with_resources(
        resources.iter().map(|(id, value)| (id.to_string(), *value)),
    ))
}

/// 使用默认配置和手动时钟创建守卫
pub fn create_guard(
    provider: Arc<dyn ResourceProvider<i32>>,
) -> (ResourceGuard<i32>, Arc<ManualClock>) {
    let clock = manual_clock();
    let guard = ResourceGuard::new(default_settings(), provider, clock.clone())
        .expect("default settings are valid");
    (guard, clock)
}
