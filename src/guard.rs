//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! ResourceGuard 主控制器
//!
//! 所有读写请求的入口，依次执行：
//! 1. 封禁检查（处于封禁期则直接拒绝，不再计数）
//! 2. 限流检查（本次请求计数，超限时登记封禁并拒绝）
//! 3. 缓存 / 资源提供方
//!
//! 每次检查都从注入的时钟重新读取当前时间。任何失败都以 [`ErrorType`] 标记的响应返回，
//! 不会向调用方抛出错误。

use crate::ban_registry::{BanRecord, BanRegistry};
use crate::cache::ResourceCache;
use crate::clock::Clock;
use crate::config::ThrottleSettings;
use crate::constants::DEFAULT_SWEEP_INTERVAL_SECS;
use crate::error::{CacheError, ErrorType, GuardError};
use crate::provider::ResourceProvider;
use crate::request::{AddOrUpdateRequest, AddOrUpdateResponse, GetRequest, GetResponse};
use crate::throttle::{ThrottleEntry, ThrottleGuard};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "monitoring")]
use crate::telemetry::Metrics;
#[cfg(feature = "monitoring")]
use std::time::Instant;

/// 请求计数
#[derive(Debug, Default)]
struct RequestCounters {
    total: AtomicU64,
    succeeded: AtomicU64,
    banned: AtomicU64,
    throttled: AtomicU64,
    not_found: AtomicU64,
    update_failed: AtomicU64,
    unknown: AtomicU64,
}

impl RequestCounters {
    fn record(&self, outcome: ErrorType) {
        self.total.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            ErrorType::None => &self.succeeded,
            ErrorType::Banned => &self.banned,
            ErrorType::Throttled => &self.throttled,
            ErrorType::ResourceNotFound => &self.not_found,
            ErrorType::UpdateFailed => &self.update_failed,
            ErrorType::UnknownError => &self.unknown,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// 守卫统计快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuardStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub banned_rejections: u64,
    pub throttled_rejections: u64,
    pub resource_not_found: u64,
    pub update_failures: u64,
    pub unknown_errors: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_writes: u64,
    pub fetch_failures: u64,
    pub write_failures: u64,
    pub cache_entries: usize,
    pub ban_records: usize,
    pub tracked_identities: usize,
}

/// 清理结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// 移除的过期封禁数
    pub expired_bans: usize,
    /// 移除的空闲计数条目数
    pub idle_identities: usize,
}

/// 资源守卫
///
/// 为任意资源类型 `T` 提供限流、封禁和读穿透缓存。
pub struct ResourceGuard<T> {
    /// 配置
    settings: ThrottleSettings,

    /// 资源提供方
    provider: Arc<dyn ResourceProvider<T>>,

    /// 时钟
    clock: Arc<dyn Clock>,

    /// 封禁登记表
    bans: Arc<BanRegistry>,

    /// 限流守卫
    throttle: ThrottleGuard,

    /// 资源缓存
    cache: ResourceCache<T>,

    /// 请求计数
    counters: RequestCounters,

    /// 监控指标
    #[cfg(feature = "monitoring")]
    metrics: Option<Arc<Metrics>>,
}

impl<T> ResourceGuard<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// 创建新的守卫，配置不合法时失败
    pub fn new(
        settings: ThrottleSettings,
        provider: Arc<dyn ResourceProvider<T>>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, GuardError> {
        settings.validate()?;

        let bans = Arc::new(BanRegistry::new());
        let throttle = ThrottleGuard::new(&settings, bans.clone());

        info!(
            "创建资源守卫: interval={:?}, max_requests_per_ip={}, ban_duration={:?}",
            settings.throttle_interval, settings.max_requests_per_ip, settings.ban_duration
        );

        Ok(Self {
            settings,
            provider,
            clock,
            bans,
            throttle,
            cache: ResourceCache::new(),
            counters: RequestCounters::default(),
            #[cfg(feature = "monitoring")]
            metrics: None,
        })
    }

    /// 附加 Prometheus 指标
    #[cfg(feature = "monitoring")]
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// 读取资源
    #[instrument(skip_all, fields(ip = %request.ip_address, resource_id = %request.resource_id))]
    pub async fn get_resource(&self, request: GetRequest) -> GetResponse<T> {
        #[cfg(feature = "monitoring")]
        let start = Instant::now();

        let response = match self.admit(&request.ip_address) {
            Err(rejection) => GetResponse::failed(rejection),
            Ok(()) => match self
                .cache
                .get_or_fetch(&request.resource_id, self.provider.as_ref())
                .await
            {
                Ok(resource) => GetResponse::ok(resource),
                Err(e) => {
                    debug!("读取失败: {}", e);
                    GetResponse::failed(ErrorType::ResourceNotFound)
                }
            },
        };

        self.counters.record(response.error());
        #[cfg(feature = "monitoring")]
        self.observe(start, response.error());
        response
    }

    /// 新增或更新资源
    #[instrument(skip_all, fields(ip = %request.ip_address, resource_id = %request.resource_id))]
    pub async fn add_or_update_resource(&self, request: AddOrUpdateRequest<T>) -> AddOrUpdateResponse {
        #[cfg(feature = "monitoring")]
        let start = Instant::now();

        let response = match self.admit(&request.ip_address) {
            Err(rejection) => AddOrUpdateResponse::failed(rejection),
            Ok(()) => match self
                .cache
                .write_through(&request.resource_id, request.resource, self.provider.as_ref())
                .await
            {
                Ok(()) => AddOrUpdateResponse::ok(),
                Err(CacheError::GateClosed) => AddOrUpdateResponse::failed(ErrorType::UnknownError),
                Err(e) => {
                    debug!("写入失败: {}", e);
                    AddOrUpdateResponse::failed(ErrorType::UpdateFailed)
                }
            },
        };

        self.counters.record(response.error());
        #[cfg(feature = "monitoring")]
        self.observe(start, response.error());
        response
    }

    /// 封禁检查在前，限流检查在后；封禁中的请求不计入限流
    fn admit(&self, identity: &str) -> Result<(), ErrorType> {
        if self.bans.is_banned(identity, self.clock.now()) {
            debug!("请求被封禁: identity={}", identity);
            return Err(ErrorType::Banned);
        }

        if self.throttle.is_throttled(identity, self.clock.now()) {
            return Err(ErrorType::Throttled);
        }

        Ok(())
    }

    #[cfg(feature = "monitoring")]
    fn observe(&self, start: Instant, outcome: ErrorType) {
        if let Some(metrics) = &self.metrics {
            metrics.record_request(start.elapsed(), outcome);
            metrics.cache_entries.set(self.cache.len() as i64);
        }
    }

    /// 手动封禁，时长取配置中的 `ban_duration`
    pub fn ban(&self, identity: &str) -> BanRecord {
        self.ban_for(identity, self.settings.ban_duration)
    }

    /// 手动封禁指定时长
    pub fn ban_for(&self, identity: &str, duration: Duration) -> BanRecord {
        self.bans.ban(identity, self.clock.now(), duration)
    }

    /// 解除封禁，同时清零该标识的限流计数
    pub fn unban(&self, identity: &str) -> bool {
        self.throttle.reset(identity);
        self.bans.unban(identity)
    }

    /// 当前有效的封禁记录
    pub fn ban_record(&self, identity: &str) -> Option<BanRecord> {
        self.bans.get(identity, self.clock.now())
    }

    /// 所有有效封禁
    pub fn active_bans(&self) -> Vec<BanRecord> {
        self.bans.active_bans(self.clock.now())
    }

    /// 标识的限流计数状态
    pub fn throttle_entry(&self, identity: &str) -> Option<ThrottleEntry> {
        self.throttle.entry(identity)
    }

    /// 查看缓存中的资源，不回源、不计数
    pub fn cached(&self, resource_id: &str) -> Option<T> {
        self.cache.peek(resource_id)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn settings(&self) -> &ThrottleSettings {
        &self.settings
    }

    /// 统计快照
    pub fn stats(&self) -> GuardStats {
        let cache_stats = self.cache.stats();
        GuardStats {
            total_requests: self.counters.total.load(Ordering::Relaxed),
            successful_requests: self.counters.succeeded.load(Ordering::Relaxed),
            banned_rejections: self.counters.banned.load(Ordering::Relaxed),
            throttled_rejections: self.counters.throttled.load(Ordering::Relaxed),
            resource_not_found: self.counters.not_found.load(Ordering::Relaxed),
            update_failures: self.counters.update_failed.load(Ordering::Relaxed),
            unknown_errors: self.counters.unknown.load(Ordering::Relaxed),
            cache_hits: cache_stats.hits(),
            cache_misses: cache_stats.misses(),
            cache_writes: cache_stats.writes(),
            fetch_failures: cache_stats.fetch_failures(),
            write_failures: cache_stats.write_failures(),
            cache_entries: self.cache.len(),
            ban_records: self.bans.len(),
            tracked_identities: self.throttle.len(),
        }
    }

    /// 清理过期封禁与空闲计数
    ///
    /// 只回收内存，不改变任何检查结果；缓存不参与清理。
    pub fn purge_expired(&self) -> SweepReport {
        let now = self.clock.now();
        let report = SweepReport {
            expired_bans: self.bans.cleanup_expired(now),
            idle_identities: self.throttle.cleanup_idle(now),
        };
        if report.expired_bans > 0 || report.idle_identities > 0 {
            info!(
                "清理完成: expired_bans={}, idle_identities={}",
                report.expired_bans, report.idle_identities
            );
        }
        report
    }

    /// 启动后台清理任务
    ///
    /// 守卫被释放后任务自行退出；也可通过返回的句柄 `abort`。间隔为 0 时返回错误。
    pub fn spawn_sweeper(guard: &Arc<Self>, interval: Duration) -> Result<JoinHandle<()>, GuardError> {
        if interval.is_zero() {
            return Err(GuardError::ValidationError(
                "清理间隔必须大于0".to_string(),
            ));
        }
        Ok(Self::spawn_sweep_task(Arc::downgrade(guard), interval))
    }

    /// 以默认间隔（[`DEFAULT_SWEEP_INTERVAL_SECS`]）启动后台清理任务
    pub fn spawn_default_sweeper(guard: &Arc<Self>) -> JoinHandle<()> {
        Self::spawn_sweep_task(
            Arc::downgrade(guard),
            Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        )
    }

    fn spawn_sweep_task(guard: Weak<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // 第一次 tick 立即完成
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match guard.upgrade() {
                    Some(guard) => {
                        guard.purge_expired();
                    }
                    None => {
                        warn!("资源守卫已释放，停止清理任务");
                        break;
                    }
                }
            }
        })
    }
}
