//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! 监控和日志模块
//!
//! # 功能
//!
//! - `telemetry` 特性：初始化 tracing-subscriber 日志输出
//! - `monitoring` 特性：Prometheus 指标（Counter、Gauge、Histogram）
//!
//! # 示例
//!
//! ```rust,ignore
//! use resguard::telemetry::{init_tracing, Metrics};
//!
//! init_tracing("resguard=debug").unwrap();
//! let metrics = Metrics::new().unwrap();
//! metrics.requests_total.inc();
//! println!("{}", metrics.gather());
//! ```

#[cfg(feature = "monitoring")]
pub use self::monitoring::Metrics;

/// 初始化 tracing 日志
///
/// 优先使用 `RUST_LOG` 环境变量，未设置时使用 `default_filter`。
#[cfg(feature = "telemetry")]
pub fn init_tracing(default_filter: &str) -> Result<(), crate::error::GuardError> {
    use crate::error::GuardError;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| GuardError::TelemetryError(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| GuardError::TelemetryError(e.to_string()))
}

#[cfg(feature = "monitoring")]
mod monitoring {
    use crate::error::{ErrorType, GuardError};
    use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry, TextEncoder};
    use std::time::Duration;
    use tracing::error;

    /// 监控指标
    #[derive(Clone)]
    pub struct Metrics {
        /// 总请求数
        pub requests_total: IntCounter,
        /// 成功的请求数
        pub requests_succeeded: IntCounter,
        /// 因封禁被拒绝的请求数
        pub requests_banned: IntCounter,
        /// 因限流被拒绝的请求数
        pub requests_throttled: IntCounter,
        /// 后端读写失败数
        pub provider_failures: IntCounter,
        /// 当前缓存条目数
        pub cache_entries: IntGauge,
        /// 请求处理延迟分布
        pub request_duration: Histogram,
        /// 指标注册表
        registry: Registry,
    }

    impl Metrics {
        /// 创建并注册所有指标
        pub fn new() -> Result<Self, GuardError> {
            let registry = Registry::new();

            let requests_total = register_counter(
                &registry,
                "resguard_requests_total",
                "Total number of guarded requests",
            )?;
            let requests_succeeded = register_counter(
                &registry,
                "resguard_requests_succeeded_total",
                "Total number of requests that succeeded",
            )?;
            let requests_banned = register_counter(
                &registry,
                "resguard_requests_banned_total",
                "Total number of requests rejected because the client is banned",
            )?;
            let requests_throttled = register_counter(
                &registry,
                "resguard_requests_throttled_total",
                "Total number of requests rejected by throttling",
            )?;
            let provider_failures = register_counter(
                &registry,
                "resguard_provider_failures_total",
                "Total number of failed provider reads and writes",
            )?;

            let cache_entries = IntGauge::with_opts(Opts::new(
                "resguard_cache_entries",
                "Number of cached resources",
            ))
            .map_err(|e| GuardError::TelemetryError(e.to_string()))?;
            registry
                .register(Box::new(cache_entries.clone()))
                .map_err(|e| GuardError::TelemetryError(e.to_string()))?;

            let request_duration = Histogram::with_opts(
                HistogramOpts::new(
                    "resguard_request_duration_seconds",
                    "Duration of guarded requests in seconds",
                )
                .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            )
            .map_err(|e| GuardError::TelemetryError(e.to_string()))?;
            registry
                .register(Box::new(request_duration.clone()))
                .map_err(|e| GuardError::TelemetryError(e.to_string()))?;

            Ok(Self {
                requests_total,
                requests_succeeded,
                requests_banned,
                requests_throttled,
                provider_failures,
                cache_entries,
                request_duration,
                registry,
            })
        }

        /// 记录一次请求结果
        pub fn record_request(&self, duration: Duration, outcome: ErrorType) {
            self.requests_total.inc();
            self.request_duration.observe(duration.as_secs_f64());
            match outcome {
                ErrorType::None => self.requests_succeeded.inc(),
                ErrorType::Banned => self.requests_banned.inc(),
                ErrorType::Throttled => self.requests_throttled.inc(),
                ErrorType::ResourceNotFound | ErrorType::UpdateFailed | ErrorType::UnknownError => {
                    self.provider_failures.inc()
                }
            }
        }

        /// 导出 Prometheus 文本格式
        pub fn gather(&self) -> String {
            let encoder = TextEncoder::new();
            let metric_families = self.registry.gather();
            let mut buffer = Vec::new();
            if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
                error!("Failed to encode metrics: {}", e);
                return String::new();
            }
            String::from_utf8(buffer).unwrap_or_default()
        }

        pub fn registry(&self) -> &Registry {
            &self.registry
        }
    }

    fn register_counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, GuardError> {
        let counter = IntCounter::with_opts(Opts::new(name, help))
            .map_err(|e| GuardError::TelemetryError(e.to_string()))?;
        registry
            .register(Box::new(counter.clone()))
            .map_err(|e| GuardError::TelemetryError(e.to_string()))?;
        Ok(counter)
    }

}
