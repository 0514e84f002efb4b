//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! 限流守卫
//!
//! 按客户端标识统计窗口内的请求数，超出上限时登记封禁。
//!
//! 窗口为"间隔重置"式：与上一次计数请求的间隔超过 `throttle_interval` 时计数整体清零，
//! 而不是严格的滚动窗口。每次检查本身也计入一次请求。

use crate::ban_registry::BanRegistry;
use crate::config::ThrottleSettings;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{trace, warn};

/// 单个标识的计数状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleEntry {
    /// 当前窗口内最近一次计数请求的时间
    pub last_request_time: DateTime<Utc>,
    /// 窗口重置以来的请求数
    pub request_count: u64,
}

impl ThrottleEntry {
    fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            last_request_time: now,
            request_count: 0,
        }
    }
}

/// 限流守卫
///
/// 计数表与封禁登记表都是分片并发表，不同标识之间互不阻塞；
/// 同一标识的读-改-写在分片锁内完成。
pub struct ThrottleGuard {
    entries: DashMap<String, ThrottleEntry>,
    bans: Arc<BanRegistry>,
    throttle_interval: chrono::Duration,
    max_requests_per_ip: u64,
    ban_duration: std::time::Duration,
}

impl ThrottleGuard {
    pub fn new(settings: &ThrottleSettings, bans: Arc<BanRegistry>) -> Self {
        Self {
            entries: DashMap::new(),
            bans,
            throttle_interval: chrono::Duration::from_std(settings.throttle_interval)
                .unwrap_or(chrono::Duration::MAX),
            max_requests_per_ip: settings.max_requests_per_ip,
            ban_duration: settings.ban_duration,
        }
    }

    /// 计数并判断是否被限流
    ///
    /// 返回 `true` 时已为该标识登记封禁，解封时间为 `now + ban_duration`。
    pub fn is_throttled(&self, identity: &str, now: DateTime<Utc>) -> bool {
        let request_count = {
            let mut entry = self
                .entries
                .entry(identity.to_string())
                .or_insert_with(|| ThrottleEntry::fresh(now));

            if now.signed_duration_since(entry.last_request_time) > self.throttle_interval {
                *entry = ThrottleEntry::fresh(now);
            }

            entry.request_count = entry.request_count.saturating_add(1);
            entry.last_request_time = now;
            entry.request_count
        };

        trace!(
            "限流计数: identity={}, count={}, limit={}",
            identity,
            request_count,
            self.max_requests_per_ip
        );

        if request_count > self.max_requests_per_ip {
            warn!(
                "请求超出限额，登记封禁: identity={}, count={}",
                identity, request_count
            );
            self.bans.ban(identity, now, self.ban_duration);
            return true;
        }

        false
    }

    /// 读取标识的计数状态
    pub fn entry(&self, identity: &str) -> Option<ThrottleEntry> {
        self.entries.get(identity).map(|entry| *entry.value())
    }

    /// 清除标识的计数
    pub fn reset(&self, identity: &str) -> bool {
        self.entries.remove(identity).is_some()
    }

    /// 清理窗口已过期的计数，返回清理数量
    ///
    /// 被清理的条目在下一次请求时本来也会被重置，因此不改变限流结果。
    pub fn cleanup_idle(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let interval = self.throttle_interval;
        self.entries
            .retain(|_, entry| now.signed_duration_since(entry.last_request_time) <= interval);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
