//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! 封禁登记表
//!
//! 记录当前被封禁的客户端标识及其解封时间。
//!
//! # 功能
//!
//! - 惰性过期：查询时发现封禁已到期则立即移除，任何检查都不会采信过期封禁
//! - 手动封禁 / 解封
//! - 批量清理过期记录（供后台清理任务使用）
//!
//! 每个标识最多一条记录；不同标识之间互不阻塞。

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// 封禁记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanRecord {
    /// 被封禁的客户端标识
    pub identity: String,
    /// 封禁时间
    pub banned_at: DateTime<Utc>,
    /// 解封时间；当前时间到达或超过该值后封禁失效
    pub ban_end_time: DateTime<Utc>,
}

impl BanRecord {
    /// 在 `now` 时刻是否仍然有效
    #[inline]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.ban_end_time
    }

    /// 剩余封禁时长
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.ban_end_time - now).to_std().unwrap_or(Duration::ZERO)
    }
}

/// 计算解封时间，溢出时取最大可表示时间
pub(crate) fn ban_end_time(now: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(duration)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// 封禁登记表
#[derive(Debug, Default)]
pub struct BanRegistry {
    bans: DashMap<String, BanRecord>,
}

impl BanRegistry {
    pub fn new() -> Self {
        Self {
            bans: DashMap::new(),
        }
    }

    /// 检查标识在 `now` 时刻是否被封禁
    ///
    /// 记录已过期时顺便移除。
    pub fn is_banned(&self, identity: &str, now: DateTime<Utc>) -> bool {
        self.get(identity, now).is_some()
    }

    /// 读取仍然有效的封禁记录
    pub fn get(&self, identity: &str, now: DateTime<Utc>) -> Option<BanRecord> {
        let record = self.bans.get(identity).map(|entry| entry.value().clone())?;
        if record.is_active(now) {
            return Some(record);
        }

        // 条件删除：并发重新封禁产生的新记录不会被误删
        if self
            .bans
            .remove_if(identity, |_, current| !current.is_active(now))
            .is_some()
        {
            debug!("封禁已到期并移除: identity={}", identity);
        }
        None
    }

    /// 封禁标识 `duration` 时长，覆盖已有记录
    pub fn ban(&self, identity: &str, now: DateTime<Utc>, duration: Duration) -> BanRecord {
        let record = BanRecord {
            identity: identity.to_string(),
            banned_at: now,
            ban_end_time: ban_end_time(now, duration),
        };
        self.bans.insert(identity.to_string(), record.clone());
        info!(
            "标识已封禁: identity={}, until={}",
            identity,
            record.ban_end_time.to_rfc3339()
        );
        record
    }

    /// 解除封禁，返回是否存在记录
    pub fn unban(&self, identity: &str) -> bool {
        let removed = self.bans.remove(identity).is_some();
        if removed {
            info!("标识已解封: identity={}", identity);
        }
        removed
    }

    /// 列出 `now` 时刻仍有效的封禁
    pub fn active_bans(&self, now: DateTime<Utc>) -> Vec<BanRecord> {
        self.bans
            .iter()
            .filter(|entry| entry.value().is_active(now))
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// 清理所有已过期的封禁，返回清理数量
    pub fn cleanup_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.bans.len();
        self.bans.retain(|_, record| record.is_active(now));
        before.saturating_sub(self.bans.len())
    }

    /// 记录数（可能包含尚未被惰性清理的过期记录）
    pub fn len(&self) -> usize {
        self.bans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bans.is_empty()
    }
}
