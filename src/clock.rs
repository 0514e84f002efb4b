//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! 时钟抽象
//!
//! 每次封禁/限流检查都从注入的时钟读取当前时间，测试中可替换为 [`ManualClock`]。

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::time::Duration;

/// 时钟接口
pub trait Clock: Send + Sync {
    /// 当前时间（UTC）
    fn now(&self) -> DateTime<Utc>;
}

/// 系统时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 手动时钟
///
/// 时间只在调用 [`ManualClock::set`] 或 [`ManualClock::advance`] 时变化。
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// 从 Unix 纪元开始
    pub fn at_epoch() -> Self {
        Self::new(DateTime::<Utc>::default())
    }

    /// 设置当前时间
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write() = now;
    }

    /// 向前推进
    pub fn advance(&self, by: Duration) {
        let delta = chrono::Duration::from_std(by).unwrap_or(chrono::Duration::zero());
        let mut now = self.now.write();
        *now = now.checked_add_signed(delta).unwrap_or(*now);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::at_epoch()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}
