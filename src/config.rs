//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! 配置模块
//!
//! 定义限流与封禁的配置结构，支持从 YAML / TOML 文件加载。
//!
//! ```yaml
//! throttle_interval: 1m
//! max_requests_per_ip: 2
//! ban_duration: 1m
//! ```

use crate::constants::{
    DEFAULT_BAN_DURATION_SECS, DEFAULT_MAX_REQUESTS_PER_IP, DEFAULT_THROTTLE_INTERVAL_SECS,
    MAX_BAN_DURATION_SECS, MAX_REQUESTS_PER_IP_LIMIT, MAX_THROTTLE_INTERVAL_SECS,
};
use crate::error::GuardError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 限流配置
///
/// 守卫创建后不可变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleSettings {
    /// 限流窗口；两次请求间隔超过该值时计数清零
    #[serde(with = "duration_str")]
    pub throttle_interval: Duration,
    /// 窗口内允许的最大请求数（含），第 N+1 个请求触发封禁
    pub max_requests_per_ip: u64,
    /// 封禁时长
    #[serde(with = "duration_str")]
    pub ban_duration: Duration,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            throttle_interval: Duration::from_secs(DEFAULT_THROTTLE_INTERVAL_SECS),
            max_requests_per_ip: DEFAULT_MAX_REQUESTS_PER_IP,
            ban_duration: Duration::from_secs(DEFAULT_BAN_DURATION_SECS),
        }
    }
}

impl ThrottleSettings {
    pub fn new(throttle_interval: Duration, max_requests_per_ip: u64, ban_duration: Duration) -> Self {
        Self {
            throttle_interval,
            max_requests_per_ip,
            ban_duration,
        }
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), GuardError> {
        if self.throttle_interval.is_zero() {
            return Err(GuardError::ValidationError(
                "限流窗口必须大于0".to_string(),
            ));
        }
        if self.throttle_interval > Duration::from_secs(MAX_THROTTLE_INTERVAL_SECS) {
            return Err(GuardError::ValidationError(format!(
                "限流窗口过大，最大值为 {} 秒",
                MAX_THROTTLE_INTERVAL_SECS
            )));
        }
        if self.max_requests_per_ip == 0 {
            return Err(GuardError::ValidationError(
                "最大请求数必须大于0".to_string(),
            ));
        }
        if self.max_requests_per_ip > MAX_REQUESTS_PER_IP_LIMIT {
            return Err(GuardError::ValidationError(format!(
                "最大请求数过大，最大值为 {}",
                MAX_REQUESTS_PER_IP_LIMIT
            )));
        }
        if self.ban_duration.is_zero() {
            return Err(GuardError::ValidationError(
                "封禁时长必须大于0".to_string(),
            ));
        }
        if self.ban_duration > Duration::from_secs(MAX_BAN_DURATION_SECS) {
            return Err(GuardError::ValidationError(format!(
                "封禁时长过大，最大值为 {} 秒",
                MAX_BAN_DURATION_SECS
            )));
        }
        Ok(())
    }

    /// 从 YAML 字符串加载
    pub fn from_yaml_str(content: &str) -> Result<Self, GuardError> {
        let settings: ThrottleSettings = serde_yaml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// 从 TOML 字符串加载
    pub fn from_toml_str(content: &str) -> Result<Self, GuardError> {
        let settings: ThrottleSettings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// 从文件加载，按扩展名选择格式
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GuardError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            other => Err(GuardError::ConfigError(format!(
                "不支持的配置文件格式: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }
}

/// 解析时长字符串（如 "500ms", "10s", "1m", "1h", "1d"）
pub fn parse_duration(value: &str) -> Result<Duration, GuardError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(GuardError::ConfigError("时长不能为空".to_string()));
    }

    let (num_part, unit_part) =
        value.split_at(value.find(|c: char| c.is_alphabetic()).unwrap_or(value.len()));

    let num_str = num_part.trim();
    let unit = unit_part.trim().to_lowercase();

    if num_str.is_empty() {
        return Err(GuardError::ConfigError(
            "时长格式错误：缺少数字部分".to_string(),
        ));
    }

    let num: u64 = num_str
        .parse()
        .map_err(|_| GuardError::ConfigError(format!("无效的数字格式: {}", num_str)))?;

    let multiplier = match unit.as_str() {
        "ms" | "millis" | "milliseconds" => return Ok(Duration::from_millis(num)),
        "" | "s" | "sec" | "second" | "seconds" => 1,
        "m" | "min" | "minute" | "minutes" => 60,
        "h" | "hr" | "hour" | "hours" => 3600,
        "d" | "day" | "days" => 86_400,
        _ => {
            return Err(GuardError::ConfigError(format!(
                "不支持的单位: {}。支持的单位: ms, s, m, h, d",
                unit
            )));
        }
    };

    num.checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(|| GuardError::ConfigError(format!("时长溢出: {}", value)))
}

/// 将时长格式化为 [`parse_duration`] 可读回的最简字符串
pub fn format_duration(duration: Duration) -> String {
    if duration.subsec_nanos() != 0 {
        return format!("{}ms", duration.as_millis());
    }
    let secs = duration.as_secs();
    if secs != 0 && secs % 86_400 == 0 {
        format!("{}d", secs / 86_400)
    } else if secs != 0 && secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs != 0 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

mod duration_str {
    use super::{format_duration, parse_duration};
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_duration(*duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
