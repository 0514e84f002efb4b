//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! 错误类型定义
//!
//! 使用thiserror定义所有错误类型。请求路径上的失败不会以 `Err` 形式返回给调用方，
//! 而是统一转换为 [`ErrorType`] 标记的失败结果。

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 请求失败类型
///
/// 调用方只会通过响应中的该枚举得知失败原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    /// 无错误
    None,
    /// 本次请求触发了限流（同时产生封禁）
    Throttled,
    /// 客户端处于封禁期
    Banned,
    /// 读取时后端无法提供该资源
    ResourceNotFound,
    /// 写入时后端失败
    UpdateFailed,
    /// 未分类错误（保留）
    UnknownError,
}

impl ErrorType {
    /// 是否表示失败
    pub fn is_failure(&self) -> bool {
        !matches!(self, ErrorType::None)
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorType::None => "none",
            ErrorType::Throttled => "throttled",
            ErrorType::Banned => "banned",
            ErrorType::ResourceNotFound => "resource_not_found",
            ErrorType::UpdateFailed => "update_failed",
            ErrorType::UnknownError => "unknown_error",
        };
        f.write_str(name)
    }
}

/// 构造期错误
///
/// 只在创建守卫、加载配置、初始化监控时出现。
#[derive(Error, Debug)]
pub enum GuardError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 验证错误
    #[error("验证错误: {0}")]
    ValidationError(String),

    /// IO错误
    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML解析错误
    #[error("YAML解析错误: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML解析错误
    #[error("TOML解析错误: {0}")]
    TomlError(#[from] toml::de::Error),

    /// 监控初始化错误
    #[error("监控初始化错误: {0}")]
    TelemetryError(String),
}

/// 资源提供方错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// 未找到
    #[error("未找到: {0}")]
    NotFound(String),

    /// 后端不可用
    #[error("后端不可用: {0}")]
    Unavailable(String),

    /// 写入失败
    #[error("写入失败: {0}")]
    WriteFailed(String),

    /// 其他错误
    #[error("未知错误: {0}")]
    Other(String),
}

/// 缓存层错误
///
/// 由守卫转换为 [`ErrorType`]，不会直接返回给调用方。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// 后端返回错误
    #[error("后端错误: {0}")]
    Provider(#[from] ProviderError),

    /// 后端调用 panic
    #[error("后端调用异常终止: {0}")]
    ProviderPanicked(String),

    /// 写入闸门已关闭
    #[error("写入闸门已关闭")]
    GateClosed,
}
