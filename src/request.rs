//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! 请求与响应记录

use crate::error::ErrorType;
use serde::{Deserialize, Serialize};

/// 读取请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRequest {
    /// 客户端标识（限流与封禁的键）
    pub ip_address: String,
    /// 调用方标签，不参与限流
    pub email: String,
    /// 资源键
    pub resource_id: String,
}

impl GetRequest {
    pub fn new(
        ip_address: impl Into<String>,
        email: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        Self {
            ip_address: ip_address.into(),
            email: email.into(),
            resource_id: resource_id.into(),
        }
    }
}

/// 新增或更新请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOrUpdateRequest<T> {
    pub ip_address: String,
    pub email: String,
    pub resource_id: String,
    pub resource: T,
}

impl<T> AddOrUpdateRequest<T> {
    pub fn new(
        ip_address: impl Into<String>,
        email: impl Into<String>,
        resource_id: impl Into<String>,
        resource: T,
    ) -> Self {
        Self {
            ip_address: ip_address.into(),
            email: email.into(),
            resource_id: resource_id.into(),
            resource,
        }
    }
}

/// 读取响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetResponse<T> {
    pub success: bool,
    pub resource_data: Option<T>,
    pub error_type: Option<ErrorType>,
}

impl<T> GetResponse<T> {
    pub fn ok(resource: T) -> Self {
        Self {
            success: true,
            resource_data: Some(resource),
            error_type: None,
        }
    }

    pub fn failed(error_type: ErrorType) -> Self {
        Self {
            success: false,
            resource_data: None,
            error_type: Some(error_type),
        }
    }

    /// 错误类型，成功时为 [`ErrorType::None`]
    pub fn error(&self) -> ErrorType {
        self.error_type.unwrap_or(ErrorType::None)
    }
}

/// 新增或更新响应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOrUpdateResponse {
    pub success: bool,
    pub error_type: Option<ErrorType>,
}

impl AddOrUpdateResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error_type: None,
        }
    }

    pub fn failed(error_type: ErrorType) -> Self {
        Self {
            success: false,
            error_type: Some(error_type),
        }
    }

    /// 错误类型，成功时为 [`ErrorType::None`]
    pub fn error(&self) -> ErrorType {
        self.error_type.unwrap_or(ErrorType::None)
    }
}
