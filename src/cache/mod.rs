//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! 缓存模块
//!
//! 提供位于资源提供方之前的读穿透 / 写穿透缓存。

pub mod resource;

// 重新导出资源缓存的公共 API
pub use resource::{CacheStats, ResourceCache};
