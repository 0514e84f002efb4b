//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! resguard - Throttled, ban-aware resource access layer
//!
//! Sits in front of a pluggable resource provider and arbitrates every read
//! and write through per-client throttling, temporary bans and a read-through
//! cache.
//!
//! # API Layers
//!
//! ## Prelude (Quick Start)
//!
//! Use `use resguard::prelude::*;` to import all commonly used types.
//!
//! ## Core API
//!
//! - [`ResourceGuard`] - Main controller: ban check, throttle check, cache, provider
//! - [`ThrottleSettings`] - Throttle window, request allowance and ban duration
//! - [`ErrorType`] - Failure tag carried by every response
//! - [`ResourceProvider`] - Backing store the guard delegates to
//! - [`Clock`] - Injectable time source
//!
//! ## Building blocks
//!
//! - [`BanRegistry`] - Banned identities with lazy expiry
//! - [`ThrottleGuard`] - Per-identity request counting with interval reset
//! - [`ResourceCache`] - Read-through / write-through cache with serialized fetches
//!
//! # Examples
//!
//! ```rust
//! use resguard::prelude::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let provider: Arc<dyn ResourceProvider<i32>> =
//!         Arc::new(MemoryProvider::with_resources(vec![("id1".to_string(), 1)]));
//!     let settings = ThrottleSettings::new(Duration::from_secs(60), 2, Duration::from_secs(60));
//!     let guard = GuardFactory::create(settings, provider, Arc::new(SystemClock)).unwrap();
//!
//!     let response = guard.get_resource(GetRequest::new("127.0.0.1", "user@example.com", "id1")).await;
//!     assert_eq!(response.resource_data, Some(1));
//! }
//! ```
//!
//! # Features
//!
//! - **Sliding-reset throttling**: the window restarts after any gap longer than the interval
//! - **Automatic bans**: exceeding the allowance bans the identity for a fixed duration
//! - **Stampede-safe cache**: at most one provider fetch per missing key
//! - **Telemetry**: `tracing` everywhere, optional subscriber init (`telemetry`) and Prometheus metrics (`monitoring`)

pub mod prelude;

pub mod ban_registry;
pub mod cache;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod factory;
pub mod guard;
pub mod provider;
pub mod request;
#[cfg(any(feature = "telemetry", feature = "monitoring"))]
pub mod telemetry;
pub mod throttle;

// 重新导出常用类型
pub use ban_registry::{BanRecord, BanRegistry};
pub use cache::{CacheStats, ResourceCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{parse_duration, ThrottleSettings};
pub use error::{CacheError, ErrorType, GuardError, ProviderError};
pub use factory::{GuardFactory, ResourceGuardBuilder};
pub use guard::{GuardStats, ResourceGuard, SweepReport};
pub use provider::{FnProvider, MemoryProvider, ResourceProvider};
pub use request::{AddOrUpdateRequest, AddOrUpdateResponse, GetRequest, GetResponse};
#[cfg(feature = "telemetry")]
pub use telemetry::init_tracing;
#[cfg(feature = "monitoring")]
pub use telemetry::Metrics;
pub use throttle::{ThrottleEntry, ThrottleGuard};
