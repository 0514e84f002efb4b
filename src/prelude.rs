//! Prelude module - Commonly used types for quick imports
//!
//! This module re-exports the most commonly used types from resguard,
//! allowing users to import them with a single `use resguard::prelude::*;`
//! statement instead of importing each type individually.

// Core types - always available
pub use crate::config::ThrottleSettings;
pub use crate::error::{ErrorType, GuardError, ProviderError};
pub use crate::factory::{GuardFactory, ResourceGuardBuilder};
pub use crate::guard::ResourceGuard;

// Request / response records
pub use crate::request::{AddOrUpdateRequest, AddOrUpdateResponse, GetRequest, GetResponse};

// Collaborators
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::provider::{FnProvider, MemoryProvider, ResourceProvider};

// Feature-gated exports
#[cfg(feature = "monitoring")]
pub use crate::telemetry::Metrics;
