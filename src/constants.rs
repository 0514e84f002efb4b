//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! Centralized configuration constants for resguard.
//!
//! All default and upper-bound values used by settings validation and the
//! background sweeper live here.

// ============================================================================
// Throttle Constants
// ============================================================================

/// Default throttle window (1 minute).
pub const DEFAULT_THROTTLE_INTERVAL_SECS: u64 = 60;

/// Default number of requests an identity may make inside one window.
///
/// The request after this many within the window is throttled and bans the identity.
pub const DEFAULT_MAX_REQUESTS_PER_IP: u64 = 100;

/// Largest accepted throttle window (1 day).
pub const MAX_THROTTLE_INTERVAL_SECS: u64 = 86_400;

/// Largest accepted per-window request allowance.
pub const MAX_REQUESTS_PER_IP_LIMIT: u64 = 10_000_000;

// ============================================================================
// Ban Constants
// ============================================================================

/// Default ban duration (1 minute).
pub const DEFAULT_BAN_DURATION_SECS: u64 = 60;

/// Largest accepted ban duration (7 days).
pub const MAX_BAN_DURATION_SECS: u64 = 7 * 86_400;

// ============================================================================
// Sweeper Constants
// ============================================================================

/// Default interval between background sweeps of expired bans and idle
/// throttle entries (1 minute).
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
