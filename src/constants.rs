//! Centralized constants for the pomoclock timer.
//!
//! This module contains the configurable numerical values used throughout
//! the crate. Each constant includes documentation on its purpose, unit,
//! and recommended value range.

// ============================================================================
// SESSION DURATION DEFAULTS
// ============================================================================

/// Default pomodoro work session length when no settings file exists.
/// Unit: minutes
/// Recommended range: 15-50
pub const POMODORO_DEFAULT_MINUTES: u32 = 25;

/// Default short break length when no settings file exists.
/// Unit: minutes
/// Recommended range: 3-10
pub const SHORT_BREAK_DEFAULT_MINUTES: u32 = 5;

/// Default long break length when no settings file exists.
/// Unit: minutes
/// Recommended range: 10-30
pub const LONG_BREAK_DEFAULT_MINUTES: u32 = 15;

/// Default number of completed pomodoros between long breaks.
/// Unit: count
/// Range: must be at least 1
pub const LONG_BREAK_DEFAULT_INTERVAL: u32 = 4;

// ============================================================================
// TICK SCHEDULING
// ============================================================================

/// Ticker thread wake interval while a countdown is running. Remaining time
/// is recomputed from the wall-clock deadline on every wake, so this value
/// only bounds display latency, never countdown accuracy.
/// Unit: milliseconds
/// Recommended range: 50-500 (lower = smoother display, higher = less CPU)
pub const TICK_INTERVAL_MS: u64 = 100;

// ============================================================================
// NOTIFICATION TIMEOUTS
// ============================================================================

/// Completion notification display duration.
/// Unit: milliseconds
/// Recommended range: 3000-10000 (session changes deserve attention)
pub const NOTIFICATION_TIMEOUT_MS: u32 = 5000;
