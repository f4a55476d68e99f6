//! Environment variable overrides for persisted settings.
//!
//! The settings file is the primary configuration source; these variables
//! let a host session override it without editing the file. All of them are
//! optional, and invalid values are logged and ignored, never fatal:
//!
//! - POMOCLOCK_POMODORO_MINUTES
//! - POMOCLOCK_SHORT_BREAK_MINUTES
//! - POMOCLOCK_LONG_BREAK_MINUTES
//! - POMOCLOCK_LONG_BREAK_INTERVAL
//! - POMOCLOCK_AUTO_START

use crate::settings::Settings;
use log::{debug, info, warn};
use std::env;

pub const ENV_POMODORO_MINUTES: &str = "POMOCLOCK_POMODORO_MINUTES";
pub const ENV_SHORT_BREAK_MINUTES: &str = "POMOCLOCK_SHORT_BREAK_MINUTES";
pub const ENV_LONG_BREAK_MINUTES: &str = "POMOCLOCK_LONG_BREAK_MINUTES";
pub const ENV_LONG_BREAK_INTERVAL: &str = "POMOCLOCK_LONG_BREAK_INTERVAL";
pub const ENV_AUTO_START: &str = "POMOCLOCK_AUTO_START";

/// Apply any environment overrides on top of `settings`.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Some(minutes) = positive_from_env(ENV_POMODORO_MINUTES) {
        settings.pomodoro_minutes = minutes;
    }
    if let Some(minutes) = positive_from_env(ENV_SHORT_BREAK_MINUTES) {
        settings.short_break_minutes = minutes;
    }
    if let Some(minutes) = positive_from_env(ENV_LONG_BREAK_MINUTES) {
        settings.long_break_minutes = minutes;
    }
    if let Some(interval) = positive_from_env(ENV_LONG_BREAK_INTERVAL) {
        settings.long_break_interval = interval;
    }
    if let Some(auto_start) = bool_from_env(ENV_AUTO_START) {
        settings.auto_start = auto_start;
    }
}

fn positive_from_env(name: &str) -> Option<u32> {
    match env::var(name) {
        Ok(raw) => parse_positive(name, &raw),
        Err(_) => {
            debug!("{} not set", name);
            None
        }
    }
}

fn bool_from_env(name: &str) -> Option<bool> {
    match env::var(name) {
        Ok(raw) => parse_bool(name, &raw),
        Err(_) => {
            debug!("{} not set", name);
            None
        }
    }
}

fn parse_positive(name: &str, raw: &str) -> Option<u32> {
    match raw.parse::<u32>() {
        Ok(0) => {
            warn!("Ignoring {}: must be a positive integer", name);
            None
        }
        Ok(value) => {
            info!("{} overrides settings file: {}", name, value);
            Some(value)
        }
        Err(e) => {
            warn!("Failed to parse {}: {}. Ignoring.", name, e);
            None
        }
    }
}

fn parse_bool(name: &str, raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => {
            info!("{} overrides settings file: true", name);
            Some(true)
        }
        "0" | "false" | "no" | "off" => {
            info!("{} overrides settings file: false", name);
            Some(false)
        }
        other => {
            warn!("Failed to parse {}: '{}' is not a boolean. Ignoring.", name, other);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive("TEST", "25"), Some(25));
        assert_eq!(parse_positive("TEST", "0"), None);
        assert_eq!(parse_positive("TEST", "-3"), None);
        assert_eq!(parse_positive("TEST", "twenty"), None);
        assert_eq!(parse_positive("TEST", ""), None);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TEST", "1"), Some(true));
        assert_eq!(parse_bool("TEST", "TRUE"), Some(true));
        assert_eq!(parse_bool("TEST", "yes"), Some(true));
        assert_eq!(parse_bool("TEST", "0"), Some(false));
        assert_eq!(parse_bool("TEST", "off"), Some(false));
        assert_eq!(parse_bool("TEST", "maybe"), None);
    }
}
