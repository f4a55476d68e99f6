//! User-editable timer settings.
//!
//! Settings are the single source of truth for session durations: the state
//! machine re-derives the countdown from them on every reset and mode switch.
//! Validation happens at the apply boundary and on load, so every `Settings`
//! value held by a running timer is known-good.

use crate::constants::{
    LONG_BREAK_DEFAULT_INTERVAL, LONG_BREAK_DEFAULT_MINUTES, POMODORO_DEFAULT_MINUTES,
    SHORT_BREAK_DEFAULT_MINUTES,
};
use crate::session::Mode;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Persisted, user-editable configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Pomodoro work session length in minutes.
    pub pomodoro_minutes: u32,
    /// Short break length in minutes.
    pub short_break_minutes: u32,
    /// Long break length in minutes.
    pub long_break_minutes: u32,
    /// Number of completed pomodoros between long breaks.
    pub long_break_interval: u32,
    /// Start the next session automatically after each completion.
    #[serde(default)]
    pub auto_start: bool,
    /// Deliver desktop notifications on session completion.
    #[serde(default)]
    pub notifications_enabled: bool,
    /// Host UI theme preference; carried through persistence, unused by the
    /// timer itself.
    #[serde(default = "default_dark_theme")]
    pub dark_theme: bool,
}

fn default_dark_theme() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pomodoro_minutes: POMODORO_DEFAULT_MINUTES,
            short_break_minutes: SHORT_BREAK_DEFAULT_MINUTES,
            long_break_minutes: LONG_BREAK_DEFAULT_MINUTES,
            long_break_interval: LONG_BREAK_DEFAULT_INTERVAL,
            auto_start: false,
            notifications_enabled: false,
            dark_theme: default_dark_theme(),
        }
    }
}

impl Settings {
    /// Check that every duration is positive and the long-break interval is
    /// at least one.
    pub fn validate(&self) -> Result<()> {
        if self.pomodoro_minutes == 0 {
            bail!("pomodoro duration must be a positive number of minutes");
        }
        if self.short_break_minutes == 0 {
            bail!("short break duration must be a positive number of minutes");
        }
        if self.long_break_minutes == 0 {
            bail!("long break duration must be a positive number of minutes");
        }
        if self.long_break_interval == 0 {
            bail!("long break interval must be at least 1");
        }
        Ok(())
    }

    /// Configured length of one session of `mode`, in seconds.
    pub fn duration_secs(&self, mode: Mode) -> u64 {
        let minutes = match mode {
            Mode::Pomodoro => self.pomodoro_minutes,
            Mode::ShortBreak => self.short_break_minutes,
            Mode::LongBreak => self.long_break_minutes,
        };
        u64::from(minutes) * 60
    }
}
