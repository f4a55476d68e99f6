//! Countdown session state machine.
//!
//! The countdown is anchored to an absolute wall-clock deadline
//! (`target_epoch_millis`) set when the timer starts. Every tick recomputes
//! the remaining time from that deadline instead of decrementing a counter,
//! so accuracy survives throttled, delayed, or skipped ticks.
//!
//! Completion fires at most once per expiry: the state transitions to
//! not-running before completion handling runs, so a tick arriving after
//! expiry observes a stopped timer and does nothing. Every ticker is tagged
//! with a generation; `pause`, `reset`, and `switch_mode` bump it, so a stale
//! tick can never mutate state after cancellation.

use crate::clock::Clock;
use crate::settings::Settings;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Session type for the current countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Pomodoro,
    ShortBreak,
    LongBreak,
}

impl Mode {
    /// Human-readable label for display surfaces.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Pomodoro => "Pomodoro",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Read-only view of the timer handed to the rendering sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Remaining time formatted as `mm:ss`.
    pub formatted_time: String,
    pub mode: Mode,
    pub completed_pomodoros: u32,
    /// Mode the timer will switch to when the current session completes.
    pub predicted_next: Mode,
    pub running: bool,
}

/// Emitted exactly once per session completion, natural expiry or skip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Completion {
    /// Mode of the session that just ended.
    pub finished: Mode,
    /// Mode the timer switched to.
    pub next: Mode,
    /// Lifetime pomodoro count after this completion.
    pub completed_pomodoros: u32,
    /// Whether the next session was armed immediately (auto-start setting).
    pub auto_started: bool,
}

impl Completion {
    /// Notification title for this completion.
    pub fn title(&self) -> &'static str {
        if self.finished == Mode::Pomodoro {
            "Pomodoro Complete!"
        } else {
            "Break Over!"
        }
    }

    /// Notification body, selected by the upcoming mode.
    pub fn body(&self) -> &'static str {
        match self.next {
            Mode::LongBreak => "Time for a long break!",
            Mode::ShortBreak => "Time for a short break!",
            Mode::Pomodoro => "Back to work!",
        }
    }
}

/// Outcome of a single tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// Countdown still running; remaining seconds after recomputation.
    Running(u64),
    /// The session expired on this tick. `next_gen` carries the ticker
    /// generation of the auto-started follow-up session, if any.
    Completed {
        done: Completion,
        next_gen: Option<u64>,
    },
    /// The countdown this tick was driving has been cancelled or replaced.
    Stale,
}

struct SessionInner {
    mode: Mode,
    remaining_seconds: u64,
    running: bool,
    completed_pomodoros: u32,
    /// Absolute countdown deadline while running.
    target_epoch_millis: Option<u64>,
    settings: Settings,
    /// Bumped whenever the current countdown is cancelled or replaced, so a
    /// ticker armed for an earlier countdown can tell it is stale.
    generation: u64,
}

/// Shared countdown state. Clones refer to the same underlying session.
#[derive(Clone)]
pub struct SessionState {
    inner: Arc<Mutex<SessionInner>>,
    clock: Arc<dyn Clock>,
}

impl SessionState {
    pub fn new(settings: Settings, clock: Arc<dyn Clock>) -> Self {
        let remaining_seconds = settings.duration_secs(Mode::Pomodoro);
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                mode: Mode::Pomodoro,
                remaining_seconds,
                running: false,
                completed_pomodoros: 0,
                target_epoch_millis: None,
                settings,
                generation: 0,
            })),
            clock,
        }
    }

    /// Arm the countdown against the wall clock. No-op when already running.
    /// Returns the ticker generation when a new countdown was armed.
    pub fn start(&self) -> Option<u64> {
        let mut s = self.inner.lock();
        if s.running {
            return None;
        }
        let now = self.clock.now_millis();
        let generation = arm_locked(&mut s, now);
        log::debug!(
            "{} countdown armed: {}s remaining",
            s.mode,
            s.remaining_seconds
        );
        Some(generation)
    }

    /// Stop the countdown and clear the deadline. Idempotent.
    pub fn pause(&self) {
        let mut s = self.inner.lock();
        stop_locked(&mut s);
    }

    /// Stop and re-derive the countdown from the configured duration of the
    /// current mode. With `auto_start` requested and the auto-start setting
    /// on, a fresh countdown is armed; its generation is returned.
    pub fn reset(&self, auto_start: bool) -> Option<u64> {
        let mut s = self.inner.lock();
        stop_locked(&mut s);
        s.remaining_seconds = s.settings.duration_secs(s.mode);
        if auto_start && s.settings.auto_start {
            let now = self.clock.now_millis();
            return Some(arm_locked(&mut s, now));
        }
        None
    }

    /// Switch to `new_mode` and reset the countdown to its configured
    /// duration. Interrupts a running timer without confirmation; whether
    /// that needs guarding is the caller's concern.
    pub fn switch_mode(&self, new_mode: Mode) {
        let mut s = self.inner.lock();
        s.mode = new_mode;
        stop_locked(&mut s);
        s.remaining_seconds = s.settings.duration_secs(new_mode);
    }

    /// End the current session immediately, running the same completion
    /// handling as a natural expiry regardless of remaining time.
    pub fn skip(&self) -> (Completion, Option<u64>) {
        let mut s = self.inner.lock();
        stop_locked(&mut s);
        let now = self.clock.now_millis();
        complete_locked(&mut s, now)
    }

    /// Replace the settings after validation. While idle, the countdown is
    /// re-derived for the current mode immediately; a running countdown keeps
    /// its deadline. On validation failure nothing changes.
    pub fn apply_settings(&self, new_settings: Settings) -> anyhow::Result<()> {
        new_settings.validate()?;
        let mut s = self.inner.lock();
        s.settings = new_settings;
        if !s.running {
            s.remaining_seconds = s.settings.duration_secs(s.mode);
        }
        Ok(())
    }

    /// Recompute the countdown from the wall-clock deadline. Called by the
    /// periodic ticker with the generation it was armed with.
    pub fn on_tick(&self, generation: u64) -> Tick {
        let mut s = self.inner.lock();
        if !s.running || s.generation != generation {
            return Tick::Stale;
        }
        let target = match s.target_epoch_millis {
            Some(target) => target,
            None => return Tick::Stale,
        };
        let now = self.clock.now_millis();
        let remaining = if now >= target {
            0
        } else {
            (target - now).div_ceil(1000)
        };
        if remaining == 0 {
            // Not running from here on; a late tick cannot re-complete.
            s.remaining_seconds = 0;
            s.running = false;
            s.target_epoch_millis = None;
            let (done, next_gen) = complete_locked(&mut s, now);
            Tick::Completed { done, next_gen }
        } else {
            s.remaining_seconds = remaining;
            Tick::Running(remaining)
        }
    }

    /// Read-only view for rendering.
    pub fn snapshot(&self) -> Snapshot {
        let s = self.inner.lock();
        Snapshot {
            formatted_time: format_mmss(s.remaining_seconds),
            mode: s.mode,
            completed_pomodoros: s.completed_pomodoros,
            predicted_next: predict_next(
                s.mode,
                s.completed_pomodoros,
                s.settings.long_break_interval,
            ),
            running: s.running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().running
    }

    pub fn mode(&self) -> Mode {
        self.inner.lock().mode
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.inner.lock().remaining_seconds
    }

    pub fn completed_pomodoros(&self) -> u32 {
        self.inner.lock().completed_pomodoros
    }

    pub fn settings(&self) -> Settings {
        self.inner.lock().settings.clone()
    }

    pub fn notifications_enabled(&self) -> bool {
        self.inner.lock().settings.notifications_enabled
    }

    /// Restore the lifetime pomodoro count from persisted stats. Intended
    /// for startup, before the first countdown is armed.
    pub fn restore_completed(&self, completed_pomodoros: u32) {
        self.inner.lock().completed_pomodoros = completed_pomodoros;
    }
}

fn arm_locked(s: &mut SessionInner, now: u64) -> u64 {
    s.target_epoch_millis = Some(now + s.remaining_seconds * 1000);
    s.running = true;
    s.generation += 1;
    s.generation
}

fn stop_locked(s: &mut SessionInner) {
    s.running = false;
    s.target_epoch_millis = None;
    s.generation += 1;
}

/// Completion handling shared by natural expiry and skip. The caller has
/// already stopped the countdown.
fn complete_locked(s: &mut SessionInner, now: u64) -> (Completion, Option<u64>) {
    let finished = s.mode;
    let next = if finished == Mode::Pomodoro {
        s.completed_pomodoros += 1;
        if s.completed_pomodoros % s.settings.long_break_interval == 0 {
            Mode::LongBreak
        } else {
            Mode::ShortBreak
        }
    } else {
        Mode::Pomodoro
    };

    s.mode = next;
    s.remaining_seconds = s.settings.duration_secs(next);
    s.running = false;
    s.target_epoch_millis = None;

    let auto_started = s.settings.auto_start;
    let next_gen = auto_started.then(|| arm_locked(s, now));

    (
        Completion {
            finished,
            next,
            completed_pomodoros: s.completed_pomodoros,
            auto_started,
        },
        next_gen,
    )
}

/// Predicted mode after the current session completes. Pure function of the
/// visible state, used for the "Next: ..." indicator.
pub fn predict_next(mode: Mode, completed_pomodoros: u32, long_break_interval: u32) -> Mode {
    match mode {
        Mode::Pomodoro => {
            if (completed_pomodoros + 1) % long_break_interval == 0 {
                Mode::LongBreak
            } else {
                Mode::ShortBreak
            }
        }
        Mode::ShortBreak | Mode::LongBreak => Mode::Pomodoro,
    }
}

/// Format a second count as `mm:ss`.
pub fn format_mmss(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn state_with(settings: Settings) -> (SessionState, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        (SessionState::new(settings, clock.clone()), clock)
    }

    #[test]
    fn test_initial_state() {
        let (state, _clock) = state_with(Settings::default());
        let snap = state.snapshot();
        assert_eq!(snap.mode, Mode::Pomodoro);
        assert_eq!(snap.formatted_time, "25:00");
        assert_eq!(snap.completed_pomodoros, 0);
        assert_eq!(snap.predicted_next, Mode::ShortBreak);
        assert!(!snap.running);
    }

    #[test]
    fn test_start_is_noop_while_running() {
        let (state, _clock) = state_with(Settings::default());
        assert!(state.start().is_some());
        assert!(state.start().is_none());
        assert!(state.is_running());
    }

    #[test]
    fn test_tick_recomputes_from_deadline() {
        let (state, clock) = state_with(Settings::default());
        let gen = state.start().unwrap();

        // 90 seconds pass in one giant gap; remaining snaps to the truth.
        clock.advance(90_000);
        assert_eq!(state.on_tick(gen), Tick::Running(1500 - 90));

        // Sub-second progress rounds up.
        clock.advance(500);
        assert_eq!(state.on_tick(gen), Tick::Running(1410));
    }

    #[test]
    fn test_completion_fires_once() {
        let (state, clock) = state_with(Settings {
            pomodoro_minutes: 1,
            ..Settings::default()
        });
        let gen = state.start().unwrap();

        clock.advance(60_000);
        let tick = state.on_tick(gen);
        match tick {
            Tick::Completed { done, next_gen } => {
                assert_eq!(done.finished, Mode::Pomodoro);
                assert_eq!(done.next, Mode::ShortBreak);
                assert_eq!(done.completed_pomodoros, 1);
                assert!(!done.auto_started);
                assert!(next_gen.is_none());
            }
            other => panic!("expected completion, got {:?}", other),
        }

        // A tick arriving after expiry must not re-trigger completion.
        clock.advance(10_000);
        assert_eq!(state.on_tick(gen), Tick::Stale);
        assert!(!state.is_running());
    }

    #[test]
    fn test_stale_tick_after_pause_does_not_mutate() {
        let (state, clock) = state_with(Settings::default());
        let gen = state.start().unwrap();
        state.pause();

        let before = state.snapshot();
        clock.advance(3_600_000);
        assert_eq!(state.on_tick(gen), Tick::Stale);
        assert_eq!(state.snapshot(), before);
    }

    #[test]
    fn test_pause_idempotent() {
        let (state, _clock) = state_with(Settings::default());
        state.start();
        state.pause();
        let once = state.snapshot();
        state.pause();
        assert_eq!(state.snapshot(), once);
    }

    #[test]
    fn test_auto_start_chains_sessions() {
        let (state, clock) = state_with(Settings {
            pomodoro_minutes: 1,
            short_break_minutes: 1,
            auto_start: true,
            ..Settings::default()
        });
        let gen = state.start().unwrap();

        clock.advance(60_000);
        let next_gen = match state.on_tick(gen) {
            Tick::Completed { done, next_gen } => {
                assert!(done.auto_started);
                next_gen.expect("auto-start should arm the next session")
            }
            other => panic!("expected completion, got {:?}", other),
        };

        assert!(state.is_running());
        assert_eq!(state.mode(), Mode::ShortBreak);

        // The old generation is dead, the new one drives the break.
        assert_eq!(state.on_tick(gen), Tick::Stale);
        clock.advance(30_000);
        assert_eq!(state.on_tick(next_gen), Tick::Running(30));
    }

    #[test]
    fn test_switch_mode_resets_countdown() {
        let (state, _clock) = state_with(Settings::default());
        state.start();
        state.switch_mode(Mode::LongBreak);
        assert!(!state.is_running());
        assert_eq!(state.mode(), Mode::LongBreak);
        assert_eq!(state.remaining_seconds(), 15 * 60);
    }

    #[test]
    fn test_apply_settings_idle_rederives_remaining() {
        let (state, _clock) = state_with(Settings::default());
        let new = Settings {
            pomodoro_minutes: 50,
            ..Settings::default()
        };
        state.apply_settings(new).unwrap();
        assert_eq!(state.remaining_seconds(), 50 * 60);
    }

    #[test]
    fn test_apply_settings_running_keeps_deadline() {
        let (state, clock) = state_with(Settings::default());
        let gen = state.start().unwrap();
        state
            .apply_settings(Settings {
                pomodoro_minutes: 50,
                ..Settings::default()
            })
            .unwrap();

        // Still counting toward the original 25-minute deadline.
        clock.advance(1_000);
        assert_eq!(state.on_tick(gen), Tick::Running(1499));
    }

    #[test]
    fn test_apply_settings_invalid_retains_previous() {
        let (state, _clock) = state_with(Settings::default());
        let bad = Settings {
            pomodoro_minutes: 0,
            ..Settings::default()
        };
        assert!(state.apply_settings(bad).is_err());
        assert_eq!(state.settings(), Settings::default());
        assert_eq!(state.remaining_seconds(), 25 * 60);
    }

    #[test]
    fn test_predict_next_rule() {
        assert_eq!(predict_next(Mode::Pomodoro, 0, 4), Mode::ShortBreak);
        assert_eq!(predict_next(Mode::Pomodoro, 2, 4), Mode::ShortBreak);
        assert_eq!(predict_next(Mode::Pomodoro, 3, 4), Mode::LongBreak);
        assert_eq!(predict_next(Mode::Pomodoro, 7, 4), Mode::LongBreak);
        assert_eq!(predict_next(Mode::ShortBreak, 3, 4), Mode::Pomodoro);
        assert_eq!(predict_next(Mode::LongBreak, 4, 4), Mode::Pomodoro);
    }

    #[test]
    fn test_format_mmss() {
        assert_eq!(format_mmss(0), "00:00");
        assert_eq!(format_mmss(59), "00:59");
        assert_eq!(format_mmss(60), "01:00");
        assert_eq!(format_mmss(1500), "25:00");
        assert_eq!(format_mmss(3599), "59:59");
    }
}
