// Library interface for pomoclock
// Hosts drive the timer through SessionTimer; tests can reach the state
// machine and its collaborators directly through the public modules.

pub mod clock;
pub mod config;
pub mod constants;
pub mod notify;
pub mod session;
pub mod settings;
pub mod store;

use anyhow::Result;
use clock::{Clock, SystemClock};
use constants::TICK_INTERVAL_MS;
use log::{info, warn};
use notify::Notifier;
use session::{Completion, Mode, SessionState, Snapshot, Tick};
use settings::Settings;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use store::{Stats, Store};

/// Rendering sink fed a fresh snapshot whenever timer state changes.
pub trait Render: Send + Sync {
    fn render(&self, snapshot: &Snapshot);
}

/// Discards snapshots. For hosts that poll [`SessionTimer::snapshot`] instead.
#[derive(Debug, Default)]
pub struct NullRender;

impl Render for NullRender {
    fn render(&self, _snapshot: &Snapshot) {}
}

/// Pomodoro timer core shared between hosts: owns the session state machine,
/// drives the periodic tick while running, and performs completion side
/// effects (cue, notification, stats persistence, rendering).
///
/// Every operation is total; calling any of them in any state is a defined
/// no-op or transition, never a fault. The only fallible entry point is
/// [`apply_settings`](Self::apply_settings), which rejects invalid settings
/// and leaves the previous ones in place.
pub struct SessionTimer {
    state: SessionState,
    notifier: Arc<dyn Notifier>,
    render: Arc<dyn Render>,
    store: Option<Store>,
}

impl SessionTimer {
    /// Create a timer driven by the system wall clock.
    pub fn new(
        settings: Settings,
        notifier: Arc<dyn Notifier>,
        render: Arc<dyn Render>,
    ) -> Result<Self> {
        Self::with_clock(settings, notifier, render, Arc::new(SystemClock))
    }

    /// Create a timer with an explicit clock (deterministic tests).
    pub fn with_clock(
        settings: Settings,
        notifier: Arc<dyn Notifier>,
        render: Arc<dyn Render>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            state: SessionState::new(settings, clock),
            notifier,
            render,
            store: None,
        })
    }

    /// Attach a persistence store: the lifetime pomodoro count is restored
    /// from it now, stats are saved on every pomodoro completion, and
    /// settings on every successful apply.
    pub fn with_store(mut self, store: Store) -> Result<Self> {
        if let Some(stats) = store.load_stats()? {
            self.state.restore_completed(stats.completed_pomodoros);
        }
        self.store = Some(store);
        Ok(self)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn settings(&self) -> Settings {
        self.state.settings()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Arm the countdown against the wall clock. No-op when already running.
    pub fn start(&self) {
        if let Some(generation) = self.state.start() {
            info!("Timer started: {}", self.state.mode());
            self.spawn_ticker(generation);
        }
        self.push_render();
    }

    /// Stop the countdown. Idempotent; a tick already in flight observes the
    /// stopped state and exits without mutating anything.
    pub fn pause(&self) {
        self.state.pause();
        self.push_render();
    }

    /// Re-derive the countdown from the current mode's configured duration.
    /// With `auto_start`, the timer restarts immediately when the auto-start
    /// setting is on.
    pub fn reset(&self, auto_start: bool) {
        if let Some(generation) = self.state.reset(auto_start) {
            self.spawn_ticker(generation);
        }
        self.push_render();
    }

    /// End the current session now, with the same completion handling as a
    /// natural expiry.
    pub fn skip(&self) {
        let (done, next_gen) = self.state.skip();
        self.complete(&done);
        if let Some(generation) = next_gen {
            self.spawn_ticker(generation);
        }
    }

    /// Switch session type and reset the countdown to the new mode's
    /// duration. Callers decide whether interrupting a running timer needs
    /// confirmation.
    pub fn switch_mode(&self, mode: Mode) {
        self.state.switch_mode(mode);
        info!("Switched to {}", mode);
        self.push_render();
    }

    /// Replace the settings. Rejected settings leave everything unchanged;
    /// accepted ones are persisted and, while idle, re-derive the countdown
    /// for the current mode immediately.
    pub fn apply_settings(&self, settings: Settings) -> Result<()> {
        self.state.apply_settings(settings.clone())?;
        if let Some(store) = &self.store {
            store.save_settings(&settings)?;
        }
        self.push_render();
        Ok(())
    }

    fn push_render(&self) {
        self.render.render(&self.state.snapshot());
    }

    fn complete(&self, done: &Completion) {
        complete_side_effects(
            &self.state,
            self.notifier.as_ref(),
            self.render.as_ref(),
            self.store.as_ref(),
            done,
        );
    }

    /// Periodic recomputation tick, held to the countdown it was armed for
    /// by `generation`. The thread exits as soon as the state machine
    /// reports the countdown cancelled or finished without auto-start.
    fn spawn_ticker(&self, generation: u64) {
        let state = self.state.clone();
        let notifier = Arc::clone(&self.notifier);
        let render = Arc::clone(&self.render);
        let store = self.store.clone();

        thread::Builder::new()
            .name("session-ticker".to_string())
            .spawn(move || {
                let mut generation = generation;
                let mut last_rendered = None;
                loop {
                    thread::sleep(Duration::from_millis(TICK_INTERVAL_MS));
                    match state.on_tick(generation) {
                        Tick::Stale => break,
                        Tick::Running(remaining) => {
                            if last_rendered != Some(remaining) {
                                last_rendered = Some(remaining);
                                render.render(&state.snapshot());
                            }
                        }
                        Tick::Completed { done, next_gen } => {
                            complete_side_effects(
                                &state,
                                notifier.as_ref(),
                                render.as_ref(),
                                store.as_ref(),
                                &done,
                            );
                            match next_gen {
                                // Auto-start: same thread drives the next session.
                                Some(next) => {
                                    generation = next;
                                    last_rendered = None;
                                }
                                None => break,
                            }
                        }
                    }
                }
            })
            .expect("Failed to spawn ticker thread");
    }
}

/// Completion side effects, shared by the ticker thread (natural expiry) and
/// `skip`: cue once, gated notification, stats persistence on pomodoro
/// completions, then a fresh snapshot for the renderer.
fn complete_side_effects(
    state: &SessionState,
    notifier: &dyn Notifier,
    render: &dyn Render,
    store: Option<&Store>,
    done: &Completion,
) {
    notifier.play_cue();
    if state.notifications_enabled() {
        notifier.notify(done.title(), done.body());
    }
    if done.finished == Mode::Pomodoro {
        if let Some(store) = store {
            let stats = Stats {
                completed_pomodoros: done.completed_pomodoros,
            };
            if let Err(e) = store.save_stats(&stats) {
                warn!("Failed to persist stats: {:#}", e);
            }
        }
    }
    info!(
        "{} finished ({} completed); next: {}",
        done.finished, done.completed_pomodoros, done.next
    );
    render.render(&state.snapshot());
}
