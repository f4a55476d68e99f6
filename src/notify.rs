//! Notification and audible-cue sinks.

use crate::constants::NOTIFICATION_TIMEOUT_MS;
use std::io::Write;

/// Side-effect sink invoked on session completions.
///
/// The timer calls `play_cue` exactly once per completion, and `notify` only
/// when the notifications setting is on. Soliciting platform notification
/// permission is the host's concern.
pub trait Notifier: Send + Sync {
    /// Deliver a desktop notification.
    fn notify(&self, title: &str, body: &str);

    /// Play a short audible cue.
    fn play_cue(&self);
}

/// Desktop notifications via the platform notification service, with a
/// terminal bell as the audible cue. Hosts with real audio output supply
/// their own sink.
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) {
        if let Err(e) = notify_rust::Notification::new()
            .summary(title)
            .body(body)
            .timeout(notify_rust::Timeout::Milliseconds(NOTIFICATION_TIMEOUT_MS))
            .show()
        {
            log::warn!("Failed to deliver notification: {}", e);
        }
    }

    fn play_cue(&self) {
        let mut out = std::io::stdout();
        let _ = out.write_all(b"\x07");
        let _ = out.flush();
    }
}

/// Discards all output. For hosts that surface completions some other way.
#[derive(Debug, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _title: &str, _body: &str) {}
    fn play_cue(&self) {}
}
