//! Alert dispatcher — routes transition events to notifications.
//!
//! Stateless: region-discovery dedup happens upstream in the catalog,
//! and status transitions only fire when the diff engine says they
//! happened. Notifications are best-effort; a failed `say` invocation
//! is logged and swallowed, never surfaced to the poll loop.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::monitor::diff::{TransitionEvent, TransitionKind};

/// The fixed set of spoken alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    InstanceAvailable,
    LaunchInProgress,
    NewRegionDetected,
}

impl Alert {
    pub fn message(&self) -> &'static str {
        match self {
            Alert::InstanceAvailable => "Instance Available",
            Alert::LaunchInProgress => "Launch In Progress",
            Alert::NewRegionDetected => "New Region Detected",
        }
    }
}

/// Notification sink. Production speaks through the OS; tests record.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, alert: Alert);
}

/// Map events to alerts and deliver them. `Other` transitions are
/// logged by the reporter but carry no alert.
pub async fn dispatch(notifier: &dyn Notifier, events: &[TransitionEvent]) {
    for event in events {
        let alert = match event.kind {
            TransitionKind::BecameAvailable => Alert::InstanceAvailable,
            TransitionKind::LaunchStarted => Alert::LaunchInProgress,
            TransitionKind::NewRegionDiscovered => Alert::NewRegionDetected,
            TransitionKind::Other => continue,
        };
        notifier.notify(alert).await;
    }
}

// ── Implementations ─────────────────────────────────────────────────

/// Speaks alerts via the OS text-to-speech command (`say`).
pub struct VoiceNotifier;

#[async_trait]
impl Notifier for VoiceNotifier {
    async fn notify(&self, alert: Alert) {
        let message = alert.message();
        match tokio::process::Command::new("say").arg(message).spawn() {
            Ok(_) => info!(alert = message, "🔊 Voice notification"),
            Err(e) => warn!(alert = message, "Voice notification failed: {}", e),
        }
    }
}

/// No-op sink used when voice notifications are disabled.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, _alert: Alert) {}
}
