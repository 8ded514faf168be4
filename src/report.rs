//! Per-cycle reporting — one structured record per poll, success or
//! failure, to console and log file via tracing. Never a silent cycle.

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::api::FetchError;
use crate::monitor::diff::{TransitionEvent, TransitionKind};
use crate::monitor::snapshot::Snapshot;

/// Renders each cycle's outcome. Tracks the start of the current
/// availability dry spell so "nothing available" lines carry how long
/// it has been going on.
pub struct CycleReporter {
    unavailable_since: Option<DateTime<Utc>>,
}

impl CycleReporter {
    pub fn new() -> Self {
        Self {
            unavailable_since: None,
        }
    }

    /// Record a successful cycle: the availability table plus every
    /// transition detected this poll.
    pub fn record_cycle(&mut self, snapshot: &Snapshot, events: &[TransitionEvent]) {
        let available: Vec<String> = snapshot
            .available_slots()
            .map(|slot| slot.to_string())
            .collect();

        if available.is_empty() {
            let since = *self.unavailable_since.get_or_insert(snapshot.fetched_at);
            let duration = snapshot.fetched_at - since;
            info!(
                slots = snapshot.len(),
                since = %since.format("%Y-%m-%d %H:%M:%S"),
                duration_secs = duration.num_seconds(),
                "No instances available"
            );
        } else {
            self.unavailable_since = None;
            info!(
                slots = snapshot.len(),
                available = available.len(),
                "Available instances: {}",
                available.join(", ")
            );
        }

        for event in events {
            match event.kind {
                TransitionKind::NewRegionDiscovered => info!(
                    region = %event.slot.region,
                    "🌍 New region discovered"
                ),
                TransitionKind::BecameAvailable => info!(
                    slot = %event.slot,
                    "✅ Became available"
                ),
                TransitionKind::LaunchStarted => info!(
                    slot = %event.slot,
                    "🚀 Launch in progress"
                ),
                TransitionKind::Other => info!(
                    slot = %event.slot,
                    from = ?event.from,
                    to = %event.to,
                    "Status changed"
                ),
            }
        }
    }

    /// Record a failed cycle. Elevated severity, loop continues.
    pub fn record_failure(&mut self, err: &FetchError) {
        error!("Fetch failed — skipping this cycle: {}", err);
    }
}

impl Default for CycleReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::snapshot::{AvailabilityStatus, Slot};
    use std::collections::BTreeMap;

    fn empty_snapshot() -> Snapshot {
        Snapshot::empty(Utc::now())
    }

    fn available_snapshot() -> Snapshot {
        let mut slots = BTreeMap::new();
        slots.insert(
            Slot::new("us-east-1", "gpu_1x_a10"),
            AvailabilityStatus::Available,
        );
        Snapshot::new(Utc::now(), slots)
    }

    #[test]
    fn dry_spell_start_is_pinned_to_first_empty_cycle() {
        let mut reporter = CycleReporter::new();
        let first = empty_snapshot();
        reporter.record_cycle(&first, &[]);
        let pinned = reporter.unavailable_since.unwrap();
        assert_eq!(pinned, first.fetched_at);

        // A later empty cycle keeps the original start time.
        reporter.record_cycle(&empty_snapshot(), &[]);
        assert_eq!(reporter.unavailable_since.unwrap(), pinned);
    }

    #[test]
    fn availability_resets_the_dry_spell() {
        let mut reporter = CycleReporter::new();
        reporter.record_cycle(&empty_snapshot(), &[]);
        assert!(reporter.unavailable_since.is_some());

        reporter.record_cycle(&available_snapshot(), &[]);
        assert!(reporter.unavailable_since.is_none());
    }
}
