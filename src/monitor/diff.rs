//! Diff engine — classifies the changes between two snapshots.
//!
//! Pure except for the catalog, which gates region-discovery events to
//! one per region per run. Output is sorted by (region, instance-type)
//! so logs stay diffable and tests reproducible.

use super::catalog::RegionCatalog;
use super::snapshot::{AvailabilityStatus, Slot, Snapshot};

/// What kind of change a transition event represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Unavailable → Available.
    BecameAvailable,
    /// Unavailable or Available → LaunchInProgress.
    LaunchStarted,
    /// A region never seen before this run appeared in a snapshot.
    NewRegionDiscovered,
    /// Any other differing status pair (e.g. Available → Unavailable).
    Other,
}

/// One detected change between consecutive snapshots.
///
/// Created for a single poll cycle, consumed synchronously by the
/// alert dispatcher and the reporter, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEvent {
    pub slot: Slot,
    /// Absent when the slot (or region) is newly seen.
    pub from: Option<AvailabilityStatus>,
    pub to: AvailabilityStatus,
    pub kind: TransitionKind,
}

/// Classify a status change into a transition kind.
fn classify(from: AvailabilityStatus, to: AvailabilityStatus) -> TransitionKind {
    use AvailabilityStatus::*;
    match (from, to) {
        (Unavailable, Available) => TransitionKind::BecameAvailable,
        (Unavailable | Available, LaunchInProgress) => TransitionKind::LaunchStarted,
        _ => TransitionKind::Other,
    }
}

/// Compare `current` against `previous` and produce the ordered list
/// of transition events.
///
/// Rules:
/// - A region in `current` not yet in the catalog emits one
///   `NewRegionDiscovered` (the catalog's register call is the gate).
/// - A slot with no prior status establishes a baseline; no
///   availability transition is emitted for it.
/// - A slot whose status differs from its prior status emits one event
///   classified by the (from, to) pair.
/// - A slot present in `previous` but absent from `current` is treated
///   as an implicit transition to `Unavailable`; nothing is emitted if
///   it was already Unavailable.
///
/// An empty `current` snapshot is legitimate (the API may report
/// nothing available) and yields only removed-slot events.
pub fn diff(
    previous: Option<&Snapshot>,
    current: &Snapshot,
    catalog: &mut RegionCatalog,
) -> Vec<TransitionEvent> {
    let mut events = Vec::new();

    // Region discovery first, in slot order.
    for (slot, status) in current.iter() {
        if catalog.register(slot.region.clone()) {
            events.push(TransitionEvent {
                slot: slot.clone(),
                from: None,
                to: status,
                kind: TransitionKind::NewRegionDiscovered,
            });
        }
    }

    // Pairwise status comparison per slot. No cross-slot inference.
    if let Some(prev) = previous {
        for (slot, status) in current.iter() {
            match prev.status(slot) {
                None => {} // first observation: baseline only
                Some(prior) if prior == status => {}
                Some(prior) => events.push(TransitionEvent {
                    slot: slot.clone(),
                    from: Some(prior),
                    to: status,
                    kind: classify(prior, status),
                }),
            }
        }

        // Slots that vanished from the feed count as Unavailable.
        for (slot, prior) in prev.iter() {
            if !current.contains(slot) && prior != AvailabilityStatus::Unavailable {
                events.push(TransitionEvent {
                    slot: slot.clone(),
                    from: Some(prior),
                    to: AvailabilityStatus::Unavailable,
                    kind: classify(prior, AvailabilityStatus::Unavailable),
                });
            }
        }
    }

    events.sort_by(|a, b| a.slot.cmp(&b.slot));
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn snapshot(entries: &[(&str, &str, AvailabilityStatus)]) -> Snapshot {
        let slots: BTreeMap<Slot, AvailabilityStatus> = entries
            .iter()
            .map(|(r, i, s)| (Slot::new(*r, *i), *s))
            .collect();
        Snapshot::new(Utc::now(), slots)
    }

    use AvailabilityStatus::{Available, LaunchInProgress, Unavailable};

    #[test]
    fn identical_snapshots_produce_no_events() {
        let prev = snapshot(&[("us-east-1", "gpu_1x_a10", Available)]);
        let cur = snapshot(&[("us-east-1", "gpu_1x_a10", Available)]);
        let mut catalog = RegionCatalog::with_baseline();

        assert!(diff(Some(&prev), &cur, &mut catalog).is_empty());
    }

    #[test]
    fn unavailable_to_available_is_became_available() {
        let prev = snapshot(&[("us-east-1", "gpu_1x_a10", Unavailable)]);
        let cur = snapshot(&[("us-east-1", "gpu_1x_a10", Available)]);
        let mut catalog = RegionCatalog::with_baseline();

        let events = diff(Some(&prev), &cur, &mut catalog);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, TransitionKind::BecameAvailable);
        assert_eq!(events[0].from, Some(Unavailable));
        assert_eq!(events[0].to, Available);
    }

    #[test]
    fn transition_to_launch_in_progress_is_launch_started() {
        let prev = snapshot(&[
            ("us-east-1", "gpu_1x_a10", Available),
            ("us-east-1", "gpu_1x_a100", Unavailable),
        ]);
        let cur = snapshot(&[
            ("us-east-1", "gpu_1x_a10", LaunchInProgress),
            ("us-east-1", "gpu_1x_a100", LaunchInProgress),
        ]);
        let mut catalog = RegionCatalog::with_baseline();

        let events = diff(Some(&prev), &cur, &mut catalog);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.kind == TransitionKind::LaunchStarted));
    }

    #[test]
    fn downgrade_is_other() {
        let prev = snapshot(&[("us-east-1", "gpu_1x_a10", Available)]);
        let cur = snapshot(&[("us-east-1", "gpu_1x_a10", Unavailable)]);
        let mut catalog = RegionCatalog::with_baseline();

        let events = diff(Some(&prev), &cur, &mut catalog);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, TransitionKind::Other);
    }

    #[test]
    fn first_poll_with_known_regions_is_baseline_only() {
        let cur = snapshot(&[
            ("us-east-1", "gpu_1x_a10", Available),
            ("us-east-1", "gpu_1x_a100", Unavailable),
            ("us-west-1", "gpu_8x_h100", Available),
        ]);
        let mut catalog = RegionCatalog::with_baseline();

        assert!(diff(None, &cur, &mut catalog).is_empty());
    }

    #[test]
    fn unknown_region_fires_exactly_once_across_many_slots() {
        let entries: Vec<(String, AvailabilityStatus)> = (0..50)
            .map(|i| (format!("gpu_type_{i:02}"), Available))
            .collect();
        let slots: BTreeMap<Slot, AvailabilityStatus> = entries
            .iter()
            .map(|(it, s)| (Slot::new("atlantis-east-1", it.clone()), *s))
            .collect();
        let cur = Snapshot::new(Utc::now(), slots);
        let mut catalog = RegionCatalog::with_baseline();

        let events = diff(None, &cur, &mut catalog);
        let discoveries: Vec<_> = events
            .iter()
            .filter(|e| e.kind == TransitionKind::NewRegionDiscovered)
            .collect();
        assert_eq!(discoveries.len(), 1);

        // Second poll with the same region: no further discovery events.
        let again = diff(Some(&cur), &cur.clone(), &mut catalog);
        assert!(again
            .iter()
            .all(|e| e.kind != TransitionKind::NewRegionDiscovered));
    }

    #[test]
    fn removed_slot_becomes_unavailable() {
        let prev = snapshot(&[
            ("us-east-1", "gpu_1x_a10", Available),
            ("us-east-1", "gpu_1x_a100", Unavailable),
        ]);
        let cur = snapshot(&[]);
        let mut catalog = RegionCatalog::with_baseline();

        let events = diff(Some(&prev), &cur, &mut catalog);
        // The already-unavailable slot does not re-fire.
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].slot, Slot::new("us-east-1", "gpu_1x_a10"));
        assert_eq!(events[0].from, Some(Available));
        assert_eq!(events[0].to, Unavailable);
        assert_eq!(events[0].kind, TransitionKind::Other);
    }

    #[test]
    fn empty_current_snapshot_is_not_an_error() {
        let cur = snapshot(&[]);
        let mut catalog = RegionCatalog::with_baseline();
        assert!(diff(None, &cur, &mut catalog).is_empty());
    }

    #[test]
    fn output_is_sorted_and_deterministic() {
        let prev = snapshot(&[
            ("us-west-1", "gpu_8x_h100", Unavailable),
            ("us-east-1", "gpu_1x_a10", Unavailable),
            ("us-east-1", "gpu_1x_a100", Unavailable),
        ]);
        let cur = snapshot(&[
            ("us-west-1", "gpu_8x_h100", Available),
            ("us-east-1", "gpu_1x_a10", Available),
            ("us-east-1", "gpu_1x_a100", Available),
        ]);

        let mut catalog_a = RegionCatalog::with_baseline();
        let first = diff(Some(&prev), &cur, &mut catalog_a);

        let mut catalog_b = RegionCatalog::with_baseline();
        let second = diff(Some(&prev), &cur, &mut catalog_b);

        assert_eq!(first, second);
        let slots: Vec<_> = first.iter().map(|e| e.slot.clone()).collect();
        let mut sorted = slots.clone();
        sorted.sort();
        assert_eq!(slots, sorted);
    }

    #[test]
    fn new_slot_in_known_region_is_baseline_only() {
        let prev = snapshot(&[("us-east-1", "gpu_1x_a10", Available)]);
        let cur = snapshot(&[
            ("us-east-1", "gpu_1x_a10", Available),
            ("us-east-1", "gpu_8x_a100", Available),
        ]);
        let mut catalog = RegionCatalog::with_baseline();

        assert!(diff(Some(&prev), &cur, &mut catalog).is_empty());
    }
}
