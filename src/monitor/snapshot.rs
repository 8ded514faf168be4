//! Core data model — regions, instance types, slots, and snapshots.
//!
//! A `Slot` is one (region, instance-type) pair, the unit of
//! availability tracking. A `Snapshot` is an immutable point-in-time
//! mapping from every observed slot to its reported status. Slots are
//! never pre-declared: anything the API reports is tracked from first
//! sight.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cloud region identifier, e.g. `us-east-1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(pub String);

impl Region {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An instance type identifier, e.g. `gpu_1x_a100`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceType(pub String);

impl InstanceType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One (region, instance-type) pair.
///
/// Derived `Ord` compares region first, then instance type — diff
/// output and snapshot iteration both rely on that order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub region: Region,
    pub instance_type: InstanceType,
}

impl Slot {
    pub fn new(region: impl Into<String>, instance_type: impl Into<String>) -> Self {
        Self {
            region: Region::new(region),
            instance_type: InstanceType::new(instance_type),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.instance_type, self.region)
    }
}

/// Availability state reported for a slot in one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Unavailable,
    Available,
    LaunchInProgress,
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AvailabilityStatus::Unavailable => "unavailable",
            AvailabilityStatus::Available => "available",
            AvailabilityStatus::LaunchInProgress => "launch in progress",
        };
        f.write_str(s)
    }
}

/// A point-in-time capture of slot availability.
///
/// Built once per poll by the fetcher, never mutated afterwards. The
/// `BTreeMap` keeps slots ordered by (region, instance-type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub fetched_at: DateTime<Utc>,
    slots: BTreeMap<Slot, AvailabilityStatus>,
}

impl Snapshot {
    pub fn new(fetched_at: DateTime<Utc>, slots: BTreeMap<Slot, AvailabilityStatus>) -> Self {
        Self { fetched_at, slots }
    }

    pub fn empty(fetched_at: DateTime<Utc>) -> Self {
        Self {
            fetched_at,
            slots: BTreeMap::new(),
        }
    }

    pub fn status(&self, slot: &Slot) -> Option<AvailabilityStatus> {
        self.slots.get(slot).copied()
    }

    pub fn contains(&self, slot: &Slot) -> bool {
        self.slots.contains_key(slot)
    }

    /// Slots in (region, instance-type) order.
    pub fn iter(&self) -> impl Iterator<Item = (&Slot, AvailabilityStatus)> {
        self.slots.iter().map(|(s, st)| (s, *st))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots currently reported as `Available`, in order.
    pub fn available_slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots
            .iter()
            .filter(|(_, st)| **st == AvailabilityStatus::Available)
            .map(|(s, _)| s)
    }
}
