//! Region catalog — the known universe of regions.
//!
//! Seeded from a hardcoded baseline (the upstream API has no
//! region-listing endpoint, so this list is maintained by hand and can
//! go stale — a documented limitation, not a bug). Regions seen in a
//! snapshot but missing from the baseline are registered dynamically;
//! that registration is the one-shot trigger for a region-discovery
//! alert.

use std::collections::HashSet;

use super::snapshot::Region;

/// Baseline region list. Maintained by hand; new regions the API
/// starts reporting are picked up dynamically at runtime.
pub const BASELINE_REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "us-west-3",
    "us-midwest-1",
    "us-south-1",
    "europe-central-1",
    "asia-northeast-1",
    "asia-northeast-2",
    "asia-south-1",
    "me-west-1",
];

/// The set of regions this run knows about.
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    known: HashSet<Region>,
}

impl RegionCatalog {
    /// Catalog seeded with the baseline region list.
    pub fn with_baseline() -> Self {
        Self {
            known: BASELINE_REGIONS.iter().map(|r| Region::new(*r)).collect(),
        }
    }

    /// Empty catalog; every region in the first snapshot counts as
    /// newly discovered. Used by tests.
    pub fn unseeded() -> Self {
        Self {
            known: HashSet::new(),
        }
    }

    pub fn is_known(&self, region: &Region) -> bool {
        self.known.contains(region)
    }

    /// Add a region to the known set. Returns `true` only the first
    /// time the region is seen — the idempotence gate that keeps
    /// region-discovery alerts to at most one per region per run.
    pub fn register(&mut self, region: Region) -> bool {
        self.known.insert(region)
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }
}
