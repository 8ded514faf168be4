//! Inventory API client — fetches the current availability snapshot.
//!
//! Wire format (Lambda Labs `instance-types` endpoint):
//!
//! ```json
//! {"data": {"gpu_1x_a10": {
//!     "instance_type": {"name": "gpu_1x_a10", ...},
//!     "regions_with_capacity_available": [{"name": "us-east-1", ...}]
//! }}}
//! ```
//!
//! A (region, instance-type) pair listed with capacity maps to
//! `Available`; a per-region `"status"` of `"launch in progress"`, if
//! present, maps to `LaunchInProgress`. Pairs the API omits simply do
//! not appear in the snapshot.
//!
//! Polling faster than the enforced floor makes the upstream return an
//! HTML rate-limit page with a 200 status. That body must fail JSON
//! parsing and surface as `FetchError::Parse` — never as a valid empty
//! snapshot.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

use crate::monitor::snapshot::{AvailabilityStatus, Slot, Snapshot};

pub const DEFAULT_API_ENDPOINT: &str = "https://cloud.lambdalabs.com/api/v1/instance-types";

/// Hard ceiling on a single fetch; the poll loop never waits on the
/// transport longer than this.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a fetch produced no snapshot this cycle. All variants are
/// recoverable; the poll loop logs them and retries on the next tick.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned {code}: {body}")]
    Status { code: u16, body: String },

    #[error("unparseable response body (rate-limited?): {0}")]
    Parse(String),
}

/// The snapshot source. The production implementation talks HTTP; the
/// poll loop only sees this trait, so tests inject canned snapshots.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self) -> Result<Snapshot, FetchError>;
}

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    data: BTreeMap<String, InstanceEntry>,
}

#[derive(Debug, Deserialize)]
struct InstanceEntry {
    #[serde(default)]
    regions_with_capacity_available: Vec<RegionEntry>,
}

#[derive(Debug, Deserialize)]
struct RegionEntry {
    name: String,
    #[serde(default)]
    status: Option<String>,
}

impl RegionEntry {
    fn availability(&self) -> AvailabilityStatus {
        match self.status.as_deref() {
            Some("launch in progress") | Some("launch_in_progress") => {
                AvailabilityStatus::LaunchInProgress
            }
            _ => AvailabilityStatus::Available,
        }
    }
}

/// Parse a raw response body into a snapshot. Split out from the HTTP
/// path so the wire format is testable without a server.
pub fn parse_snapshot(body: &str) -> Result<Snapshot, FetchError> {
    let response: ApiResponse = serde_json::from_str(body).map_err(|e| {
        // Rate-limit pages are HTML; report a short prefix, not the page.
        let prefix: String = body.chars().take(120).collect();
        FetchError::Parse(format!("{e} (body starts: {prefix:?})"))
    })?;

    let mut slots = BTreeMap::new();
    for (instance_name, entry) in &response.data {
        for region in &entry.regions_with_capacity_available {
            slots.insert(
                Slot::new(region.name.clone(), instance_name.clone()),
                region.availability(),
            );
        }
    }
    Ok(Snapshot::new(Utc::now(), slots))
}

// ── HTTP fetcher ────────────────────────────────────────────────────

/// Production fetcher for the Lambda Labs inventory endpoint.
pub struct LambdaApiFetcher {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl LambdaApiFetcher {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl Fetcher for LambdaApiFetcher {
    async fn fetch(&self) -> Result<Snapshot, FetchError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                code: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        parse_snapshot(&body)
    }
}
